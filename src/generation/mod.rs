//! Scene generation service boundary.
//!
//! A generator turns a natural-language prompt into a raw scene value. The
//! value is untrusted and always goes through validation and defaults before
//! use; see [`SceneManager::build_from_prompt`](crate::scene::SceneManager::build_from_prompt).

use serde_json::Value;

use crate::core::error::Error;
use crate::core::types::Result;

/// Produces raw scene descriptions from prompts.
pub trait SceneGenerator {
    fn generate(&self, prompt: &str) -> Result<Value>;
}

impl<F> SceneGenerator for F
where
    F: Fn(&str) -> Result<Value>,
{
    fn generate(&self, prompt: &str) -> Result<Value> {
        self(prompt)
    }
}

/// Adapts a text-completion backend: the reply text is parsed with
/// [`parse_response`].
pub struct TextGenerator<F> {
    complete: F,
}

impl<F> TextGenerator<F>
where
    F: Fn(&str) -> Result<String>,
{
    pub fn new(complete: F) -> Self {
        Self { complete }
    }
}

impl<F> SceneGenerator for TextGenerator<F>
where
    F: Fn(&str) -> Result<String>,
{
    fn generate(&self, prompt: &str) -> Result<Value> {
        let reply = (self.complete)(prompt)?;
        parse_response(&reply)
    }
}

/// Parse a model reply into a JSON value.
///
/// Accepts bare JSON or JSON inside a fenced code block. Anything else is a
/// generation error.
pub fn parse_response(reply: &str) -> Result<Value> {
    let body = fenced_block(reply).unwrap_or(reply).trim();
    serde_json::from_str(body).map_err(|e| {
        log::warn!("Generator reply is not valid JSON: {}", e);
        Error::Generation(format!("invalid JSON in reply: {}", e))
    })
}

/// Contents of the first ``` fenced block, without its language tag.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")? + 3;
    let rest = &text[start..];
    let body_start = rest.find('\n')? + 1;
    let body = &rest[body_start..];
    let end = body.find("```")?;
    Some(&body[..end])
}
