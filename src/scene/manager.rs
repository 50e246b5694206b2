//! Scene manager: runs the whole pipeline from a raw scene value to the
//! resolved hand-off graph.

use std::path::Path;

use serde_json::Value;

use crate::core::types::Result;
use crate::generation::SceneGenerator;

use super::adjacency::connect_rooms;
use super::builder::{SceneGraph, SceneGraphBuilder};
use super::catalog::Catalog;
use super::composite::CompositeExpander;
use super::config::SceneConfig;
use super::defaults::apply_defaults;
use super::document::{SceneDocument, read_raw};
use super::graph::{SceneIndex, TransformResolver};
use super::report::{BuildReport, GeometryWarning};
use super::validate::{validate, validate_strict};

/// Result of a successful build.
#[derive(Clone, Debug)]
pub struct SceneBuild {
    /// The defaulted document, with synthesized doorways
    pub document: SceneDocument,
    pub graph: SceneGraph,
    pub report: BuildReport,
}

/// Owns the configuration and catalog and threads a scene through every
/// stage.
#[derive(Clone, Debug, Default)]
pub struct SceneManager {
    config: SceneConfig,
    catalog: Catalog,
}

impl SceneManager {
    pub fn new(config: SceneConfig, catalog: Catalog) -> Self {
        Self { config, catalog }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Build a raw scene value.
    ///
    /// Fails only when the top level is malformed. Every other problem is
    /// recorded in the returned report and the affected objects are left out
    /// of the graph.
    pub fn build(&self, raw: &Value) -> Result<SceneBuild> {
        validate_strict(raw)?;

        let mut report = BuildReport {
            schema_issues: validate(raw, &self.catalog),
            ..Default::default()
        };
        report.warnings.extend(report.schema_issues.iter().filter_map(|issue| {
            issue.replaced_field().map(|field| GeometryWarning::VectorReplaced {
                location: issue.location.to_string(),
                field: field.to_string(),
            })
        }));

        let document = SceneDocument::from_value(raw.clone())?;
        let document = apply_defaults(document, &self.config, &self.catalog);
        let (document, connections) = connect_rooms(document, &self.config);

        let graph = {
            let index = SceneIndex::new(&document);
            report.reference_errors.extend(index.errors().iter().cloned());

            let resolution = TransformResolver::new(&self.config, &self.catalog).resolve(&index);
            let (resolution, expansion) =
                CompositeExpander::new(&self.config, &self.catalog).expand(&index, resolution);

            report.reference_errors.extend(resolution.errors.iter().cloned());
            report.warnings.extend(resolution.warnings.iter().cloned());
            report.warnings.extend(expansion.warnings.iter().cloned());

            SceneGraphBuilder::new(&self.config, &self.catalog).build(&index, &resolution, &expansion, connections)
        };

        log::info!("Scene build finished: {}", report.summary());
        Ok(SceneBuild {
            document,
            graph,
            report,
        })
    }

    /// Load a scene file and build it.
    pub fn build_file(&self, path: &Path) -> Result<SceneBuild> {
        self.build(&read_raw(path)?)
    }

    /// Ask a generator for a scene description and build it.
    pub fn build_from_prompt<G>(&self, generator: &G, prompt: &str) -> Result<SceneBuild>
    where
        G: SceneGenerator + ?Sized,
    {
        log::info!("Generating scene from prompt ({} chars)", prompt.len());
        let raw = generator.generate(prompt)?;
        self.build(&raw)
    }
}
