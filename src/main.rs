//! Blockout - builds a resolved scene graph from a scene description.
//!
//! Usage: blockout <scene.json> [OPTIONS]
//!
//! Options:
//!   --out <PATH>      Write the resolved scene graph as JSON
//!   --config <PATH>   Load scene config overrides from JSON
//!   --dry-run         Replay emission against the recording backend

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use blockout::backend::{self, RecordingBackend};
use blockout::core::{logging, Result};
use blockout::scene::{Catalog, SceneConfig, SceneManager};

fn main() -> ExitCode {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let Some(input) = args.get(1).filter(|a| !a.starts_with("--")) else {
        eprintln!("Usage: blockout <scene.json> [--out <PATH>] [--config <PATH>] [--dry-run]");
        return ExitCode::from(2);
    };

    let out = parse_path_arg(&args, "--out");
    let config = parse_path_arg(&args, "--config");
    let dry_run = args.iter().any(|a| a == "--dry-run");

    match run(Path::new(input), out, config, dry_run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(input: &Path, out: Option<PathBuf>, config: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let config = match config {
        Some(path) => SceneConfig::load(&path)?,
        None => SceneConfig::default(),
    };
    let manager = SceneManager::new(config, Catalog::default());

    let build = manager.build_file(input)?;
    build.report.log();

    println!("=== Blockout ===");
    println!("Map:         {}", build.graph.map);
    println!("Rooms:       {}", build.graph.rooms.len());
    println!("Nodes:       {}", build.graph.nodes.len());
    println!("Connections: {}", build.graph.connections.len());
    println!("Report:      {}", build.report.summary());

    if let Some(path) = out {
        build.graph.save(&path)?;
        println!("Output:      {}", path.display());
    }

    if dry_run {
        let mut recorder = RecordingBackend::new();
        let summary = backend::emit(&build.graph, &mut recorder)?;
        println!(
            "Dry run:     {} calls, {} actors, {} lights, {} attachments, {} failures",
            recorder.calls().len(),
            summary.spawned,
            summary.lights,
            summary.attached,
            summary.failures.len()
        );
    }

    Ok(())
}

fn parse_path_arg(args: &[String], flag: &str) -> Option<PathBuf> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}
