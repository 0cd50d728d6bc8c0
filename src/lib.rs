// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! Geoedit: an interactive vector geometry editing engine
//!
//! Points, lines, polygons with holes and their multi collections are
//! edited through an [`EditSession`]: a state machine that owns a working
//! copy of the geometry, applies invertible [`Operation`]s addressed by
//! [`GeometryIndex`] paths, and keeps undo/redo history, a selection and a
//! mark-for-deletion set. Snapping, splitting and merging live in
//! [`tools`].

use anyhow::{Context, Result};
use std::path::PathBuf;

pub mod editing;
pub mod error;
pub mod math;
pub mod model;
pub mod replay;
pub mod settings;
pub mod tools;

pub use editing::{
    EditSession, NullSink, Operation, RenderingSink, SessionEventBus, SessionState,
    SuspendReason, TracingSink,
};
pub use error::{EditError, Result as EditResult};
pub use model::{Coordinate, Geometry, GeometryIndex, GeometryKind, IndexStep, ResolvedTarget};
pub use settings::EditorSettings;

/// Entry point for the `geoedit` replay binary
///
/// Usage: `geoedit <geometry.json> <script.json> [settings.toml]`.
/// Prints the resulting geometry and history depths as JSON.
pub fn run() -> Result<()> {
    // Initialize tracing subscriber (can be controlled via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("geoedit=info".parse().context("Invalid log directive")?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        tracing::error!("Usage: geoedit <geometry.json> <script.json> [settings.toml]");
        anyhow::bail!("expected a geometry file and a script file");
    }

    let geometry_path = PathBuf::from(&args[1]);
    let script_path = PathBuf::from(&args[2]);

    let settings = match args.get(3) {
        Some(path) => EditorSettings::load(&PathBuf::from(path))?,
        None => EditorSettings::default(),
    };

    tracing::info!("Loading geometry from: {}", geometry_path.display());
    let geometry = replay::load_geometry(&geometry_path)?;

    let script_text = std::fs::read_to_string(&script_path)
        .with_context(|| format!("Failed to read script {}", script_path.display()))?;
    let steps = replay::parse_script(&script_text)
        .with_context(|| format!("Invalid script {}", script_path.display()))?;

    let mut session = EditSession::new(Box::new(TracingSink), Box::new(TracingSink), settings);
    let outcome = replay::run_script(&mut session, &geometry, &steps)?;

    let json = serde_json::to_string_pretty(&outcome).context("Failed to serialize result")?;
    println!("{json}");
    Ok(())
}
