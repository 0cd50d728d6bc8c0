// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! Editor settings and configuration constants.
//!
//! Compile-time defaults live at the top. `EditorSettings` carries the
//! runtime values a session uses, and can be loaded from a TOML file where
//! every field is optional.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// SNAP SETTINGS
// ============================================================================
/// Whether dragged points snap onto nearby geometry
const SNAP_ENABLED: bool = true;

/// Snap radius in screen pixels, converted to world units by the caller's
/// pixel-to-world scale
const SNAP_TOLERANCE_PIXELS: f64 = 8.0;

// ============================================================================
// HISTORY SETTINGS
// ============================================================================
/// Maximum number of undo steps kept per session (0 keeps everything)
const MAX_UNDO: usize = 500;

// ============================================================================
// PUBLIC API - Don't edit below this line unless you know what you're doing
// ============================================================================

/// Snapping defaults
pub mod snap {
    pub const ENABLED: bool = super::SNAP_ENABLED;

    /// Snap radius (screen pixels)
    pub const TOLERANCE_PIXELS: f64 = super::SNAP_TOLERANCE_PIXELS;
}

/// Undo history defaults
pub mod history {
    pub const MAX_UNDO: usize = super::MAX_UNDO;
}

/// Runtime settings for an edit session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub snap: SnapSettings,
    pub history: HistorySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    pub enabled: bool,
    pub tolerance_pixels: f64,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: snap::ENABLED,
            tolerance_pixels: snap::TOLERANCE_PIXELS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub max_undo: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_undo: history::MAX_UNDO,
        }
    }
}

impl EditorSettings {
    /// Parse settings from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse editor settings")
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings = Self::from_toml(&text)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        tracing::debug!("Loaded settings from {}: {:?}", path.display(), settings);
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let settings = EditorSettings::default();
        assert!(settings.snap.enabled);
        assert_eq!(settings.snap.tolerance_pixels, 8.0);
        assert_eq!(settings.history.max_undo, 500);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let settings = EditorSettings::from_toml("[snap]\ntolerance_pixels = 12.5\n").unwrap();
        assert_eq!(settings.snap.tolerance_pixels, 12.5);
        assert!(settings.snap.enabled);
        assert_eq!(settings.history.max_undo, 500);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(EditorSettings::from_toml("").unwrap(), EditorSettings::default());
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(EditorSettings::from_toml("[history]\nmax_undo = \"lots\"\n").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EditorSettings::load(Path::new("/nonexistent/geoedit.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/geoedit.toml"));
    }
}
