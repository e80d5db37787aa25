//! Configuration for a pipeline run.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::normalise::NormalisationMode;

/// Settings shared by every file of a run. Every field has a default, so an
/// empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Profile normalisation convention.
    #[serde(default)]
    pub normalisation: NormalisationMode,

    /// Group curves as PDD, in-plane, cross-plane.
    #[serde(default = "default_true")]
    pub reorder: bool,

    /// Write one CSV per curve.
    #[serde(default = "default_true")]
    pub write_tables: bool,

    /// Output directory for the tables. When unset each input file gets a
    /// sibling directory named after it.
    #[serde(default)]
    pub output_directory: Option<PathBuf>,

    /// Open the interactive plot window. Defaults to on only when stdout is a
    /// terminal, so batch and piped runs stay headless.
    #[serde(default = "default_display")]
    pub display: bool,
}

fn default_true() -> bool {
    true
}

/// Whether the plot window opens when neither the config nor the CLI says.
pub fn default_display() -> bool {
    std::io::stdout().is_terminal()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            normalisation: NormalisationMode::default(),
            reorder: true,
            write_tables: true,
            output_directory: None,
            display: default_display(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file.
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Save configuration to a JSON file.
    pub fn to_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing config {}", path.display()))
    }

    /// Output directory for tables produced from `input`.
    pub fn output_directory_for(&self, input: &Path) -> PathBuf {
        self.output_directory
            .clone()
            .unwrap_or_else(|| crate::data::writer::default_output_directory(input))
    }
}
