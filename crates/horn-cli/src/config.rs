use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use horn_engine::{ExportRoute, PipelineConfig};
use horn_format::DEFAULT_FILE_NAME;
use horn_types::{HornInputs, ProfileKind};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "horn")]
#[command(about = "Generate an acoustic horn and export it as STL", long_about = None)]
pub struct Cli {
    /// JSON file with `horn` and `pipeline` sections; flags override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Throat diameter in mm
    #[arg(long)]
    pub throat: Option<f64>,

    /// Mouth diameter in mm
    #[arg(long)]
    pub mouth: Option<f64>,

    /// Target cutoff frequency in Hz
    #[arg(long)]
    pub frequency: Option<f64>,

    /// Horn length in mm (ignored with --auto-length)
    #[arg(long)]
    pub length: Option<f64>,

    /// Number of profile segments
    #[arg(long)]
    pub segments: Option<u32>,

    /// Profile type: exponential or tractrix
    #[arg(long = "type")]
    pub horn_type: Option<ProfileKind>,

    /// Estimate the length from the target frequency
    #[arg(long)]
    pub auto_length: bool,

    /// Output file
    #[arg(short, long, default_value = DEFAULT_FILE_NAME)]
    pub output: PathBuf,

    /// Encoder: auto, native, ascii or binary
    #[arg(long, default_value_t = ExportRoute::Auto)]
    pub format: ExportRoute,

    /// Skip the geometry kernel and lathe the profile directly
    #[arg(long)]
    pub no_kernel: bool,

    /// Re-read the encoded file and check it before saving
    #[arg(long)]
    pub verify: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Overlay the flags that were given onto `inputs`.
    pub fn apply(&self, inputs: &mut HornInputs) {
        if let Some(v) = self.throat {
            inputs.throat_diameter = v;
        }
        if let Some(v) = self.mouth {
            inputs.mouth_diameter = v;
        }
        if let Some(v) = self.frequency {
            inputs.target_frequency = v;
        }
        if let Some(v) = self.length {
            inputs.horn_length = v;
        }
        if let Some(v) = self.segments {
            inputs.segments = v;
        }
        if let Some(v) = self.horn_type {
            inputs.horn_type = v;
        }
        if self.auto_length {
            inputs.auto_length = true;
        }
    }
}

/// Contents of a `--config` file. Missing sections take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub horn: HornInputs,
    pub pipeline: PipelineConfig,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
