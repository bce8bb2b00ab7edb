// Fri Oct 16 2026 - Alex

use crate::symbol::{DEFAULT_CODE_SECTIONS, DEFAULT_UPCAST_FUNCTION};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub artifact: Option<PathBuf>,
    pub output_file: PathBuf,
    pub code_sections: Vec<String>,
    pub upcast_function: String,
    pub pretty_print: bool,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            artifact: None,
            output_file: PathBuf::from("casts_table.json"),
            code_sections: DEFAULT_CODE_SECTIONS.iter().map(|s| s.to_string()).collect(),
            upcast_function: DEFAULT_UPCAST_FUNCTION.to_string(),
            pretty_print: true,
            verbose: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let text = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config {}: {}", path.as_ref().display(), e))?;
        let config: Config = serde_json::from_str(&text)
            .map_err(|e| format!("Failed to parse config {}: {}", path.as_ref().display(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_artifact(mut self, artifact: PathBuf) -> Self {
        self.artifact = Some(artifact);
        self
    }

    pub fn with_output_file(mut self, output: PathBuf) -> Self {
        self.output_file = output;
        self
    }

    pub fn with_code_sections(mut self, sections: Vec<String>) -> Self {
        self.code_sections = sections;
        self
    }

    pub fn with_upcast_function(mut self, function: &str) -> Self {
        self.upcast_function = function.to_string();
        self
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.code_sections.is_empty() {
            return Err("code_sections must name at least one section".to_string());
        }
        if self.code_sections.iter().any(|s| s.trim().is_empty()) {
            return Err("code_sections must not contain empty names".to_string());
        }
        if self.upcast_function.trim().is_empty() {
            return Err("upcast_function must not be empty".to_string());
        }
        Ok(())
    }
}
