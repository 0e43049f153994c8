use std::path::Path;

use serde::Deserialize;

/// Configuration loaded from `ref-graph.toml` at the scanned root.
#[derive(Debug, Deserialize, Default)]
pub struct RefGraphConfig {
    /// Additional path patterns to exclude from the scan (beyond .gitignore
    /// and the built-in directory exclusions).
    pub exclude: Option<Vec<String>>,
}

impl RefGraphConfig {
    /// Load configuration from `ref-graph.toml` in the given root directory.
    ///
    /// Returns a default (empty) configuration if the file does not exist or
    /// cannot be parsed.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join("ref-graph.toml");

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("warning: failed to parse ref-graph.toml: {err}. Using defaults.");
                    Self::default()
                }
            },
            Err(err) => {
                eprintln!("warning: failed to read ref-graph.toml: {err}. Using defaults.");
                Self::default()
            }
        }
    }
}
