use serde::{Deserialize, Serialize};

/// Configuration for Go source discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Also read `_test.go` files
    pub include_tests: bool,

    /// Directory names never entered by recursive patterns
    pub skip_dirs: Vec<String>,

    /// How many parent directories to climb looking for go.mod
    pub max_module_depth: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            include_tests: false,
            skip_dirs: vec!["vendor".to_string(), "testdata".to_string()],
            max_module_depth: 10,
        }
    }
}

impl SourceConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_module_depth == 0 {
            return Err("max_module_depth must be > 0".to_string());
        }

        if let Some(bad) = self
            .skip_dirs
            .iter()
            .find(|dir| dir.is_empty() || dir.contains(['/', '\\']))
        {
            return Err(format!("skip_dirs entries must be plain directory names, got {bad:?}"));
        }

        Ok(())
    }

    /// Whether a directory name is excluded from recursive scans
    pub fn skips_dir(&self, name: &str) -> bool {
        name.starts_with('.') || name.starts_with('_') || self.skip_dirs.iter().any(|d| d == name)
    }

    /// Whether a file name should be read as a Go source file
    pub fn accepts_file(&self, name: &str) -> bool {
        name.ends_with(".go") && (self.include_tests || !name.ends_with("_test.go"))
    }
}
