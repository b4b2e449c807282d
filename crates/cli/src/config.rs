use anyhow::{anyhow, Context, Result};
use ease_parser::ParserConfig;
use ease_source::SourceConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "ease.toml";

/// Settings read from `ease.toml`
///
/// ```toml
/// jobs = 4
///
/// [parser]
/// directive_prefix = "ease"
/// producer_policy = "reject_ambiguous"
///
/// [source]
/// include_tests = false
/// skip_dirs = ["vendor", "testdata"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EaseConfig {
    pub parser: ParserConfig,
    pub source: SourceConfig,

    /// Loader threads
    pub jobs: usize,
}

impl Default for EaseConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            source: SourceConfig::default(),
            jobs: default_jobs(),
        }
    }
}

impl EaseConfig {
    /// Load `path`, or `ease.toml` in `cwd` when present, or defaults
    pub fn load(path: Option<&Path>, cwd: &Path) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (cwd.join(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.is_file() {
            log::debug!("No {} found, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;

        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.jobs == 0 {
            return Err(anyhow!("jobs must be > 0"));
        }
        self.parser.validate().map_err(|e| anyhow!(e))?;
        self.source.validate().map_err(|e| anyhow!(e))?;
        Ok(())
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
