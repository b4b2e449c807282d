use crate::analyzer::GoAnalyzer;
use crate::config::SourceConfig;
use crate::error::{Result, SourceError};
use crate::module::GoModule;
use crate::types::DeclarationUnit;
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};

const RECURSIVE_SUFFIX: &str = "...";

/// Discovers Go packages on disk and extracts their declaration units
pub struct Scanner {
    config: SourceConfig,
    analyzer: GoAnalyzer,
}

impl Scanner {
    pub fn new(config: SourceConfig) -> Result<Self> {
        config.validate().map_err(SourceError::invalid_config)?;

        Ok(Self {
            config,
            analyzer: GoAnalyzer::new()?,
        })
    }

    /// Scan several patterns, keeping their order
    pub fn scan_all<S: AsRef<str>>(&mut self, patterns: &[S]) -> Result<Vec<DeclarationUnit>> {
        let mut units = Vec::new();
        for pattern in patterns {
            units.extend(self.scan(pattern.as_ref())?);
        }

        log::info!(
            "Scanned {} files from {} pattern(s)",
            units.len(),
            patterns.len()
        );
        Ok(units)
    }

    /// Scan one directory, or a whole tree when the pattern ends with `/...`
    pub fn scan(&mut self, pattern: &str) -> Result<Vec<DeclarationUnit>> {
        let (root, recursive) = split_pattern(pattern);
        let root = fs::canonicalize(root)?;
        let module = GoModule::find(&root, self.config.max_module_depth)?;

        let dirs = if recursive {
            self.package_dirs(&root)
        } else {
            vec![root]
        };

        let mut units = Vec::new();
        for dir in dirs {
            let Some(package_path) = module.package_path(&dir) else {
                log::warn!("{} is outside module {}", dir.display(), module.path);
                continue;
            };
            units.extend(self.scan_package(&dir, &package_path)?);
        }

        Ok(units)
    }

    /// Extract every accepted file of a single package directory
    pub fn scan_package(&mut self, dir: &Path, package_path: &str) -> Result<Vec<DeclarationUnit>> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| self.config.accepts_file(name))
            })
            .collect();
        files.sort();

        let mut units = Vec::with_capacity(files.len());
        for file in files {
            let display = file.to_string_lossy().into_owned();
            let content = match fs::read_to_string(&file) {
                Ok(content) => content,
                Err(e) => {
                    log::warn!("Skipping {display}: {e}");
                    continue;
                }
            };

            match self.analyzer.analyze(&content, package_path, Some(&display)) {
                Ok(unit) => units.push(unit),
                Err(e) => log::warn!("Skipping {display}: {e}"),
            }
        }

        Ok(units)
    }

    fn package_dirs(&self, root: &Path) -> Vec<PathBuf> {
        let config = self.config.clone();
        let mut builder = WalkBuilder::new(root);
        builder.hidden(true).git_ignore(true).git_exclude(true);
        builder.filter_entry(move |entry| {
            if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_dir()) {
                return true;
            }
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| !config.skips_dir(name))
        });

        let mut dirs = Vec::new();
        for result in builder.build() {
            match result {
                Ok(entry) => {
                    if entry.file_type().is_some_and(|t| t.is_dir()) {
                        dirs.push(entry.into_path());
                    }
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        dirs.sort();
        dirs
    }
}

/// `dir/...` and `...` mean "dir and everything below it"
fn split_pattern(pattern: &str) -> (&str, bool) {
    match pattern.strip_suffix(RECURSIVE_SUFFIX) {
        Some(rest) => {
            let rest = rest.trim_end_matches('/');
            (if rest.is_empty() { "." } else { rest }, true)
        }
        None => (pattern, false),
    }
}
