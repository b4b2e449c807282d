use crate::error::{Result, SourceError};
use std::fs;
use std::path::{Path, PathBuf};

const GO_MOD_FILENAME: &str = "go.mod";

/// A Go module: import path prefix plus the directory holding its go.mod
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModule {
    pub path: String,
    pub dir: PathBuf,
}

impl GoModule {
    /// Find the module owning `dir`, climbing at most `max_depth` parents
    pub fn find(dir: &Path, max_depth: usize) -> Result<Self> {
        let mut current = dir.to_path_buf();

        for _ in 0..=max_depth {
            let candidate = current.join(GO_MOD_FILENAME);
            if candidate.is_file() {
                let content = fs::read_to_string(&candidate)?;
                let path = parse_module_path(&content)
                    .ok_or_else(|| SourceError::InvalidModule(candidate.clone()))?;

                log::debug!("Found module {path} at {}", current.display());
                return Ok(Self { path, dir: current });
            }

            if !current.pop() {
                break;
            }
        }

        Err(SourceError::ModuleNotFound {
            dir: dir.to_path_buf(),
            depth: max_depth,
        })
    }

    /// Import path of the package living in `dir`, if it is inside the module
    pub fn package_path(&self, dir: &Path) -> Option<String> {
        let relative = dir.strip_prefix(&self.dir).ok()?;

        let mut path = self.path.clone();
        for component in relative.components() {
            path.push('/');
            path.push_str(&component.as_os_str().to_string_lossy());
        }

        Some(path)
    }
}

/// Extract the `module` directive of a go.mod file
pub fn parse_module_path(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or_default().trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }

        let path = rest.trim().trim_matches('"');
        (!path.is_empty()).then(|| path.to_string())
    })
}
