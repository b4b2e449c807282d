use crate::hash::hex_prefix;
use std::fmt;
use std::sync::OnceLock;

/// A package, identified by its import path
#[derive(Debug)]
pub struct Package {
    name: String,
    path: String,
    alias: OnceLock<String>,
}

impl Package {
    pub(crate) fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: package_name(&path).to_string(),
            path,
            alias: OnceLock::new(),
        }
    }

    /// Short name, the last path segment
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Identifier unique per path, e.g. `service_1f3a`
    pub fn alias(&self) -> &str {
        self.alias
            .get_or_init(|| format!("{}_{}", sanitize_ident(&self.name), hex_prefix(&self.path, 4)))
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Last segment of an import path, skipping a trailing `vN` major version
pub(crate) fn package_name(path: &str) -> &str {
    let mut segments = path.rsplit('/').filter(|s| !s.is_empty());
    let last = segments.next().unwrap_or(path);

    if is_major_version(last) {
        if let Some(previous) = segments.next() {
            return previous;
        }
    }

    last
}

fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}

pub(crate) fn sanitize_ident(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
