use crate::directive::{Directive, DirectiveParser, Documentation};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Named declaration with lazily parsed documentation
///
/// Shared by types, functions and parameters. The raw comment lines are kept
/// until the first doc or directive lookup, which parses them exactly once.
pub struct Decl {
    name: String,
    comments: Vec<String>,
    parser: Arc<DirectiveParser>,
    parsed: OnceLock<Documentation>,
}

impl Decl {
    pub fn new(name: impl Into<String>, comments: Vec<String>, parser: Arc<DirectiveParser>) -> Self {
        Self {
            name: name.into(),
            comments,
            parser,
            parsed: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exported names start with an uppercase letter
    pub fn is_exported(&self) -> bool {
        ease_source::is_exported(&self.name)
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Free-text documentation with directive lines removed
    pub fn doc(&self) -> &str {
        &self.documentation().doc
    }

    pub fn directive(&self, name: &str) -> Option<&Directive> {
        self.documentation().directives.get(name)
    }

    pub fn directives(&self) -> &HashMap<String, Directive> {
        &self.documentation().directives
    }

    fn documentation(&self) -> &Documentation {
        self.parsed
            .get_or_init(|| self.parser.parse_comments(&self.comments))
    }
}

impl fmt::Debug for Decl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decl")
            .field("name", &self.name)
            .field("comments", &self.comments.len())
            .field("parsed", &self.parsed.get().is_some())
            .finish()
    }
}
