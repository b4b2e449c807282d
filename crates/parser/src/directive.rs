use crate::error::{ParserError, Result};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

/// Structured annotation parsed from a doc comment line
///
/// `//ease:api method=POST path=/api/todos` yields a directive named `api`
/// with the params `method` and `path`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Directive {
    pub name: String,
    pub params: HashMap<String, String>,
}

impl Directive {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Documentation split into free text and directives
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Documentation {
    /// Non-directive lines, newline-joined
    pub doc: String,

    /// Directives by name, the last line wins on duplicates
    pub directives: HashMap<String, Directive>,
}

/// Recognizes `<prefix>:<name> key=value ...` lines
///
/// Only the head is anchored: the name is the leading run of word characters,
/// whatever follows it (`ease:api-v2`, `ease:api=1`) is tokenized as params.
#[derive(Debug, Clone)]
pub struct DirectiveParser {
    prefix: String,
    head: Regex,
}

impl DirectiveParser {
    pub fn new(prefix: &str) -> Result<Self> {
        if prefix.is_empty() {
            return Err(ParserError::InvalidConfig(
                "directive prefix must not be empty".to_string(),
            ));
        }

        let head = Regex::new(&format!(r"^{}:(\w+)(.*)$", regex::escape(prefix)))?;

        Ok(Self {
            prefix: prefix.to_string(),
            head,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Parse one sanitized comment line, `None` when it is plain documentation
    pub fn parse_line(&self, line: &str) -> Option<Directive> {
        let captures = self.head.captures(line.trim())?;
        let name = captures.get(1)?.as_str().to_string();

        let mut params = HashMap::new();
        if let Some(rest) = captures.get(2) {
            for token in rest.as_str().split_whitespace() {
                match parse_param(token) {
                    Some((key, value)) => {
                        params.insert(key.to_string(), value.to_string());
                    }
                    None => log::debug!("Skipping malformed token {token:?} in {name} directive"),
                }
            }
        }

        Some(Directive { name, params })
    }

    /// Split raw comment lines (markers included) into doc text and directives
    pub fn parse_comments<S: AsRef<str>>(&self, lines: &[S]) -> Documentation {
        let mut documentation = Documentation::default();
        let mut doc_lines = Vec::new();

        for line in lines.iter().flat_map(|l| l.as_ref().lines()) {
            let sanitized = sanitize_comment(line);
            match self.parse_line(sanitized) {
                Some(directive) => {
                    documentation
                        .directives
                        .insert(directive.name.clone(), directive);
                }
                None => doc_lines.push(sanitized),
            }
        }

        documentation.doc = doc_lines.join("\n").trim_matches('\n').to_string();
        documentation
    }
}

fn parse_param(token: &str) -> Option<(&str, &str)> {
    let (key, value) = token.split_once('=')?;
    let valid_key = !key.is_empty() && key.chars().all(|c| c.is_alphanumeric() || c == '_');

    (valid_key && !value.is_empty()).then_some((key, value))
}

/// Strip comment markers (`//`, `/* */`, leading `*` of block bodies)
pub fn sanitize_comment(line: &str) -> &str {
    let line = line.trim();

    let body = match line.strip_prefix("//") {
        Some(rest) => rest,
        None => {
            let rest = line.strip_prefix("/*").unwrap_or(line);
            let rest = rest.strip_suffix("*/").unwrap_or(rest);
            let trimmed = rest.trim_start();
            trimmed.strip_prefix('*').unwrap_or(trimmed)
        }
    };

    body.trim()
}
