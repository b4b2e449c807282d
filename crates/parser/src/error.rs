use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParserError>;

#[derive(Error, Debug)]
pub enum ParserError {
    /// No known function returns the requested type
    #[error("could not find a valid constructor for {ty}{}", required_by_suffix(.required_by))]
    MissingConstructor {
        ty: String,
        required_by: Option<String>,
    },

    /// The constructor graph loops back onto a type being resolved
    #[error("circular dependency: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    /// Several constructors produce the type and the policy forbids picking one
    #[error("ambiguous constructor for {ty}: {}", .candidates.join(", "))]
    AmbiguousConstructor { ty: String, candidates: Vec<String> },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid directive pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl ParserError {
    pub fn missing_constructor(ty: impl Into<String>, required_by: Option<&str>) -> Self {
        Self::MissingConstructor {
            ty: ty.into(),
            required_by: required_by.map(str::to_string),
        }
    }
}

fn required_by_suffix(required_by: &Option<String>) -> String {
    required_by
        .as_ref()
        .map(|func| format!(" (required by {func})"))
        .unwrap_or_default()
}
