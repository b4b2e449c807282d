use serde::{Deserialize, Serialize};

/// Configuration of the model builder and resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Namespace of directives, `ease` matches `//ease:api ...`
    pub directive_prefix: String,

    /// What to do when several functions produce the same type
    pub producer_policy: ProducerPolicy,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            directive_prefix: "ease".to_string(),
            producer_policy: ProducerPolicy::FirstRegistered,
        }
    }
}

impl ParserConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.directive_prefix.is_empty() {
            return Err("directive_prefix must not be empty".to_string());
        }

        if !self
            .directive_prefix
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
        {
            return Err(format!(
                "directive_prefix ({}) may only contain letters, digits, '_', '-' and '.'",
                self.directive_prefix
            ));
        }

        Ok(())
    }
}

/// Selection rule when more than one constructor returns a type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProducerPolicy {
    /// The first function in declaration order wins
    #[default]
    FirstRegistered,

    /// Fail with an ambiguity error listing every candidate
    RejectAmbiguous,
}

impl ProducerPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstRegistered => "first_registered",
            Self::RejectAmbiguous => "reject_ambiguous",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(ParserConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_prefix() {
        let config = ParserConfig {
            directive_prefix: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ParserConfig {
            directive_prefix: "my prefix".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
