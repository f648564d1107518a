//! Error type shared by URL resolution, template compilation and href generation
//!
//! Matching never produces an error: a URL either satisfies a rule or it does not.
//! Every variant here signals that the caller asked for something the rule cannot give.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    /// A string could not be resolved into an absolute URL
    #[error("invalid URL {input:?}: {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    /// The template text itself is malformed
    #[error("invalid template {template:?}: {message}")]
    Template { template: String, message: String },

    /// An inline `(pattern)` is not a valid regular expression
    #[error("invalid pattern in template {template:?}: {source}")]
    Pattern {
        template: String,
        #[source]
        source: regex::Error,
    },

    /// A required named value was not supplied
    #[error("expected {name:?} to be a string")]
    MissingParam { name: String },

    /// A supplied value does not satisfy its segment pattern
    #[error("expected {name:?} to match {pattern:?}, but got {value:?}")]
    ConstraintViolation {
        name: String,
        pattern: String,
        value: String,
    },

    /// The generated href was rejected by the rule's condition
    #[error("expected href {href:?} to pass the condition defined on the rule")]
    ConditionRejected { href: String },

    /// Parameters could not be converted to or from a typed value
    #[error("invalid parameters: {0}")]
    Params(String),
}

impl RuleError {
    pub(crate) fn template(template: &str, message: impl Into<String>) -> Self {
        RuleError::Template {
            template: template.to_string(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for RuleError {
    fn from(err: serde_json::Error) -> Self {
        RuleError::Params(err.to_string())
    }
}
