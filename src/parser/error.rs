use crate::types::{ArgValue, ValueKind};
use thiserror::Error;

/// Problems detected while registering arguments
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("An argument needs a long or a short name")]
    MissingName,

    #[error("Argument name '{0}' is already registered")]
    DuplicateName(String),

    #[error("Default value {value:?} of argument '{name}' does not fit type {kind}")]
    DefaultTypeMismatch {
        name: String,
        kind: ValueKind,
        value: ArgValue,
    },

    #[error("Argument '{0}' is not registered")]
    UnknownArgument(String),

    #[error("Argument '{0}' is a flag and takes no value to validate")]
    BoolHasNoValue(String),

    #[error("Invalid validation pattern for argument '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// Malformed command-line input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown argument {0}")]
    UnknownArgument(String),

    #[error("Argument {0} already processed !")]
    AlreadyProcessed(String),

    #[error("Argument {argument} expects {expected} value(s) but {found} were given")]
    MissingValue {
        argument: String,
        expected: usize,
        found: usize,
    },

    #[error("Value(s) associated with argument {argument} are incorrect. {message}")]
    InvalidValue { argument: String, message: String },
}
