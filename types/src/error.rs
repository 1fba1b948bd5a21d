//! Errors raised by the binder and by constructors.

use thiserror::Error;

/// One or more named arguments match no constructor parameter.
///
/// Raised once per bind with every offending name, never one error per key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown named argument(s) {} for type {type_name}", quoted(.names))]
pub struct UnknownArgumentError {
    pub type_name: String,
    pub names: Vec<String>,
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("'{name}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure raised by the construction mechanism itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("type {type_name} declares no constructor but received {count} argument(s)")]
    NoConstructor { type_name: String, count: usize },
    #[error("missing required argument '{name}' at position {position}")]
    MissingArgument { name: String, position: usize },
    #[error("invalid argument '{name}' at position {position}: {reason}")]
    InvalidArgument {
        name: String,
        position: usize,
        reason: String,
    },
    #[error("{0}")]
    Custom(String),
}

impl ConstructionError {
    #[must_use]
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}
