//! Failure of a single `create_instance` call.

use std::fmt;

use kiln_types::{ConstructionError, UnknownArgumentError};
use thiserror::Error;

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Resolve,
    Bind,
    Build,
    Initialize,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::Resolve => "resolve",
            Stage::Bind => "bind",
            Stage::Build => "build",
            Stage::Initialize => "initialize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every variant that wraps a collaborator's error is transparent: the caller
/// sees the original message with nothing added.
#[derive(Debug, Error)]
pub enum CreateError {
    #[error("type {0} is not registered")]
    UnknownType(String),
    #[error(transparent)]
    Resolve(anyhow::Error),
    #[error(transparent)]
    UnknownArgument(#[from] UnknownArgumentError),
    #[error(transparent)]
    Construction(#[from] ConstructionError),
    #[error(transparent)]
    Initialize(anyhow::Error),
    #[error("type {type_name} was built as a different Rust type than requested")]
    TypeMismatch { type_name: String },
}

impl CreateError {
    /// Stage that failed. `None` for an unknown type name or a typed
    /// [`create`](crate::Pipeline::create) whose downcast did not match.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            CreateError::UnknownType(_) | CreateError::TypeMismatch { .. } => None,
            CreateError::Resolve(_) => Some(Stage::Resolve),
            CreateError::UnknownArgument(_) => Some(Stage::Bind),
            CreateError::Construction(_) => Some(Stage::Build),
            CreateError::Initialize(_) => Some(Stage::Initialize),
        }
    }
}
