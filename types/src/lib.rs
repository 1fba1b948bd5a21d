//! Core data types for Kiln.
//!
//! Plain data with no IO: type descriptors, argument sets, bound argument
//! lists and constructed instances, plus the errors raised by the binder and
//! by constructors.

mod arguments;
mod descriptor;
mod error;
mod instance;

pub use arguments::{ArgumentKey, ArgumentSet, OrderedArguments};
pub use descriptor::{DescriptorError, ParameterDescriptor, TypeDescriptor};
pub use error::{ConstructionError, UnknownArgumentError};
pub use instance::Instance;

/// Universal argument value.
pub use serde_json::Value;
