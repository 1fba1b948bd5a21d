//! Construction pipeline for Kiln.
//!
//! Given a registered type name and an [`ArgumentSet`](kiln_types::ArgumentSet),
//! [`Pipeline::create_instance`] runs:
//!
//! 1. the argument resolver chain ([`resolver`]),
//! 2. the parameter binder ([`binder`]),
//! 3. the instance builder ([`builder`]),
//! 4. the context initializer chain ([`initializer`]).
//!
//! Everything is synchronous and sequential; registration order is the
//! execution order.

pub mod binder;
pub mod builder;
mod error;
pub mod initializer;
mod pipeline;
pub mod registry;
pub mod resolver;

pub use binder::bind;
pub use error::{CreateError, Stage};
pub use initializer::{ContextInitializer, InitializerChain};
pub use pipeline::Pipeline;
pub use registry::{Constructible, DuplicateTypeError, TypeEntry, TypeRegistry};
pub use resolver::{ArgumentResolver, ResolverChain};
