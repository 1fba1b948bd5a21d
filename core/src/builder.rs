//! Instance builder: apply bound arguments to a registered constructor.

use kiln_types::{ConstructionError, Instance, OrderedArguments, TypeDescriptor, Value};

use crate::registry::TypeEntry;

/// Construct an instance of `entry` from `args`.
///
/// Non-empty arguments are applied positionally. Empty arguments are a
/// no-argument call: every parameter falls back to its declared default and
/// a required one arrives as `null`, exactly as if the caller had omitted it.
/// Errors from the constructor come back untouched.
pub fn build(entry: &TypeEntry, args: OrderedArguments) -> Result<Instance, ConstructionError> {
    let ty = entry.descriptor();
    let args = if args.is_empty() {
        no_argument_call(ty)
    } else if ty.has_constructor() {
        args
    } else {
        return Err(ConstructionError::NoConstructor {
            type_name: ty.name().to_string(),
            count: args.len(),
        });
    };

    tracing::trace!(
        type_name = ty.name(),
        arguments = args.len(),
        "Invoking constructor"
    );
    entry.construct(args)
}

fn no_argument_call(ty: &TypeDescriptor) -> OrderedArguments {
    ty.parameters()
        .iter()
        .map(|param| param.default_value().cloned().unwrap_or(Value::Null))
        .collect::<Vec<_>>()
        .into()
}
