//! Parameter binding: mixed named/positional arguments onto constructor order.
//!
//! Lookup per parameter is name, then position, then declared default, then
//! `null`. Only unknown *names* are rejected here. Missing required values
//! and surplus positional arguments are left for the constructor to judge.

use kiln_types::{ArgumentSet, OrderedArguments, TypeDescriptor, UnknownArgumentError, Value};

/// Map `args` onto the parameter order of `ty`.
///
/// A type without a constructor, or an empty argument set, short-circuits:
/// the set's values come back in key order with no validation at all.
pub fn bind(
    ty: &TypeDescriptor,
    args: &ArgumentSet,
) -> Result<OrderedArguments, UnknownArgumentError> {
    if !ty.has_constructor() || args.is_empty() {
        return Ok(OrderedArguments::new(args.values().cloned().collect()));
    }

    let parameters = ty.parameters();

    let unknown: Vec<String> = args
        .names()
        .filter(|name| !parameters.iter().any(|p| p.name() == *name))
        .map(ToString::to_string)
        .collect();
    if !unknown.is_empty() {
        tracing::debug!(
            type_name = ty.name(),
            unknown = ?unknown,
            "Rejecting unknown named arguments"
        );
        return Err(UnknownArgumentError {
            type_name: ty.name().to_string(),
            names: unknown,
        });
    }

    let values = parameters
        .iter()
        .map(|param| {
            args.named(param.name())
                .or_else(|| args.positional(param.position()))
                .or_else(|| param.default_value())
                .cloned()
                .unwrap_or(Value::Null)
        })
        .collect();

    Ok(OrderedArguments::new(values))
}
