//! Resolver that fills arguments from configuration.

use std::collections::HashMap;

use kiln_core::ArgumentResolver;
use kiln_types::{ArgumentSet, TypeDescriptor, Value};

/// Supplies per-type named arguments from `[arguments.<Type>]` tables.
///
/// Caller-supplied values win: a configured value is only added when the
/// caller passed neither that name nor a positional argument at the matching
/// parameter's position. Types without configured arguments pass through.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredArgumentsResolver {
    arguments: HashMap<String, Vec<(String, Value)>>,
}

impl ConfiguredArgumentsResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure `name = value` for `type_name`. Later calls for the same
    /// name replace earlier ones.
    pub fn insert(&mut self, type_name: impl Into<String>, name: impl Into<String>, value: Value) {
        let name = name.into();
        let entries = self.arguments.entry(type_name.into()).or_default();
        match entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => entries.push((name, value)),
        }
    }

    #[must_use]
    pub fn configured(&self, type_name: &str) -> &[(String, Value)] {
        self.arguments
            .get(type_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl ArgumentResolver for ConfiguredArgumentsResolver {
    fn resolve(&self, ty: &TypeDescriptor, mut args: ArgumentSet) -> anyhow::Result<ArgumentSet> {
        for (name, value) in self.configured(ty.name()) {
            if args.contains_name(name) {
                continue;
            }
            let supplied_positionally = ty
                .parameter(name)
                .is_some_and(|param| args.positional(param.position()).is_some());
            if supplied_positionally {
                continue;
            }
            tracing::trace!(
                type_name = ty.name(),
                argument = %name,
                "Applying configured argument"
            );
            args.insert(name.as_str(), value.clone());
        }
        Ok(args)
    }

    fn name(&self) -> &str {
        "configured-arguments"
    }
}
