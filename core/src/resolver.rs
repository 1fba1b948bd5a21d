//! Argument resolver chain.
//!
//! Resolvers run in registration order; each one's output is the next one's
//! input. The chain never skips a resolver and never catches its errors.

use std::any;
use std::fmt;

use kiln_types::{ArgumentSet, TypeDescriptor};

/// Augments or transforms the argument set before binding.
///
/// A resolver that has nothing to contribute for a type returns `args`
/// unchanged.
pub trait ArgumentResolver: Send + Sync {
    fn resolve(&self, ty: &TypeDescriptor, args: ArgumentSet) -> anyhow::Result<ArgumentSet>;

    /// Label used in trace output.
    fn name(&self) -> &str {
        any::type_name::<Self>()
    }
}

impl<F> ArgumentResolver for F
where
    F: Fn(&TypeDescriptor, ArgumentSet) -> anyhow::Result<ArgumentSet> + Send + Sync,
{
    fn resolve(&self, ty: &TypeDescriptor, args: ArgumentSet) -> anyhow::Result<ArgumentSet> {
        self(ty, args)
    }

    fn name(&self) -> &str {
        "closure"
    }
}

/// Ordered, append-only list of resolvers.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn ArgumentResolver>>,
}

impl ResolverChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, resolver: impl ArgumentResolver + 'static) {
        self.resolvers.push(Box::new(resolver));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub fn resolve(&self, ty: &TypeDescriptor, args: ArgumentSet) -> anyhow::Result<ArgumentSet> {
        self.resolvers
            .iter()
            .enumerate()
            .try_fold(args, |args, (index, resolver)| {
                tracing::trace!(
                    type_name = ty.name(),
                    index,
                    resolver = resolver.name(),
                    arguments = args.len(),
                    "Running argument resolver"
                );
                resolver.resolve(ty, args)
            })
    }
}

impl fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.resolvers.iter().map(|r| r.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;
    use kiln_types::{ArgumentSet, TypeDescriptor, Value};
    use serde_json::json;

    use super::{ArgumentResolver, ResolverChain};

    struct AddKey(&'static str, i64);

    impl ArgumentResolver for AddKey {
        fn resolve(&self, _ty: &TypeDescriptor, args: ArgumentSet) -> anyhow::Result<ArgumentSet> {
            Ok(args.with(self.0, self.1))
        }
    }

    fn require_a(_ty: &TypeDescriptor, args: ArgumentSet) -> anyhow::Result<ArgumentSet> {
        if !args.contains_name("a") {
            bail!("argument 'a' has not been resolved");
        }
        Ok(args)
    }

    #[test]
    fn empty_chain_is_identity() {
        let chain = ResolverChain::new();
        let ty = TypeDescriptor::new("Foo");
        let args = ArgumentSet::new().with("x", 1);
        assert_eq!(chain.resolve(&ty, args.clone()).unwrap(), args);
    }

    #[test]
    fn output_of_each_resolver_feeds_the_next() {
        let mut chain = ResolverChain::new();
        chain.register(AddKey("a", 1));
        chain.register(|_: &TypeDescriptor, args: ArgumentSet| -> anyhow::Result<ArgumentSet> {
            let doubled = args.named("a").and_then(Value::as_i64).unwrap_or(0) * 2;
            Ok(args.with("b", doubled))
        });
        let ty = TypeDescriptor::new("Foo");
        let out = chain.resolve(&ty, ArgumentSet::new()).unwrap();
        assert_eq!(out.named("b"), Some(&json!(2)));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn registration_order_is_load_bearing() {
        let ty = TypeDescriptor::new("Foo");

        let mut ordered = ResolverChain::new();
        ordered.register(AddKey("a", 1));
        ordered.register(require_a);
        assert!(ordered.resolve(&ty, ArgumentSet::new()).is_ok());

        let mut reversed = ResolverChain::new();
        reversed.register(require_a);
        reversed.register(AddKey("a", 1));
        let err = reversed.resolve(&ty, ArgumentSet::new()).unwrap_err();
        assert_eq!(err.to_string(), "argument 'a' has not been resolved");
    }

    #[test]
    fn later_resolver_overrides_earlier_value() {
        let mut chain = ResolverChain::new();
        chain.register(AddKey("a", 1));
        chain.register(AddKey("a", 2));
        let out = chain
            .resolve(&TypeDescriptor::new("Foo"), ArgumentSet::new())
            .unwrap();
        assert_eq!(out.named("a"), Some(&json!(2)));
    }

    #[test]
    fn failure_stops_the_chain() {
        let mut chain = ResolverChain::new();
        chain.register(require_a);
        chain.register(|_: &TypeDescriptor, _: ArgumentSet| -> anyhow::Result<ArgumentSet> {
            panic!("must not run after a failing resolver")
        });
        let ty = TypeDescriptor::new("Foo");
        let err = chain.resolve(&ty, ArgumentSet::new()).unwrap_err();
        assert_eq!(err.to_string(), "argument 'a' has not been resolved");
    }
}
