//! The construction pipeline.
//!
//! ```text
//! Start -> Resolve -> Bind -> Build -> Initialize -> Done
//!             \         \       \          \
//!              +---------+-------+----------+--> Failed
//! ```
//!
//! One forward path, no retries, no rollback. Registration needs `&mut self`
//! and construction `&self`, so the chains cannot change while a call is in
//! flight; a fully registered `Pipeline` is `Send + Sync` and may serve
//! concurrent calls.

use std::any;

use kiln_types::{ArgumentSet, ConstructionError, Instance, OrderedArguments, TypeDescriptor};

use crate::binder::bind;
use crate::builder::build;
use crate::error::{CreateError, Stage};
use crate::initializer::{ContextInitializer, InitializerChain};
use crate::registry::{Constructible, DuplicateTypeError, TypeRegistry};
use crate::resolver::{ArgumentResolver, ResolverChain};

#[derive(Debug, Default)]
pub struct Pipeline {
    types: TypeRegistry,
    resolvers: ResolverChain,
    initializers: InitializerChain,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolver. Resolvers run in the order they were registered.
    pub fn register_argument_resolver(
        &mut self,
        resolver: impl ArgumentResolver + 'static,
    ) -> &mut Self {
        self.resolvers.register(resolver);
        self
    }

    /// Append an initializer. Initializers run in the order they were registered.
    pub fn register_context_initializer(
        &mut self,
        initializer: impl ContextInitializer + 'static,
    ) -> &mut Self {
        self.initializers.register(initializer);
        self
    }

    pub fn register_type<T: Constructible>(&mut self) -> Result<&mut Self, DuplicateTypeError> {
        self.types.register::<T>()?;
        Ok(self)
    }

    pub fn register_factory<F>(
        &mut self,
        descriptor: TypeDescriptor,
        factory: F,
    ) -> Result<&mut Self, DuplicateTypeError>
    where
        F: Fn(OrderedArguments) -> Result<Instance, ConstructionError> + Send + Sync + 'static,
    {
        self.types.register_factory(descriptor, factory)?;
        Ok(self)
    }

    #[must_use]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    #[must_use]
    pub fn resolvers(&self) -> &ResolverChain {
        &self.resolvers
    }

    #[must_use]
    pub fn initializers(&self) -> &InitializerChain {
        &self.initializers
    }

    /// Build and initialize an instance of `type_name`.
    ///
    /// `args` is never modified; the resolver chain works on its own copy.
    pub fn create_instance(
        &self,
        type_name: &str,
        args: &ArgumentSet,
    ) -> Result<Instance, CreateError> {
        let entry = self
            .types
            .get(type_name)
            .ok_or_else(|| CreateError::UnknownType(type_name.to_string()))?;
        let ty = entry.descriptor();

        tracing::debug!(
            type_name,
            stage = %Stage::Resolve,
            resolvers = self.resolvers.len(),
            arguments = args.len(),
            "Resolving arguments"
        );
        let resolved = self
            .resolvers
            .resolve(ty, args.clone())
            .map_err(CreateError::Resolve)?;

        tracing::debug!(
            type_name,
            stage = %Stage::Bind,
            names = ?resolved.names().collect::<Vec<_>>(),
            arguments = resolved.len(),
            "Binding arguments"
        );
        let ordered = bind(ty, &resolved)?;

        tracing::debug!(
            type_name,
            stage = %Stage::Build,
            arguments = ordered.len(),
            "Building instance"
        );
        let mut instance = build(entry, ordered)?;

        tracing::debug!(
            type_name,
            stage = %Stage::Initialize,
            initializers = self.initializers.len(),
            "Initializing instance"
        );
        self.initializers
            .initialize(&mut instance)
            .map_err(CreateError::Initialize)?;

        Ok(instance)
    }

    /// Typed form of [`create_instance`](Self::create_instance) for a type
    /// registered through [`register_type`](Self::register_type).
    pub fn create<T: Constructible>(&self, args: &ArgumentSet) -> Result<T, CreateError> {
        let type_name = self
            .types
            .name_of::<T>()
            .ok_or_else(|| CreateError::UnknownType(any::type_name::<T>().to_string()))?;
        self.create_instance(type_name, args)?
            .downcast::<T>()
            .map_err(|instance| CreateError::TypeMismatch {
                type_name: instance.type_name().to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::thread;

    use anyhow::{anyhow, bail};
    use kiln_types::{
        ArgumentSet, ConstructionError, Instance, OrderedArguments, TypeDescriptor, Value,
    };
    use serde_json::json;

    use super::Pipeline;
    use crate::error::{CreateError, Stage};
    use crate::registry::Constructible;

    #[derive(Debug, PartialEq)]
    struct Foo {
        a: i64,
        b: i64,
        tags: Vec<&'static str>,
    }

    impl Constructible for Foo {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::new("Foo").required("a").optional("b", 5)
        }

        fn construct(args: OrderedArguments) -> Result<Self, ConstructionError> {
            Ok(Self {
                a: args.take(0, "a")?,
                b: args.take(1, "b")?,
                tags: Vec::new(),
            })
        }
    }

    #[derive(Debug, PartialEq)]
    struct Empty;

    impl Constructible for Empty {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::nullary("Empty")
        }

        fn construct(_args: OrderedArguments) -> Result<Self, ConstructionError> {
            Ok(Self)
        }
    }

    fn pipeline() -> Pipeline {
        let mut pipeline = Pipeline::new();
        pipeline.register_type::<Foo>().unwrap();
        pipeline.register_type::<Empty>().unwrap();
        pipeline
    }

    #[test]
    fn binds_defaults_and_builds() {
        let args = ArgumentSet::new().with("a", 1);
        let foo: Foo = pipeline().create(&args).unwrap();
        assert_eq!(
            foo,
            Foo {
                a: 1,
                b: 5,
                tags: vec![],
            }
        );
    }

    #[test]
    fn unknown_named_argument_fails_at_bind() {
        let err = pipeline()
            .create::<Foo>(&ArgumentSet::new().with("a", 1).with("c", 2))
            .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Bind));
        match err {
            CreateError::UnknownArgument(inner) => assert_eq!(inner.names, vec!["c".to_string()]),
            other => panic!("expected UnknownArgument, got {other:?}"),
        }
    }

    #[test]
    fn missing_required_surfaces_as_construction_error() {
        let err = pipeline()
            .create::<Foo>(&ArgumentSet::new().with("b", 2))
            .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Build));
        assert_eq!(
            err.to_string(),
            "missing required argument 'a' at position 0"
        );
    }

    #[test]
    fn nullary_type_with_no_arguments() {
        let empty: Empty = pipeline().create(&ArgumentSet::new()).unwrap();
        assert_eq!(empty, Empty);
    }

    #[test]
    fn resolver_supplies_required_argument() {
        let mut pipeline = pipeline();
        pipeline.register_argument_resolver(
            |ty: &TypeDescriptor, args: ArgumentSet| -> anyhow::Result<ArgumentSet> {
                if ty.name() == "Foo" && !args.contains_name("a") {
                    return Ok(args.with("a", 42));
                }
                Ok(args)
            },
        );
        let foo: Foo = pipeline.create(&ArgumentSet::new()).unwrap();
        assert_eq!(foo.a, 42);
        assert_eq!(foo.b, 5);
    }

    #[test]
    fn caller_arguments_are_not_mutated() {
        let mut pipeline = pipeline();
        pipeline.register_argument_resolver(
            |_: &TypeDescriptor, mut args: ArgumentSet| -> anyhow::Result<ArgumentSet> {
                args.insert("b", 9);
                Ok(args)
            },
        );
        let args = ArgumentSet::new().with("a", 1);
        let foo: Foo = pipeline.create(&args).unwrap();
        assert_eq!(foo.b, 9);
        assert_eq!(args, ArgumentSet::new().with("a", 1));
    }

    #[test]
    fn resolver_order_decides_success() {
        fn adds_a(_: &TypeDescriptor, args: ArgumentSet) -> anyhow::Result<ArgumentSet> {
            Ok(args.with("a", 1))
        }
        fn needs_a(_: &TypeDescriptor, args: ArgumentSet) -> anyhow::Result<ArgumentSet> {
            if args.named("a").is_none() {
                bail!("'a' must be resolved first");
            }
            Ok(args)
        }

        let mut ordered = pipeline();
        ordered
            .register_argument_resolver(adds_a)
            .register_argument_resolver(needs_a);
        assert!(ordered.create::<Foo>(&ArgumentSet::new()).is_ok());

        let mut reversed = pipeline();
        reversed
            .register_argument_resolver(needs_a)
            .register_argument_resolver(adds_a);
        let err = reversed.create::<Foo>(&ArgumentSet::new()).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Resolve));
        assert_eq!(err.to_string(), "'a' must be resolved first");
    }

    #[test]
    fn initializers_run_in_order_after_build() {
        let mut pipeline = pipeline();
        for tag in ["first", "second"] {
            pipeline.register_context_initializer(
                move |instance: &mut Instance| -> anyhow::Result<()> {
                    if let Some(foo) = instance.downcast_mut::<Foo>() {
                        foo.tags.push(tag);
                    }
                    Ok(())
                },
            );
        }
        let foo: Foo = pipeline.create(&ArgumentSet::new().with("a", 1)).unwrap();
        assert_eq!(foo.tags, vec!["first", "second"]);
    }

    #[test]
    fn initializers_run_for_parameterless_types() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = pipeline();
        for label in ["one", "two"] {
            let seen = Arc::clone(&seen);
            pipeline.register_context_initializer(
                move |instance: &mut Instance| -> anyhow::Result<()> {
                    let entry = format!("{label}:{}", instance.type_name());
                    seen.lock().unwrap().push(entry);
                    Ok(())
                },
            );
        }
        pipeline.create::<Empty>(&ArgumentSet::new()).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["one:Empty", "two:Empty"]);
    }

    #[test]
    fn initializer_failure_is_terminal() {
        let mut pipeline = pipeline();
        pipeline.register_context_initializer(|_: &mut Instance| -> anyhow::Result<()> {
            Err(anyhow!("subscription refused"))
        });
        let err = pipeline
            .create::<Foo>(&ArgumentSet::new().with("a", 1))
            .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Initialize));
        assert_eq!(err.to_string(), "subscription refused");
    }

    #[test]
    fn unknown_type_name() {
        let err = pipeline()
            .create_instance("Missing", &ArgumentSet::new())
            .unwrap_err();
        assert!(matches!(err, CreateError::UnknownType(ref name) if name == "Missing"));
        assert_eq!(err.stage(), None);
    }

    #[test]
    fn factory_registered_types_are_dynamic() {
        let mut pipeline = Pipeline::new();
        let pair = TypeDescriptor::new("Pair")
            .required("left")
            .optional("right", "r");
        pipeline
            .register_factory(pair, |args| Ok(Instance::new("Pair", args.into_vec())))
            .unwrap();
        let instance = pipeline
            .create_instance("Pair", &ArgumentSet::new().with_positional(0, "l"))
            .unwrap();
        assert_eq!(instance.type_name(), "Pair");
        assert_eq!(
            instance.downcast_ref::<Vec<Value>>().unwrap(),
            &vec![json!("l"), json!("r")]
        );
    }

    #[test]
    fn pipeline_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Pipeline>();

        let pipeline = Arc::new(pipeline());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let pipeline = Arc::clone(&pipeline);
                thread::spawn(move || {
                    pipeline
                        .create::<Foo>(&ArgumentSet::new().with("a", i))
                        .map(|foo| foo.a)
                })
            })
            .collect();
        let mut results: Vec<i64> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();
        results.sort_unstable();
        assert_eq!(results, vec![0, 1, 2, 3]);
    }
}
