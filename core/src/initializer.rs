//! Post-construction initializer chain.

use std::any;
use std::fmt;

use kiln_types::Instance;

/// Performs side effects on a freshly built instance: attaching
/// collaborators, registering subscriptions, and the like.
///
/// Initializers are not assumed idempotent or reorderable.
pub trait ContextInitializer: Send + Sync {
    fn initialize(&self, instance: &mut Instance) -> anyhow::Result<()>;

    /// Label used in trace output.
    fn name(&self) -> &str {
        any::type_name::<Self>()
    }
}

impl<F> ContextInitializer for F
where
    F: Fn(&mut Instance) -> anyhow::Result<()> + Send + Sync,
{
    fn initialize(&self, instance: &mut Instance) -> anyhow::Result<()> {
        self(instance)
    }

    fn name(&self) -> &str {
        "closure"
    }
}

/// Ordered, append-only list of initializers.
#[derive(Default)]
pub struct InitializerChain {
    initializers: Vec<Box<dyn ContextInitializer>>,
}

impl InitializerChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, initializer: impl ContextInitializer + 'static) {
        self.initializers.push(Box::new(initializer));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.initializers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.initializers.is_empty()
    }

    /// Run every initializer in registration order. The first failure stops
    /// the chain; initializers that already ran are not undone.
    pub fn initialize(&self, instance: &mut Instance) -> anyhow::Result<()> {
        for (index, initializer) in self.initializers.iter().enumerate() {
            tracing::trace!(
                type_name = instance.type_name(),
                index,
                initializer = initializer.name(),
                "Running context initializer"
            );
            initializer.initialize(instance)?;
        }
        Ok(())
    }
}

impl fmt::Debug for InitializerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.initializers.iter().map(|i| i.name()))
            .finish()
    }
}
