//! Type table: descriptors and constructors keyed by type name.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use kiln_types::{ConstructionError, Instance, OrderedArguments, TypeDescriptor};
use thiserror::Error;

/// A Rust type that can describe and build itself from bound arguments.
pub trait Constructible: Any + Send + Sized {
    fn descriptor() -> TypeDescriptor;

    /// `args` holds exactly one value per declared parameter when the type
    /// declares a constructor, and nothing otherwise.
    fn construct(args: OrderedArguments) -> Result<Self, ConstructionError>;
}

type Factory = Box<dyn Fn(OrderedArguments) -> Result<Instance, ConstructionError> + Send + Sync>;

/// Descriptor plus the constructor that goes with it.
pub struct TypeEntry {
    descriptor: TypeDescriptor,
    factory: Factory,
}

impl TypeEntry {
    #[must_use]
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub(crate) fn construct(&self, args: OrderedArguments) -> Result<Instance, ConstructionError> {
        (self.factory)(args)
    }
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("type {0} is already registered")]
pub struct DuplicateTypeError(pub String);

#[derive(Debug, Default)]
pub struct TypeRegistry {
    entries: HashMap<String, TypeEntry>,
    names: HashMap<TypeId, String>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under `T::descriptor().name()`.
    pub fn register<T: Constructible>(&mut self) -> Result<(), DuplicateTypeError> {
        let descriptor = T::descriptor();
        let name = descriptor.name().to_string();
        let instance_name = name.clone();
        let factory: Factory = Box::new(move |args: OrderedArguments| {
            T::construct(args).map(|value| Instance::new(instance_name.clone(), value))
        });
        self.insert(descriptor, factory)?;
        self.names.insert(TypeId::of::<T>(), name);
        Ok(())
    }

    /// Register an arbitrary constructor for `descriptor`.
    ///
    /// Used for descriptors that come from configuration, where the built
    /// value is not a dedicated Rust type.
    pub fn register_factory<F>(
        &mut self,
        descriptor: TypeDescriptor,
        factory: F,
    ) -> Result<(), DuplicateTypeError>
    where
        F: Fn(OrderedArguments) -> Result<Instance, ConstructionError> + Send + Sync + 'static,
    {
        self.insert(descriptor, Box::new(factory))
    }

    fn insert(
        &mut self,
        descriptor: TypeDescriptor,
        factory: Factory,
    ) -> Result<(), DuplicateTypeError> {
        let name = descriptor.name().to_string();
        if self.entries.contains_key(&name) {
            return Err(DuplicateTypeError(name));
        }
        tracing::debug!(type_name = %name, signature = %descriptor, "Registered type");
        let entry = TypeEntry {
            descriptor,
            factory,
        };
        self.entries.insert(name, entry);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&TypeEntry> {
        self.entries.get(type_name)
    }

    #[must_use]
    pub fn descriptor(&self, type_name: &str) -> Option<&TypeDescriptor> {
        self.get(type_name).map(TypeEntry::descriptor)
    }

    /// Name `T` was registered under, if it went through [`register`](Self::register).
    #[must_use]
    pub fn name_of<T: Any>(&self) -> Option<&str> {
        self.names.get(&TypeId::of::<T>()).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
