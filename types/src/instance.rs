//! Type-erased constructed values.

use std::any::Any;
use std::fmt;

/// A freshly constructed value plus the name of the type it was built as.
///
/// Initializers receive `&mut Instance` and downcast to the concrete type
/// they know how to wire. Once handed back to the caller the pipeline keeps
/// no reference to it.
pub struct Instance {
    type_name: String,
    value: Box<dyn Any + Send>,
}

impl Instance {
    #[must_use]
    pub fn new<T: Any + Send>(type_name: impl Into<String>, value: T) -> Self {
        Self {
            type_name: type_name.into(),
            value: Box::new(value),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut::<T>()
    }

    /// Take the concrete value out. Gives the instance back on a type mismatch.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let Self { type_name, value } = self;
        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self { type_name, value }),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
