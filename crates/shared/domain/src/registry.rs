//! Type-erased registry entries for initialized feature slices.

use std::any::{Any, TypeId};
use std::fmt::Debug;

/// State owned by a feature crate and shared with its request handlers.
pub trait FeatureSlice: Any + Debug + Send + Sync {
    /// Lets the kernel downcast the registered state back to its concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// A slice ready to be registered, keyed by its concrete type.
#[derive(Debug)]
pub struct InitializedSlice {
    pub id: TypeId,
    pub name: &'static str,
    pub state: Box<dyn FeatureSlice>,
}

impl InitializedSlice {
    pub fn new<T: FeatureSlice>(state: T) -> Self {
        let full = std::any::type_name::<T>();
        let name = full.rsplit("::").next().unwrap_or(full);
        Self { id: TypeId::of::<T>(), name, state: Box::new(state) }
    }
}
