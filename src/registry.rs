//! Ordered patch registry.
//!
//! Order is a dependency ordering: each patch sees the output of every patch
//! before it, and a later patch may rely on text inserted or cleaned up by an
//! earlier one. The registry is assembled once at startup and is append-only.

use crate::descriptor::Patch;
use crate::patches;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Duplicate patch id: {0}")]
    DuplicateId(String),
}

#[derive(Default)]
pub struct PatchRegistry {
    patches: Vec<Box<dyn Patch>>,
}

impl PatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in patch set, in application order.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for descriptor in patches::builtin() {
            registry.patches.push(Box::new(descriptor));
        }
        registry
    }

    /// Append a patch after every patch already registered.
    pub fn push(&mut self, patch: impl Patch + 'static) -> Result<(), RegistryError> {
        self.push_boxed(Box::new(patch))
    }

    pub fn push_boxed(&mut self, patch: Box<dyn Patch>) -> Result<(), RegistryError> {
        if self.contains(patch.id()) {
            return Err(RegistryError::DuplicateId(patch.id().to_string()));
        }
        self.patches.push(patch);
        Ok(())
    }

    /// Append patches in iteration order, stopping at the first duplicate.
    pub fn extend<P, I>(&mut self, patches: I) -> Result<(), RegistryError>
    where
        P: Patch + 'static,
        I: IntoIterator<Item = P>,
    {
        for patch in patches {
            self.push(patch)?;
        }
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.patches.iter().any(|p| p.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&dyn Patch> {
        self.patches.iter().find(|p| p.id() == id).map(|p| p.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Patch> {
        self.patches.iter().map(|p| p.as_ref())
    }

    pub fn ids(&self) -> Vec<&str> {
        self.iter().map(|p| p.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }
}

impl std::fmt::Debug for PatchRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchRegistry")
            .field("patches", &self.ids())
            .finish()
    }
}
