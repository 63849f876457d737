//! Resolution of platform identifiers to integration instances.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::platform::Platform;
use crate::PlatformRegistration;

/// Raised when a platform id cannot be resolved. Fatal at worker startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown platform \"{id}\"")]
pub struct UnknownPlatform {
    /// The identifier that failed to resolve.
    pub id: String,
}

type Factory = Box<dyn Fn() -> Box<dyn Platform> + Send + Sync>;

/// Maps platform identifiers to integration factories.
///
/// Usually populated from link-time [`register_platform!`](crate::register_platform)
/// submissions via [`discover`](Self::discover); embedders and tests can also
/// [`register`](Self::register) factories by hand. Identifiers are kept sorted
/// so listings are deterministic.
#[derive(Default)]
pub struct PlatformRegistry {
    factories: BTreeMap<String, Factory>,
}

impl PlatformRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with every link-time registration.
    pub fn discover() -> Self {
        let mut registry = Self::new();
        for registration in inventory::iter::<PlatformRegistration> {
            registry
                .factories
                .insert(registration.id.to_string(), Box::new(registration.construct));
        }
        registry
    }

    /// Adds a factory under the given identifier, replacing any previous one.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        construct: impl Fn() -> Box<dyn Platform> + Send + Sync + 'static,
    ) {
        self.factories.insert(id.into(), Box::new(construct));
    }

    /// Constructs a fresh integration instance for the given identifier.
    pub fn create(&self, id: &str) -> Result<Box<dyn Platform>, UnknownPlatform> {
        match self.factories.get(id) {
            Some(construct) => Ok(construct()),
            None => Err(UnknownPlatform { id: id.to_string() }),
        }
    }

    /// Whether the identifier resolves.
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Number of registered platforms.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether no platform is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for PlatformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformRegistry")
            .field("ids", &self.ids().collect::<Vec<_>>())
            .finish()
    }
}
