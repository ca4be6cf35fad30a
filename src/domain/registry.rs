use std::collections::HashMap;
use std::fmt;

use super::{Cell, CellRecord, FromRecord, Hex, HexError};

/// Builds a concrete cell from its record
pub type CellFactory = Box<dyn Fn(&CellRecord) -> Result<Box<dyn Cell>, HexError> + Send + Sync>;

/// Maps a discriminant string to the factory that reconstructs that variant.
///
/// Every `type` found in a snapshot must be registered here for the snapshot
/// to load.
pub struct Registry {
    factories: HashMap<String, CellFactory>,
}

impl Registry {
    /// Registry seeded with the base [`Hex`] variant
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_type::<Hex>();
        registry
    }

    /// Registry with no variants at all
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Add or replace the factory for `name`
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&CellRecord) -> Result<Box<dyn Cell>, HexError> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    /// Register a variant under its own type name using [`FromRecord`]
    pub fn register_type<T: FromRecord + 'static>(&mut self) -> &mut Self {
        self.register(T::TYPE_NAME, |record| {
            T::from_record(record).map(|cell| Box::new(cell) as Box<dyn Cell>)
        })
    }

    pub fn resolve(&self, name: &str) -> Result<&CellFactory, HexError> {
        self.factories.get(name).ok_or_else(|| HexError::UnknownType {
            name: name.to_owned(),
        })
    }

    /// Resolve the record's type and construct the cell
    pub fn build(&self, record: &CellRecord) -> Result<Box<dyn Cell>, HexError> {
        let factory = self.resolve(&record.kind)?;
        factory(record)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered discriminants, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("types", &self.names()).finish()
    }
}
