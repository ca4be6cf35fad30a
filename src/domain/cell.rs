use std::any::Any;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Coord, HexError, Offset};

/// Subtype-defined fields of a record, everything besides `x`, `y` and `type`
pub type Fields = serde_json::Map<String, Value>;

/// Plain-data form of a single cell: `{x, y, type, ...fields}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl CellRecord {
    /// Record of the given type with no coordinate and no fields
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            x: None,
            y: None,
            kind: kind.into(),
            fields: Fields::new(),
        }
    }

    /// Builder-style placement
    pub fn at(mut self, coord: Coord) -> Self {
        self.x = Some(coord.x);
        self.y = Some(coord.y);
        self
    }

    /// Builder-style field insertion
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_owned(), value.into());
        self
    }

    /// Coordinate, when both `x` and `y` are present
    pub fn coord(&self) -> Option<Coord> {
        Some(Coord::new(self.x?, self.y?))
    }

    /// Typed read of a subtype field. Missing and `null` both read as `None`.
    pub fn field<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, HexError> {
        match self.fields.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| HexError::MalformedRecord {
                    kind: self.kind.clone(),
                    field: name.to_owned(),
                    reason: e.to_string(),
                }),
        }
    }
}

/// Input events an embedding UI may forward to a cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Interaction {
    /// The interior of the hex was clicked
    Click,
    /// The edge shared with the neighbor at this offset was clicked
    EdgeClick(Offset),
}

/// A neighboring cell as seen by a transition rule. Read-only for the duration of one call.
#[derive(Clone, Copy, Debug)]
pub struct Neighbor<'a> {
    pub offset: Offset,
    pub cell: &'a dyn Cell,
}

/// The contract every grid entity implements.
///
/// Concrete variants are independent types; the map stores them as `Box<dyn Cell>`
/// and reconstructs them through a [`Registry`](super::Registry) keyed by [`Cell::kind`].
pub trait Cell: CloneCell + fmt::Debug + Send + Sync {
    /// Discriminant written to the `type` field of the record
    fn kind(&self) -> &'static str;

    fn coord(&self) -> Option<Coord>;

    /// Overwrite this cell's own coordinate
    fn place(&mut self, coord: Coord);

    /// Add subtype fields to a record. `x`, `y` and `type` are owned by the base
    /// record and are not overwritten by anything inserted here.
    fn dump_fields(&self, _fields: &mut Fields) {}

    /// Produce the cell occupying this coordinate in the next generation.
    ///
    /// Must not fail for any list of zero to six neighbors. The default rule is
    /// "no change": a copy of this cell.
    fn next(&self, _neighbors: &[Neighbor<'_>]) -> Result<Box<dyn Cell>, HexError> {
        Ok(self.clone_cell())
    }

    /// UI hook. Never called by the engine itself.
    fn interact(&mut self, _interaction: Interaction) {}

    /// Direct update pushed by the embedding application for this coordinate
    fn update(&mut self, _data: &Fields) {}
}

/// Object-safe cloning and downcasting, implemented for every `Cell + Clone`.
pub trait CloneCell {
    fn clone_cell(&self) -> Box<dyn Cell>;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Cell + Clone + 'static> CloneCell for T {
    fn clone_cell(&self) -> Box<dyn Cell> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Clone for Box<dyn Cell> {
    fn clone(&self) -> Self {
        (**self).clone_cell()
    }
}

impl<'a> dyn Cell + 'a {
    /// Serialize to `{x, y, type, ...fields}`
    pub fn dump(&self) -> CellRecord {
        let mut fields = Fields::new();
        self.dump_fields(&mut fields);
        for reserved in ["x", "y", "type"] {
            fields.remove(reserved);
        }
        CellRecord {
            x: self.coord().map(|c| c.x),
            y: self.coord().map(|c| c.y),
            kind: self.kind().to_owned(),
            fields,
        }
    }

    pub fn downcast_ref<T: Cell + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Cell + 'static>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Construction of a concrete variant from its record.
pub trait FromRecord: Cell + Sized {
    /// Discriminant this variant registers under
    const TYPE_NAME: &'static str;

    /// Populate from a record. Fields missing from the record take
    /// variant-defined defaults; the coordinate is set when present.
    fn from_record(record: &CellRecord) -> Result<Self, HexError>;
}

/// Base variant with no state beyond its position. Never changes between generations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hex {
    coord: Option<Coord>,
}

impl Hex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cell for Hex {
    fn kind(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn coord(&self) -> Option<Coord> {
        self.coord
    }

    fn place(&mut self, coord: Coord) {
        self.coord = Some(coord);
    }
}

impl FromRecord for Hex {
    const TYPE_NAME: &'static str = "Hex";

    fn from_record(record: &CellRecord) -> Result<Self, HexError> {
        Ok(Self {
            coord: record.coord(),
        })
    }
}
