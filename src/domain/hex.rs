//! Skewed hex coordinates and the six-way adjacency rule.
//!
//! Increasing `y` moves visually downward; increasing `x` moves up and to
//! the right. Every hex has the same six neighbor offsets regardless of
//! what the map contains.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::HexError;

/// Integer position of a hex on the map. Used as a map key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate reached by stepping once along `offset`, or `None` past the
    /// edge of the `i32` plane
    pub fn offset(self, offset: Offset) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(offset.dx)?,
            y: self.y.checked_add(offset.dy)?,
        })
    }

    /// Adjacent coordinates in canonical offset order. Hexes on the edge of
    /// the `i32` plane have fewer than six.
    pub fn neighbors(self) -> impl Iterator<Item = Coord> {
        OFFSETS.into_iter().filter_map(move |offset| self.offset(offset))
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Textual key form, `"x,y"`
impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Coord {
    type Err = HexError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let malformed = || HexError::MalformedKey { key: key.to_owned() };
        let (x, y) = key.split_once(',').ok_or_else(malformed)?;
        let x = x.trim().parse().map_err(|_| malformed())?;
        let y = y.trim().parse().map_err(|_| malformed())?;
        Ok(Self { x, y })
    }
}

impl Serialize for Coord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Coord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(serde::de::Error::custom)
    }
}

/// Step from a hex to one of its six neighbors.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Offset {
    pub dx: i32,
    pub dy: i32,
}

impl Offset {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Offset pointing back the way this one came
    pub const fn opposite(self) -> Self {
        Self {
            dx: -self.dx,
            dy: -self.dy,
        }
    }

    /// Facing of this offset in degrees, or `None` if it is not a hex direction
    pub fn degrees(self) -> Option<u16> {
        OFFSETS
            .iter()
            .position(|&o| o == self)
            .map(|idx| DEGREES[idx])
    }
}

/// Canonical neighbor order. Rules see neighbors in this order, never in
/// storage order.
pub const OFFSETS: [Offset; 6] = [
    Offset::new(1, 0),
    Offset::new(0, -1),
    Offset::new(-1, -1),
    Offset::new(-1, 0),
    Offset::new(0, 1),
    Offset::new(1, 1),
];

/// Facing of each entry of [`OFFSETS`], measured counter-clockwise from the +x screen axis
const DEGREES: [u16; 6] = [30, 90, 150, 210, 270, 330];

/// The six neighbor offsets in canonical order
pub const fn neighbor_offsets() -> &'static [Offset; 6] {
    &OFFSETS
}

/// Given an offset, returns its facing in degrees.
/// `(1, 0)` faces 30 degrees, `(0, -1)` faces 90, and so on.
pub fn offset_to_degrees(dx: i32, dy: i32) -> Result<u16, HexError> {
    Offset::new(dx, dy)
        .degrees()
        .ok_or(HexError::UnknownOffset { dx, dy })
}
