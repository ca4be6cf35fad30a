mod cell;
mod error;
mod grid;
mod hex;
mod registry;
mod rules;
mod snapshot;

pub use cell::{Cell, CellRecord, CloneCell, Fields, FromRecord, Hex, Interaction, Neighbor};
pub use error::HexError;
pub use grid::{HexMap, MapConfig, rect_coords};
pub use hex::{Coord, OFFSETS, Offset, neighbor_offsets, offset_to_degrees};
pub use registry::{CellFactory, Registry};
pub use rules::{ConwayHex, LifeRule};
pub use snapshot::Snapshot;
