// Domain layer - Coordinates, cells, grid and snapshot format
pub mod domain;

// Application layer - Stepping schedule and snapshot I/O
pub mod application;

// Re-exports for convenience
pub use domain::{
    Cell, CellRecord, ConwayHex, Coord, FromRecord, Hex, HexError, HexMap, Interaction, LifeRule,
    MapConfig, Offset, Registry, Snapshot,
};
pub use application::Simulation;
