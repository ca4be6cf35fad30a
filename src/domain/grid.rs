use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use super::{
    Cell, CellRecord, Coord, Fields, HexError, Interaction, Neighbor, OFFSETS, Registry, Snapshot,
};

/// Map construction settings. Passed in explicitly instead of living in
/// process-wide state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapConfig {
    /// Edge length of a hexagon in pixels
    pub radius: f32,
    /// Interior band width used for edge rendering and edge click zones
    pub edge: f32,
    /// Request a redraw after every individual change outside a batch
    pub autodraw: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            radius: 60.0,
            edge: 10.0,
            autodraw: true,
        }
    }
}

impl MapConfig {
    /// Vertical distance between a hex and the one below it
    pub fn row_spacing(&self) -> f32 {
        self.radius * 3f32.sqrt()
    }

    /// Screen displacement for one step in +x: right and up
    pub fn column_step(&self) -> (f32, f32) {
        (self.radius * 1.5, -self.radius / 2.0 * 3f32.sqrt())
    }

    /// Pixel position of a hex's center, with (0, 0) touching the top-left corner
    pub fn hex_center(&self, coord: Coord) -> (f32, f32) {
        let (col_x, col_y) = self.column_step();
        let x = coord.x as f32 * col_x + self.radius;
        let y = coord.y as f32 * self.row_spacing() + coord.x as f32 * col_y + self.row_spacing() / 2.0;
        (x, y)
    }
}

/// Coordinates filled by [`HexMap::build_rect`], in fill order.
///
/// Rows `0..height` are filled out to `min(width, 2i + 1)` columns, then every
/// odd column `i` continues a strip from `i` to `width` on the rows below,
/// giving a rectangle-shaped field on the skewed axes.
pub fn rect_coords(width: i32, height: i32) -> Vec<Coord> {
    let mut coords = Vec::new();
    for i in 0..height {
        for j in 0..width.min(2 * (i + 1) - 1) {
            coords.push(Coord::new(j, i));
        }
    }
    let mut y = height;
    for i in (1..width).step_by(2) {
        for j in i..width {
            coords.push(Coord::new(j, y));
        }
        y += 1;
    }
    coords
}

/// Sparse hex grid holding polymorphic cells.
///
/// Generations are computed against an untouched copy of the current state and
/// committed all at once, so no cell ever observes another cell's successor.
pub struct HexMap {
    cells: HashMap<Coord, Box<dyn Cell>>,
    config: MapConfig,
    revision: u64,
    batch_depth: u32,
    pending_redraw: bool,
}

impl HexMap {
    pub fn new(config: MapConfig) -> Self {
        Self {
            cells: HashMap::new(),
            config,
            revision: 0,
            batch_depth: 0,
            pending_redraw: false,
        }
    }

    pub const fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Incremented every time the map asks to be redrawn
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Get the cell at a position, if any
    pub fn get(&self, x: i32, y: i32) -> Option<&dyn Cell> {
        self.cells.get(&Coord::new(x, y)).map(|cell| cell.as_ref())
    }

    /// Place `cell` at (x, y), or remove the slot when `cell` is `None`.
    /// The cell's own coordinate is overwritten to match its slot.
    pub fn set(&mut self, x: i32, y: i32, cell: Option<Box<dyn Cell>>) {
        let coord = Coord::new(x, y);
        match cell {
            Some(mut cell) => {
                cell.place(coord);
                self.cells.insert(coord, cell);
            }
            None => {
                if self.cells.remove(&coord).is_some() {
                    trace!(%coord, "removed cell");
                }
            }
        }
        self.mark_changed();
    }

    pub fn insert<C: Cell + 'static>(&mut self, x: i32, y: i32, cell: C) {
        self.set(x, y, Some(Box::new(cell)));
    }

    pub fn remove(&mut self, x: i32, y: i32) -> Option<Box<dyn Cell>> {
        let removed = self.cells.remove(&Coord::new(x, y));
        if removed.is_some() {
            self.mark_changed();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.mark_changed();
    }

    /// All occupied slots, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &dyn Cell)> + '_ {
        self.cells.iter().map(|(&coord, cell)| (coord, cell.as_ref()))
    }

    /// Occupied coordinates, sorted
    pub fn coords(&self) -> Vec<Coord> {
        let mut coords: Vec<_> = self.cells.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Occupied neighbors of (x, y), in canonical offset order
    pub fn neighbors(&self, x: i32, y: i32) -> Vec<Neighbor<'_>> {
        let here = Coord::new(x, y);
        OFFSETS
            .iter()
            .filter_map(|&offset| {
                self.cells.get(&here.offset(offset)?).map(|cell| Neighbor {
                    offset,
                    cell: cell.as_ref(),
                })
            })
            .collect()
    }

    /// Fill the rectangular field described by [`rect_coords`] with cells from `factory`
    pub fn build_rect<F>(&mut self, width: i32, height: i32, mut factory: F)
    where
        F: FnMut() -> Box<dyn Cell>,
    {
        self.batch(|map| {
            for coord in rect_coords(width, height) {
                map.set(coord.x, coord.y, Some(factory()));
            }
        });
        debug!(width, height, cells = self.len(), "built rectangular map");
    }

    /// Compute the next generation without touching the current one.
    ///
    /// Every cell sees its neighbors as they are now. A successor that has no
    /// coordinate of its own is placed at the coordinate of the cell it replaces.
    pub fn next_generation(&self) -> Result<Snapshot, HexError> {
        let snapshot = self
            .cells
            .iter()
            .map(|(&coord, cell)| self.successor(coord, cell.as_ref()))
            .collect::<Result<Snapshot, _>>()?;
        debug!(cells = snapshot.len(), "computed next generation");
        Ok(snapshot)
    }

    /// Same result as [`next_generation`](Self::next_generation), with cells
    /// evaluated across the rayon pool
    pub fn next_generation_parallel(&self) -> Result<Snapshot, HexError> {
        let records: Vec<(Coord, CellRecord)> = self
            .cells
            .par_iter()
            .map(|(&coord, cell)| self.successor(coord, cell.as_ref()))
            .collect::<Result<_, _>>()?;
        debug!(cells = records.len(), "computed next generation in parallel");
        Ok(records.into_iter().collect())
    }

    fn successor(&self, coord: Coord, cell: &dyn Cell) -> Result<(Coord, CellRecord), HexError> {
        let neighbors = self.neighbors(coord.x, coord.y);
        let mut next = cell
            .next(&neighbors)
            .inspect_err(|err| warn!(%coord, %err, "transition rule failed"))?;
        if next.coord().is_none() {
            next.place(coord);
        }
        Ok((coord, next.dump()))
    }

    /// Replace the whole map with the contents of `snapshot`.
    ///
    /// The new generation is built aside and swapped in, so on error the map
    /// is left exactly as it was.
    pub fn load(&mut self, snapshot: &Snapshot, registry: &Registry) -> Result<(), HexError> {
        let mut cells = HashMap::with_capacity(snapshot.len());
        for (&key, record) in snapshot {
            let mut cell = registry
                .build(record)
                .inspect_err(|err| warn!(%key, %err, "snapshot load aborted"))?;
            let coord = record.coord().unwrap_or(key);
            cell.place(coord);
            cells.insert(coord, cell);
        }

        self.batch(|map| {
            map.cells = cells;
            map.mark_changed();
        });
        debug!(cells = self.len(), "loaded snapshot");
        Ok(())
    }

    /// Serialize every occupied slot
    pub fn to_snapshot(&self) -> Snapshot {
        self.cells
            .iter()
            .map(|(&coord, cell)| (coord, cell.dump()))
            .collect()
    }

    /// Forward a UI interaction to the cell at (x, y). Returns whether a cell was there.
    pub fn interact(&mut self, x: i32, y: i32, interaction: Interaction) -> bool {
        match self.cells.get_mut(&Coord::new(x, y)) {
            Some(cell) => {
                cell.interact(interaction);
                self.mark_changed();
                true
            }
            None => false,
        }
    }

    /// Push application data directly to the cell at (x, y). Returns whether a cell was there.
    pub fn update(&mut self, x: i32, y: i32, data: &Fields) -> bool {
        match self.cells.get_mut(&Coord::new(x, y)) {
            Some(cell) => {
                cell.update(data);
                self.mark_changed();
                true
            }
            None => false,
        }
    }

    /// Defer redraws until the matching [`end_batch`](Self::end_batch). Batches nest.
    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Close a batch; the outermost close issues one redraw if anything changed
    pub fn end_batch(&mut self) {
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth == 0 && self.pending_redraw {
            self.pending_redraw = false;
            self.redraw();
        }
    }

    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_batch();
        let result = f(self);
        self.end_batch();
        result
    }

    /// Request a redraw unconditionally
    pub fn redraw(&mut self) {
        self.revision += 1;
        trace!(revision = self.revision, "redraw requested");
    }

    fn mark_changed(&mut self) {
        if self.batch_depth > 0 {
            self.pending_redraw = true;
        } else if self.config.autodraw {
            self.redraw();
        }
    }
}

impl Default for HexMap {
    fn default() -> Self {
        Self::new(MapConfig::default())
    }
}

impl std::fmt::Debug for HexMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HexMap")
            .field("cells", &self.cells.len())
            .field("config", &self.config)
            .field("revision", &self.revision)
            .finish()
    }
}
