use super::{Cell, CellRecord, Coord, Fields, FromRecord, HexError, Interaction, Neighbor, Registry};

/// Survival thresholds for [`ConwayHex`].
/// A cell is alive in the next generation when its live-neighbor count is
/// strictly between `lonely` and `crowded`, whatever its current state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LifeRule {
    pub lonely: u8,
    pub crowded: u8,
}

impl LifeRule {
    pub const fn new(lonely: u8, crowded: u8) -> Self {
        Self { lonely, crowded }
    }

    /// Short description, e.g. `"alive with 2-3 neighbors"`
    pub fn description(&self) -> String {
        format!(
            "alive with {}-{} neighbors",
            self.lonely.saturating_add(1),
            self.crowded.saturating_sub(1)
        )
    }

    /// Pure function of the live-neighbor count
    pub const fn evolve(&self, live_neighbors: u8) -> bool {
        live_neighbors > self.lonely && live_neighbors < self.crowded
    }
}

/// Alive with two or three neighbors
impl Default for LifeRule {
    fn default() -> Self {
        Self::new(1, 4)
    }
}

/// Alive/dead hex following a [`LifeRule`]. Clicking toggles it.
#[derive(Clone, Debug, PartialEq)]
pub struct ConwayHex {
    coord: Option<Coord>,
    alive: bool,
    rule: LifeRule,
}

impl ConwayHex {
    pub fn new(alive: bool) -> Self {
        Self::with_rule(alive, LifeRule::default())
    }

    pub fn with_rule(alive: bool, rule: LifeRule) -> Self {
        Self {
            coord: None,
            alive,
            rule,
        }
    }

    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    pub const fn rule(&self) -> LifeRule {
        self.rule
    }

    /// Like [`FromRecord::from_record`] but with explicit thresholds
    pub fn from_record_with(record: &CellRecord, rule: LifeRule) -> Result<Self, HexError> {
        Ok(Self {
            coord: record.coord(),
            alive: record.field("alive")?.unwrap_or(false),
            rule,
        })
    }

    /// Register this variant so that reloaded cells use `rule`
    pub fn register(registry: &mut Registry, rule: LifeRule) -> &mut Registry {
        registry.register(Self::TYPE_NAME, move |record| {
            Self::from_record_with(record, rule).map(|cell| Box::new(cell) as Box<dyn Cell>)
        })
    }
}

impl Cell for ConwayHex {
    fn kind(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn coord(&self) -> Option<Coord> {
        self.coord
    }

    fn place(&mut self, coord: Coord) {
        self.coord = Some(coord);
    }

    fn dump_fields(&self, fields: &mut Fields) {
        fields.insert("alive".into(), self.alive.into());
    }

    /// Only live `ConwayHex` neighbors count; other variants are ignored.
    fn next(&self, neighbors: &[Neighbor<'_>]) -> Result<Box<dyn Cell>, HexError> {
        if neighbors.len() > 6 {
            return Err(HexError::RuleViolation {
                kind: Self::TYPE_NAME.into(),
                reason: format!("{} neighbors given, a hex has at most 6", neighbors.len()),
            });
        }
        let live = neighbors
            .iter()
            .filter_map(|n| n.cell.downcast_ref::<ConwayHex>())
            .filter(|hex| hex.alive)
            .count() as u8;
        Ok(Box::new(Self::with_rule(self.rule.evolve(live), self.rule)))
    }

    fn interact(&mut self, interaction: Interaction) {
        if interaction == Interaction::Click {
            self.alive = !self.alive;
        }
    }

    fn update(&mut self, data: &Fields) {
        if let Some(alive) = data.get("alive").and_then(|v| v.as_bool()) {
            self.alive = alive;
        }
    }
}

impl FromRecord for ConwayHex {
    const TYPE_NAME: &'static str = "ConwayHex";

    fn from_record(record: &CellRecord) -> Result<Self, HexError> {
        Self::from_record_with(record, LifeRule::default())
    }
}
