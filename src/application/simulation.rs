use std::time::Instant;

use rand::Rng;
use tracing::{debug, info};

use crate::domain::{
    ConwayHex, Fields, HexError, HexMap, LifeRule, MapConfig, Registry, Snapshot,
};

/// Simulation orchestrates a hex map, the registry used to reload it and the
/// stepping schedule. This is the application layer over the domain engine.
pub struct Simulation {
    pub map: HexMap,
    pub registry: Registry,
    pub rule: LifeRule,
    pub is_running: bool,
    pub generation: u64,
    pub update_timer: f32,
    pub updates_per_second: f32,
    pub last_step_time_ms: f32, // Stepping performance metric
}

impl Simulation {
    /// Create an empty simulation that knows the base hex and [`ConwayHex`] under `rule`
    pub fn new(config: MapConfig, rule: LifeRule) -> Self {
        let mut registry = Registry::new();
        ConwayHex::register(&mut registry, rule);

        Self {
            map: HexMap::new(config),
            registry,
            rule,
            is_running: false,
            generation: 0,
            update_timer: 0.0,
            updates_per_second: 4.0,
            last_step_time_ms: 0.0,
        }
    }

    /// Replace the map with a `columns` x `rows` field of dead cells
    pub fn build_rect(&mut self, columns: i32, rows: i32) {
        let rule = self.rule;
        self.map.batch(|map| {
            map.clear();
            map.build_rect(columns, rows, || Box::new(ConwayHex::with_rule(false, rule)));
        });
        self.generation = 0;
        self.is_running = false;
    }

    /// Bring each cell to life with the given probability.
    /// Out-of-range values are clamped and NaN counts as zero.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R, probability: f64) {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        let coords = self.map.coords();
        self.map.batch(|map| {
            for coord in coords {
                let mut data = Fields::new();
                data.insert("alive".into(), rng.random_bool(probability).into());
                map.update(coord.x, coord.y, &data);
            }
        });
        self.generation = 0;
    }

    /// Number of live [`ConwayHex`] cells
    pub fn population(&self) -> usize {
        self.map
            .iter()
            .filter_map(|(_, cell)| cell.downcast_ref::<ConwayHex>())
            .filter(|hex| hex.is_alive())
            .count()
    }

    /// Advance one generation and return the snapshot that was committed.
    /// On error the map and generation counter are unchanged.
    pub fn step(&mut self) -> Result<Snapshot, HexError> {
        let start = Instant::now();

        let next = self.map.next_generation()?;
        self.map.load(&next, &self.registry)?;

        self.last_step_time_ms = start.elapsed().as_secs_f32() * 1000.0;
        self.generation += 1;
        debug!(
            generation = self.generation,
            population = self.population(),
            ms = self.last_step_time_ms,
            "stepped"
        );
        Ok(next)
    }

    /// Load a textual snapshot and reset the generation counter
    pub fn load_json(&mut self, text: &str) -> Result<(), HexError> {
        let snapshot = Snapshot::from_json(text)?;
        self.map.load(&snapshot, &self.registry)?;
        self.generation = 0;
        info!(cells = snapshot.len(), "loaded snapshot");
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, HexError> {
        self.map.to_snapshot().to_json_pretty()
    }

    /// Set running state (builder pattern)
    pub fn with_running(mut self, running: bool) -> Self {
        self.is_running = running;
        self
    }

    /// Toggle play/pause state
    pub fn toggle_running(mut self) -> Self {
        self.is_running = !self.is_running;
        self
    }

    /// Adjust simulation speed
    pub fn adjust_speed(mut self, delta: f32) -> Self {
        self.updates_per_second = (self.updates_per_second + delta).clamp(1.0, 60.0);
        self
    }

    /// Remove every cell and reset generation counter
    pub fn clear(mut self) -> Self {
        self.map.clear();
        self.generation = 0;
        self.is_running = false;
        self
    }

    /// Advance the schedule by `delta_time` seconds, stepping when an update is due.
    /// Returns whether a generation was committed.
    pub fn tick(&mut self, delta_time: f32) -> Result<bool, HexError> {
        if !self.is_running {
            return Ok(false);
        }

        self.update_timer += delta_time;
        let update_interval = 1.0 / self.updates_per_second;
        if self.update_timer < update_interval {
            return Ok(false);
        }

        self.update_timer = 0.0;
        self.step()?;
        Ok(true)
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(MapConfig::default(), LifeRule::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Cell, Coord, Neighbor};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Variant the simulation's registry does not know about
    #[derive(Clone, Debug, Default)]
    struct Stranger {
        coord: Option<Coord>,
    }

    impl Cell for Stranger {
        fn kind(&self) -> &'static str {
            "Stranger"
        }
        fn coord(&self) -> Option<Coord> {
            self.coord
        }
        fn place(&mut self, coord: Coord) {
            self.coord = Some(coord);
        }
        fn next(&self, _neighbors: &[Neighbor<'_>]) -> Result<Box<dyn Cell>, HexError> {
            Ok(Box::new(Self::default()))
        }
    }

    #[test]
    fn test_build_rect_all_dead() {
        let mut sim = Simulation::default();
        sim.build_rect(6, 4);
        assert_eq!(sim.map.len(), 24);
        assert_eq!(sim.population(), 0);
    }

    #[test]
    fn test_randomize_is_seeded() {
        let mut a = Simulation::default();
        let mut b = Simulation::default();
        a.build_rect(6, 4);
        b.build_rect(6, 4);

        a.randomize(&mut StdRng::seed_from_u64(7), 0.5);
        b.randomize(&mut StdRng::seed_from_u64(7), 0.5);
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());

        a.randomize(&mut StdRng::seed_from_u64(7), 1.0);
        assert_eq!(a.population(), 24);
        a.randomize(&mut StdRng::seed_from_u64(7), 0.0);
        assert_eq!(a.population(), 0);
    }

    #[test]
    fn test_randomize_out_of_range_probability() {
        let mut sim = Simulation::default();
        sim.build_rect(6, 4);

        sim.randomize(&mut StdRng::seed_from_u64(1), 2.5);
        assert_eq!(sim.population(), 24);
        sim.randomize(&mut StdRng::seed_from_u64(1), f64::NAN);
        assert_eq!(sim.population(), 0);
        sim.randomize(&mut StdRng::seed_from_u64(1), -1.0);
        assert_eq!(sim.population(), 0);
    }

    #[test]
    fn test_step_commits_generation() {
        let mut sim = Simulation::default();
        sim.build_rect(6, 4);
        sim.randomize(&mut StdRng::seed_from_u64(1), 1.0);

        let committed = sim.step().unwrap();
        assert_eq!(sim.generation, 1);
        assert_eq!(sim.map.to_snapshot(), committed);
    }

    #[test]
    fn test_failed_step_keeps_state() {
        let mut sim = Simulation::default();
        sim.build_rect(3, 2);
        sim.map.insert(10, 10, Stranger::default());
        let before = sim.map.to_snapshot();

        assert!(matches!(sim.step(), Err(HexError::UnknownType { .. })));
        assert_eq!(sim.generation, 0);
        assert_eq!(sim.map.to_snapshot(), before);
    }

    #[test]
    fn test_load_json() {
        let mut sim = Simulation::default();
        sim.load_json(
            r#"{
                "0,0": { "x": 0, "y": 0, "type": "ConwayHex", "alive": true },
                "1,0": { "x": 1, "y": 0, "type": "Hex" }
            }"#,
        )
        .unwrap();

        assert_eq!(sim.map.len(), 2);
        assert_eq!(sim.population(), 1);
        assert!(sim.to_json().unwrap().contains("\"ConwayHex\""));
    }

    #[test]
    fn test_load_json_unknown_type() {
        let mut sim = Simulation::default();
        sim.build_rect(3, 2);
        let before = sim.to_json().unwrap();

        let err = sim
            .load_json(r#"{ "0,0": { "x": 0, "y": 0, "type": "Bogus" } }"#)
            .unwrap_err();
        assert!(matches!(err, HexError::UnknownType { .. }));
        assert_eq!(sim.to_json().unwrap(), before);
    }

    #[test]
    fn test_tick_waits_for_interval() {
        let mut sim = Simulation::default();
        sim.build_rect(3, 2);
        let mut sim = sim.with_running(true);
        sim.updates_per_second = 4.0;

        assert!(!sim.tick(0.1).unwrap());
        assert!(sim.tick(0.2).unwrap());
        assert_eq!(sim.generation, 1);

        sim = sim.toggle_running();
        assert!(!sim.tick(1.0).unwrap());
        assert_eq!(sim.generation, 1);
    }

    #[test]
    fn test_speed_is_clamped() {
        let sim = Simulation::default().adjust_speed(100.0);
        assert_eq!(sim.updates_per_second, 60.0);
        let sim = sim.adjust_speed(-100.0);
        assert_eq!(sim.updates_per_second, 1.0);
    }

    #[test]
    fn test_clear() {
        let mut sim = Simulation::default();
        sim.build_rect(6, 4);
        sim.step().unwrap();

        let sim = sim.clear();
        assert!(sim.map.is_empty());
        assert_eq!(sim.generation, 0);
    }
}
