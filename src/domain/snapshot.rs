//! Serialized form of a whole map: a JSON object keyed by `"x,y"` whose
//! values are cell records. This is the only persisted artifact.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

use super::{CellRecord, Coord, HexError};

/// Immutable record of one generation, keyed by coordinate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    records: BTreeMap<Coord, CellRecord>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, coord: Coord, record: CellRecord) -> Option<CellRecord> {
        self.records.insert(coord, record)
    }

    pub fn get(&self, coord: Coord) -> Option<&CellRecord> {
        self.records.get(&coord)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.records.keys().copied()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Coord, CellRecord> {
        self.records.iter()
    }

    /// Tab-indented JSON, for display and hand editing
    pub fn to_json_pretty(&self) -> Result<String, HexError> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(out)
            .map_err(|e| HexError::Json(<serde_json::Error as serde::ser::Error>::custom(e)))
    }

    pub fn to_json(&self) -> Result<String, HexError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a snapshot. Whitespace between tokens is insignificant.
    pub fn from_json(text: &str) -> Result<Self, HexError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl FromIterator<(Coord, CellRecord)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (Coord, CellRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = (&'a Coord, &'a CellRecord);
    type IntoIter = btree_map::Iter<'a, Coord, CellRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Snapshot {
        [
            (Coord::new(0, 0), CellRecord::new("Hex").at(Coord::new(0, 0))),
            (
                Coord::new(-1, 2),
                CellRecord::new("ConwayHex")
                    .at(Coord::new(-1, 2))
                    .with("alive", true),
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_keyed_by_coordinate_text() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({
                "0,0": { "x": 0, "y": 0, "type": "Hex" },
                "-1,2": { "x": -1, "y": 2, "type": "ConwayHex", "alive": true },
            })
        );
    }

    #[test]
    fn test_whitespace_insensitive_reparse() {
        let snapshot = sample();
        let pretty = snapshot.to_json_pretty().unwrap();
        assert!(pretty.contains('\t'));

        let squashed: String = pretty.chars().filter(|c| !c.is_whitespace()).collect();
        assert_eq!(Snapshot::from_json(&pretty).unwrap(), snapshot);
        assert_eq!(Snapshot::from_json(&squashed).unwrap(), snapshot);
        assert_eq!(Snapshot::from_json(&snapshot.to_json().unwrap()).unwrap(), snapshot);
    }

    #[test]
    fn test_bad_key_rejected() {
        let err = Snapshot::from_json(r#"{"zero": {"x": 0, "y": 0, "type": "Hex"}}"#).unwrap_err();
        assert!(matches!(err, HexError::Json(_)));
    }

    #[test]
    fn test_missing_type_rejected() {
        assert!(Snapshot::from_json(r#"{"0,0": {"x": 0, "y": 0}}"#).is_err());
    }
}
