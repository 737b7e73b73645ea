//! The dispatch counter table.
//!
//! The sole core entity: a two-level mapping from source handler name to
//! destination handler name to invocation count, parsed once from a
//! counters JSON file and read-only afterwards.
//!
//! Handlers that never dispatch (e.g. a return or throw handler) simply do
//! not appear as sources.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default saturation threshold: the maximum value of a 64-bit counter.
///
/// Recording builds bump a pointer-sized counter per dispatch; a counter
/// stuck at the maximum may have wrapped or saturated and is unreliable.
/// Tables recorded on other counter widths pass their own threshold, see
/// [`counter_max`].
pub const DEFAULT_COUNTER_MAX: u64 = u64::MAX;

/// Maximum representable value of an unsigned counter of `bits` width.
///
/// `bits` is clamped to 1..=64.
#[must_use]
pub const fn counter_max(bits: u8) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else if bits == 0 {
        1
    } else {
        (1u64 << bits) - 1
    }
}

/// A parsed dispatch counter table.
///
/// Deserializes directly from the counters JSON: an object whose keys are
/// source handler names and whose values are objects mapping destination
/// handler names to non-negative integer counts. Inner maps may be sparse
/// or empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct DispatchTable {
    counters: HashMap<String, HashMap<String, u64>>,
}

impl DispatchTable {
    /// Parse a table from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed JSON or a malformed shape
    /// (wrong nesting, non-integer or negative counts), and
    /// [`Error::InvalidTable`] for empty handler names.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Parse a table from a reader.
    ///
    /// The input is read fully before any processing begins.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let table: Self = serde_json::from_reader(reader)?;
        table.validate()?;
        Ok(table)
    }

    /// Load a table from a counters JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    fn validate(&self) -> Result<()> {
        for (source, counters_from_source) in &self.counters {
            if source.is_empty() {
                return Err(Error::InvalidTable("empty source handler name".to_string()));
            }
            for destination in counters_from_source.keys() {
                if destination.is_empty() {
                    return Err(Error::InvalidTable(format!(
                        "empty destination handler name under source {source:?}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Number of source handlers in the table.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.counters.len()
    }

    /// Whether the table has no sources at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Total number of (source, destination) entries.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.counters.values().map(HashMap::len).sum()
    }

    /// Iterate over source handler names. Order is unspecified.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.counters.keys().map(String::as_str)
    }

    /// The outgoing counters of one source, if present.
    #[must_use]
    pub fn outgoing(&self, source: &str) -> Option<&HashMap<String, u64>> {
        self.counters.get(source)
    }

    /// Lazily flatten the table into `(source, destination, count)` triples.
    ///
    /// The iterator is finite and yields each entry exactly once; iteration
    /// order is unspecified. Call again for a fresh pass.
    pub fn iter_pairs(&self) -> impl Iterator<Item = (&str, &str, u64)> {
        self.counters.iter().flat_map(|(source, counters_from_source)| {
            counters_from_source
                .iter()
                .map(move |(destination, &count)| (source.as_str(), destination.as_str(), count))
        })
    }

    /// Every (source, destination) pair whose count sits exactly at
    /// `counter_max` and may therefore have saturated.
    ///
    /// Visits each entry once; purely informational, never an error.
    #[must_use]
    pub fn saturated_pairs(&self, counter_max: u64) -> Vec<(&str, &str)> {
        self.iter_pairs()
            .filter(|&(_, _, count)| count == counter_max)
            .map(|(source, destination, _)| (source, destination))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DispatchTable {
        DispatchTable::from_json_str(
            r#"{"LdaZero": {"Star": 3, "Return": 9}, "Star": {"LdaZero": 5}, "Return": {}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_counts() {
        let table = sample();
        assert_eq!(table.source_count(), 3);
        assert_eq!(table.pair_count(), 3);
        assert_eq!(table.outgoing("LdaZero").and_then(|m| m.get("Star")), Some(&3));
        assert!(table.outgoing("Return").is_some_and(HashMap::is_empty));
    }

    #[test]
    fn test_iter_pairs_visits_every_entry_once() {
        let table = sample();
        let mut triples: Vec<_> = table.iter_pairs().collect();
        triples.sort_unstable();
        assert_eq!(
            triples,
            vec![
                ("LdaZero", "Return", 9),
                ("LdaZero", "Star", 3),
                ("Star", "LdaZero", 5),
            ]
        );
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(matches!(DispatchTable::from_json_str("{"), Err(Error::Json(_))));
        assert!(matches!(DispatchTable::from_json_str("[1, 2]"), Err(Error::Json(_))));
    }

    #[test]
    fn test_malformed_shape_is_rejected() {
        // Counts must be non-negative integers, not strings or floats
        assert!(DispatchTable::from_json_str(r#"{"A": {"B": "many"}}"#).is_err());
        assert!(DispatchTable::from_json_str(r#"{"A": {"B": -1}}"#).is_err());
        assert!(DispatchTable::from_json_str(r#"{"A": {"B": 1.5}}"#).is_err());
        // Wrong nesting
        assert!(DispatchTable::from_json_str(r#"{"A": 7}"#).is_err());
    }

    #[test]
    fn test_empty_handler_names_are_rejected() {
        assert!(matches!(
            DispatchTable::from_json_str(r#"{"": {"B": 1}}"#),
            Err(Error::InvalidTable(_))
        ));
        assert!(matches!(
            DispatchTable::from_json_str(r#"{"A": {"": 1}}"#),
            Err(Error::InvalidTable(_))
        ));
    }

    #[test]
    fn test_counter_fits_u64_max() {
        let json = format!(r#"{{"A": {{"B": {}}}}}"#, u64::MAX);
        let table = DispatchTable::from_json_str(&json).unwrap();
        assert_eq!(table.outgoing("A").and_then(|m| m.get("B")), Some(&u64::MAX));
    }

    #[test]
    fn test_saturated_pairs_at_threshold() {
        let json = format!(r#"{{"A": {{"B": {}, "C": 1}}}}"#, u64::MAX);
        let table = DispatchTable::from_json_str(&json).unwrap();
        assert_eq!(table.saturated_pairs(DEFAULT_COUNTER_MAX), vec![("A", "B")]);
    }

    #[test]
    fn test_saturated_pairs_below_threshold() {
        let table = sample();
        assert!(table.saturated_pairs(DEFAULT_COUNTER_MAX).is_empty());
    }

    #[test]
    fn test_saturated_pairs_configurable_width() {
        let max32 = counter_max(32);
        let json = format!(r#"{{"A": {{"B": {max32}}}}}"#);
        let table = DispatchTable::from_json_str(&json).unwrap();
        assert_eq!(table.saturated_pairs(max32), vec![("A", "B")]);
        assert!(table.saturated_pairs(DEFAULT_COUNTER_MAX).is_empty());
    }

    #[test]
    fn test_counter_max_widths() {
        assert_eq!(counter_max(64), u64::MAX);
        assert_eq!(counter_max(32), u32::MAX as u64);
        assert_eq!(counter_max(8), 255);
    }

    #[test]
    fn test_empty_table() {
        let table = DispatchTable::from_json_str("{}").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.pair_count(), 0);
        assert_eq!(table.iter_pairs().count(), 0);
    }
}
