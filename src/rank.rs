//! Ranking engine for dispatch counters.
//!
//! Two derived rankings over the table: the hottest individual
//! (source, destination) dispatch pairs, and every source ordered by its
//! total outgoing dispatch count.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::table::DispatchTable;

/// One flattened dispatch pair, ranked by raw count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPair<'a> {
    /// Source handler name.
    pub source: &'a str,
    /// Destination handler name.
    pub destination: &'a str,
    /// Invocation count for this pair.
    pub count: u64,
}

/// One source handler with its total outgoing dispatch count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceTotal<'a> {
    /// Source handler name.
    pub source: &'a str,
    /// Sum of every outgoing count (0 for a source with no entries).
    pub total: u64,
}

/// Heap entry for the bounded n-largest selection. Ordered by count with
/// the encounter sequence as tie-break, so ties fall out in whatever order
/// the table iteration produced them. The sequence number is unique per
/// pass, which keeps the ordering total.
#[derive(Debug)]
struct Candidate<'a> {
    count: u64,
    seq: usize,
    source: &'a str,
    destination: &'a str,
}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count.cmp(&other.count).then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate<'_> {}

/// The `n` dispatch pairs with the largest counts, descending.
///
/// Selects with a bounded min-heap over the lazily flattened triples
/// rather than sorting all of them, so a small `n` stays cheap on large
/// tables. Returns `min(n, total pairs)` items; the count sequence is
/// non-increasing and every returned count is >= every count left out.
///
/// Tie order among equal counts is unspecified (it follows the table's
/// arbitrary iteration order) and must not be relied upon.
#[must_use]
pub fn top_pairs(table: &DispatchTable, n: usize) -> Vec<DispatchPair<'_>> {
    if n == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<std::cmp::Reverse<Candidate<'_>>> =
        BinaryHeap::with_capacity(n.min(table.pair_count()));

    for (seq, (source, destination, count)) in table.iter_pairs().enumerate() {
        let candidate = Candidate { count, seq, source, destination };
        if heap.len() < n {
            heap.push(std::cmp::Reverse(candidate));
        } else if heap.peek().is_some_and(|smallest| candidate.count > smallest.0.count) {
            heap.pop();
            heap.push(std::cmp::Reverse(candidate));
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|std::cmp::Reverse(c)| DispatchPair {
            source: c.source,
            destination: c.destination,
            count: c.count,
        })
        .collect()
}

/// Every source handler with its total outgoing count, descending.
///
/// Unlike [`top_pairs`] this returns ALL sources, including those whose
/// inner map is empty (total 0); callers wanting only the top K truncate
/// the result themselves. The sort is a full stable sort on the total.
#[must_use]
pub fn top_bytecodes(table: &DispatchTable) -> Vec<SourceTotal<'_>> {
    let mut totals: Vec<SourceTotal<'_>> = table
        .sources()
        .map(|source| SourceTotal {
            source,
            total: table
                .outgoing(source)
                .map(|counters| counters.values().sum())
                .unwrap_or(0),
        })
        .collect();

    totals.sort_by(|a, b| b.total.cmp(&a.total));
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DispatchTable {
        DispatchTable::from_json_str(
            r#"{
                "Ldar": {"Star": 100, "Add": 40},
                "Star": {"Ldar": 70, "Return": 1},
                "Add": {"Star": 40},
                "Return": {}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_top_pairs_zero_is_empty() {
        assert!(top_pairs(&table(), 0).is_empty());
    }

    #[test]
    fn test_top_pairs_truncates() {
        let t = table();
        let top = top_pairs(&t, 2);
        assert_eq!(top.len(), 2);
        assert_eq!((top[0].source, top[0].destination, top[0].count), ("Ldar", "Star", 100));
        assert_eq!((top[1].source, top[1].destination, top[1].count), ("Star", "Ldar", 70));
    }

    #[test]
    fn test_top_pairs_huge_n_returns_all_sorted() {
        let t = table();
        let top = top_pairs(&t, 1000);
        assert_eq!(top.len(), 5);
        let counts: Vec<u64> = top.iter().map(|p| p.count).collect();
        let mut sorted = counts.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(counts, sorted);
    }

    #[test]
    fn test_top_pairs_counts_non_increasing() {
        let t = table();
        let top = top_pairs(&t, 3);
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn test_top_pairs_dominate_excluded() {
        let t = table();
        let top = top_pairs(&t, 2);
        let smallest_kept = top.iter().map(|p| p.count).min().unwrap();
        let kept: Vec<(&str, &str)> = top.iter().map(|p| (p.source, p.destination)).collect();
        for (source, destination, count) in t.iter_pairs() {
            if !kept.contains(&(source, destination)) {
                assert!(count <= smallest_kept);
            }
        }
    }

    #[test]
    fn test_top_pairs_includes_zero_counts() {
        let t = DispatchTable::from_json_str(r#"{"A": {"B": 0}}"#).unwrap();
        let top = top_pairs(&t, 10);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].count, 0);
    }

    #[test]
    fn test_top_bytecodes_totals() {
        let t = table();
        let ranked = top_bytecodes(&t);
        assert_eq!(ranked.len(), 4);
        assert_eq!((ranked[0].source, ranked[0].total), ("Ldar", 140));
        assert_eq!((ranked[1].source, ranked[1].total), ("Star", 71));
        assert_eq!((ranked[2].source, ranked[2].total), ("Add", 40));
        assert_eq!((ranked[3].source, ranked[3].total), ("Return", 0));
    }

    #[test]
    fn test_top_bytecodes_covers_empty_source() {
        let t = table();
        let ranked = top_bytecodes(&t);
        assert!(ranked.iter().any(|r| r.source == "Return" && r.total == 0));
    }

    #[test]
    fn test_rankings_are_idempotent() {
        let t = table();
        assert_eq!(top_bytecodes(&t), top_bytecodes(&t));

        let mut a = top_pairs(&t, 3);
        let mut b = top_pairs(&t, 3);
        // Tie order is unspecified; compare as multisets of triples
        a.sort_unstable_by(|x, y| (x.source, x.destination).cmp(&(y.source, y.destination)));
        b.sort_unstable_by(|x, y| (x.source, x.destination).cmp(&(y.source, y.destination)));
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_table_rankings() {
        let t = DispatchTable::from_json_str("{}").unwrap();
        assert!(top_pairs(&t, 10).is_empty());
        assert!(top_bytecodes(&t).is_empty());
    }
}
