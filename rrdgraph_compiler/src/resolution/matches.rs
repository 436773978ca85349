//! Per-source file matches and their release

use std::path::PathBuf;

/// One access-checked backing file of a `DEF`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<S> {
    pub path: PathBuf,
    /// Scope returned by the access policy, used to evaluate per-instance
    /// legends and environment mappings
    pub scope: S,
}

impl<S> Match<S> {
    pub fn new(path: PathBuf, scope: S) -> Self {
        Self { path, scope }
    }
}

/// Matches for every command of one compile, indexed by position
///
/// Non-`DEF` positions hold empty lists.
#[derive(Debug)]
pub struct MatchTable<S> {
    entries: Vec<Vec<Match<S>>>,
}

impl<S> MatchTable<S> {
    pub(crate) fn new(entries: Vec<Vec<Match<S>>>) -> Self {
        Self { entries }
    }

    pub fn get(&self, position: usize) -> &[Match<S>] {
        self.entries
            .get(position)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(Vec::len).sum()
    }

    /// Drop every match, returning how many were held
    pub fn release(self) -> usize {
        let released = self.total();
        drop(self.entries);
        crate::log_debug!("Released source matches", "count" => released);
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_counts_and_releases() {
        let table = MatchTable::new(vec![
            vec![
                Match::new(PathBuf::from("a.rrd"), 1u8),
                Match::new(PathBuf::from("b.rrd"), 2u8),
            ],
            Vec::new(),
            vec![Match::new(PathBuf::from("c.rrd"), 3u8)],
        ]);

        assert_eq!(table.get(0).len(), 2);
        assert!(table.get(1).is_empty());
        assert!(table.get(9).is_empty());
        assert_eq!(table.total(), 3);
        assert_eq!(table.release(), 3);
    }
}
