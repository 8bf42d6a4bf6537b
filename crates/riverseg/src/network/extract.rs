//! Network construction from a route-link table.
//!
//! A route-link table has one row per reach, keyed by the reach id, with
//! named columns holding related reach ids (typically a `to` column naming
//! the downstream reach). Targets at or below `K::default()` (zero for
//! integer ids) or equal to the configured terminal code mean "drains out of
//! the modeled domain" and are dropped; the source still becomes a key with
//! an empty target list, i.e. a tailwater.

use tracing::{debug, instrument};

use super::{Network, NodeId};
use crate::error::NetworkError;

/// A minimal column-oriented route-link table indexed by reach id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteLinks<K> {
    columns: Vec<String>,
    rows: Vec<(K, Vec<K>)>,
}

impl<K: NodeId> RouteLinks<K> {
    /// Create an empty table with the given column names.
    #[must_use]
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a single-column table from `(key, value)` rows.
    #[must_use]
    pub fn from_pairs(column: &str, rows: impl IntoIterator<Item = (K, K)>) -> Self {
        let mut table = Self::new([column]);
        for (key, value) in rows {
            table.push_row(key, vec![value]);
        }
        table
    }

    /// Append a row. `values` align with the column list; a short row has
    /// no value for the trailing columns.
    pub fn push_row(&mut self, key: K, values: Vec<K>) {
        self.rows.push((key, values));
    }

    /// Position of the named column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(key, value)` pairs of one column, in row order.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::MissingColumn`] if the column does not exist.
    pub fn column_values<'a>(
        &'a self,
        name: &str,
    ) -> Result<impl Iterator<Item = (&'a K, Option<&'a K>)> + 'a, NetworkError> {
        let idx = self
            .column(name)
            .ok_or_else(|| NetworkError::MissingColumn(name.to_string()))?;
        Ok(self.rows.iter().map(move |(key, values)| (key, values.get(idx))))
    }
}

/// Whether `target` marks an outlet rather than a modeled reach.
fn is_terminal<K: NodeId + Default>(target: &K, terminal_code: &K) -> bool {
    *target <= K::default() || target == terminal_code
}

/// Build a [`Network`] from the `target_column` of `rows`.
///
/// Every row's key gets an adjacency entry; non-terminal targets are
/// appended in row order. Missing values in short rows count as terminal.
///
/// # Errors
///
/// Returns [`NetworkError::MissingColumn`] if `target_column` is unknown.
#[instrument(skip(rows, terminal_code), fields(row_count = rows.len()))]
pub fn extract_connections<K: NodeId + Default>(
    rows: &RouteLinks<K>,
    target_column: &str,
    terminal_code: K,
) -> Result<Network<K>, NetworkError> {
    let mut network = Network::new();
    let mut outlets = 0usize;

    for (src, dst) in rows.column_values(target_column)? {
        match dst {
            Some(dst) if !is_terminal(dst, &terminal_code) => {
                network.add_edge(src.clone(), dst.clone());
            }
            _ => {
                network.insert_node(src.clone());
                outlets += 1;
            }
        }
    }

    debug!(
        nodes = network.len(),
        edges = network.edge_count(),
        outlets,
        "extracted connections"
    );
    Ok(network)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
