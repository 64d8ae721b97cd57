use serde::Serialize;

use crate::Cell;

/// The rows and column names produced by executing a query.
///
/// Every row has exactly one cell per column, in column order. Column names
/// are expected to be unique: [`Database`](crate::Database) rejects queries
/// that repeat one, and [`ResultSet::column_index`] resolves a repeated name
/// to its first position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl ResultSet {
    /// Constructor.
    ///
    /// Rows that are shorter than the column list are padded with nulls and
    /// longer ones are truncated, so the arity invariant always holds.
    pub fn new<C, S>(columns: C, rows: Vec<Vec<Cell>>) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect::<Vec<String>>();
        let arity = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(arity, Cell::Null);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// A result set with neither columns nor rows.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// The position of the column with exactly the given name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}
