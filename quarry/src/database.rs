//! Read-only access to the SQLite database backing the reports.

use std::path::{Path, PathBuf};

use log::{debug, error};
use rusqlite::{Connection, OpenFlags};

use crate::{Cell, QueryError, QueryTemplate, ResultSet};

/// Provides an interface for running report queries.
///
/// Holds only the location of the database. A fresh read-only connection is
/// opened for each query and closed again before the call returns.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Constructor.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs the given template's query and collects every row.
    ///
    /// Failures are logged before being returned.
    pub fn execute(&self, template: QueryTemplate) -> Result<ResultSet, QueryError> {
        debug!("Executing {} query: {}", template, template.sql());
        self.execute_sql(template.sql()).map_err(|e| {
            error!("Error executing SQL query: {}", e);
            e
        })
    }

    /// Like [`Database::execute`], but degrades any failure to an empty
    /// result set.
    pub fn execute_or_empty(&self, template: QueryTemplate) -> ResultSet {
        self.execute(template).unwrap_or_else(|_| ResultSet::empty())
    }

    /// Executes an arbitrary read-only statement.
    pub fn execute_sql(&self, sql: &str) -> Result<ResultSet, QueryError> {
        let conn = self.connect()?;
        let exec_err = |e| QueryError::Execute(sql.to_string(), e);
        let mut stmt = conn.prepare(sql).map_err(exec_err)?;
        let columns = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect::<Vec<String>>();
        if let Some(name) = first_duplicate(&columns) {
            return Err(QueryError::DuplicateColumn(name.to_string()));
        }
        let arity = columns.len();
        let mut rows = Vec::new();
        let mut cursor = stmt.query([]).map_err(exec_err)?;
        while let Some(row) = cursor.next().map_err(exec_err)? {
            let cells = (0..arity)
                .map(|i| row.get_ref(i).map(Cell::from))
                .collect::<Result<Vec<Cell>, rusqlite::Error>>()
                .map_err(exec_err)?;
            rows.push(cells);
        }
        debug!("Query returned {} row(s) across {} column(s)", rows.len(), arity);
        Ok(ResultSet::new(columns, rows))
    }

    fn connect(&self) -> Result<Connection, QueryError> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| QueryError::Open(self.path.clone(), e))
    }
}

fn first_duplicate(columns: &[String]) -> Option<&str> {
    columns
        .iter()
        .enumerate()
        .find(|(i, c)| columns[..*i].contains(*c))
        .map(|(_, c)| c.as_str())
}
