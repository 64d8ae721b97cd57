#![allow(dead_code)]

use std::path::PathBuf;

use quarry::{Config, Dashboard};
use rusqlite::Connection;
use tempfile::TempDir;

/// A throwaway `cookies` database plus a dashboard configured to query it.
pub struct Fixture {
    _tmp: TempDir,
    pub database: PathBuf,
    pub dashboard: Dashboard,
}

impl Fixture {
    /// Creates a `cookies` table holding one row per (classification, vendor)
    /// pair, repeated `n` times.
    pub fn with_cookies(cookies: &[(&str, &str, usize)]) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let database = tmp.path().join("cookies.db");
        let conn = Connection::open(&database).expect("open sqlite");
        conn.execute_batch(
            "CREATE TABLE cookies(id INTEGER PRIMARY KEY, name TEXT, classification TEXT, vendor TEXT);",
        )
        .expect("create table");
        for (classification, vendor, n) in cookies {
            for i in 0..*n {
                conn.execute(
                    "INSERT INTO cookies(name, classification, vendor) VALUES (?1, ?2, ?3)",
                    [format!("cookie-{}", i), classification.to_string(), vendor.to_string()],
                )
                .expect("insert cookie");
            }
        }
        drop(conn);
        Self::open(tmp, database)
    }

    /// Runs arbitrary setup SQL against a fresh database.
    pub fn with_sql(sql: &str) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let database = tmp.path().join("cookies.db");
        let conn = Connection::open(&database).expect("open sqlite");
        conn.execute_batch(sql).expect("seed sqlite");
        drop(conn);
        Self::open(tmp, database)
    }

    pub fn into_parts(self) -> (TempDir, Dashboard) {
        (self._tmp, self.dashboard)
    }

    fn open(tmp: TempDir, database: PathBuf) -> Self {
        let config = Config {
            database: database.clone(),
            ..Config::default()
        };
        let dashboard = Dashboard::new(&config).expect("build dashboard");
        Self {
            _tmp: tmp,
            database,
            dashboard,
        }
    }
}
