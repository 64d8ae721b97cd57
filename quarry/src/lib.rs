//! Quarry answers business questions about a SQLite database with a chart, a
//! handful of insights and the raw data behind them.
//!
//! Questions are mapped to one of a fixed set of SQL query templates by
//! keyword, the query is executed, and the result is aggregated and rendered
//! into a single dashboard page. For the command line launcher, see the
//! `quarry-cli` crate.

mod aggregate;
mod chart;
mod config;
mod dashboard;
mod database;
mod error;
pub mod http;
mod intent;
mod markdown;
mod render;
mod result;
mod template;
mod value;

pub use aggregate::{aggregate, Aggregation, Analysis, Entry, InsightSet, Table};
pub use chart::{ChartKind, ChartSpec, Palette, Point};
pub use config::{Config, ConfigFormat, DEFAULT_PORT};
pub use dashboard::Dashboard;
pub use database::Database;
pub use error::{AggregateError, Error, QueryError};
pub use intent::{map_question, QueryTemplate};
pub use markdown::markdown_to_html;
pub use render::{LegendEntry, Page, Renderer, ReportPayload};
pub use result::ResultSet;
pub use template::capitalize;
pub use value::{Cell, Number};
