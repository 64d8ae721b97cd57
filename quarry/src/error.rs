use std::path::PathBuf;

use thiserror::Error;

/// The primary error type that can be produced by Quarry.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error {0}: {1}")]
    Io(String, std::io::Error),
    #[error("failed to load configuration from {0}")]
    FailedToLoadConfig(PathBuf),
    #[error("unsupported configuration file type: {0}")]
    UnsupportedFileType(String),
    #[error("cannot determine file type of file: {0}")]
    CannotDetermineFileType(PathBuf),
    #[error("invalid palette colour \"{0}\" (expected #rrggbb)")]
    InvalidColor(String),
    #[error("the chart palette must contain at least one colour")]
    EmptyPalette,
    #[error("failed to render chart: {0}")]
    ChartRender(String),
    #[error("a different template named \"{0}\" has already been registered")]
    TemplateAlreadyExists(String),
    #[error("failed to load template from {0}")]
    FailedToLoadTemplate(PathBuf),
    #[error("failed to parse template pattern \"{0}\": {1}")]
    TemplatePattern(String, glob::PatternError),
    #[error("failed to render template \"{0}\": {1}")]
    TemplateRender(String, handlebars::RenderError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("query failed: {0}")]
    Query(#[from] QueryError),
    #[error("cannot build report: {0}")]
    Aggregate(#[from] AggregateError),
}

/// Failures while running a query template against the data source.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("cannot open database {0}: {1}")]
    Open(PathBuf, rusqlite::Error),
    #[error("failed to execute \"{0}\": {1}")]
    Execute(String, rusqlite::Error),
    #[error("query returned more than one column named \"{0}\"")]
    DuplicateColumn(String),
}

/// Failures while deriving a chart and insights from a result set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("no data: the query returned no columns")]
    NoColumns,
    #[error("no data: the query returned no rows")]
    NoRows,
    #[error("no data: every value in column \"{0}\" is null")]
    NoNumericValues(String),
    #[error("column \"{column}\" holds a non-numeric value in row {row}")]
    NonNumericMeasure { column: String, row: usize },
}
