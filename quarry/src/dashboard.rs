//! The question-to-report pipeline.

use eyre::Result;
use log::{debug, info, warn};

use crate::{aggregate, map_question, Config, Database, Error, Page, Palette, Renderer, ReportPayload};

/// Ties together intent mapping, query execution, aggregation and
/// presentation.
///
/// Everything held here is fixed at startup, so a single instance can serve
/// any number of requests concurrently.
pub struct Dashboard {
    database: Database,
    palette: Palette,
    renderer: Renderer,
}

impl Dashboard {
    /// Constructor.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            database: Database::new(&config.database),
            palette: config.palette.clone(),
            renderer: Renderer::new(config)?,
        })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Answers a question with a report.
    ///
    /// Returns `Ok(None)` for an empty question, as nothing has been asked.
    pub fn answer(&self, question: &str) -> Result<Option<ReportPayload>, Error> {
        if question.is_empty() {
            return Ok(None);
        }
        let template = map_question(question);
        info!("Question {:?} mapped to {}", question, template);
        let result = self.database.execute(template)?;
        let analysis = aggregate(&result, &self.palette).map_err(|e| {
            warn!("Cannot build report for {}: {}", template, e);
            e
        })?;
        debug!("Rendering {} report", template);
        let payload = self
            .renderer
            .render(&analysis.chart, &analysis.insights, &analysis.table)?;
        Ok(Some(payload))
    }

    /// Answers a question and decides what the page should show.
    pub fn page(&self, question: &str) -> Page {
        match self.answer(question) {
            Ok(None) => Page::Blank,
            Ok(Some(payload)) => Page::Report {
                question: question.to_string(),
                payload,
            },
            Err(e) => Page::Failed {
                question: question.to_string(),
                message: e.to_string(),
            },
        }
    }

    /// Answers a question and renders the resulting page as HTML.
    pub fn render_page(&self, question: &str) -> Result<String, Error> {
        self.renderer.render_page(&self.page(question))
    }
}
