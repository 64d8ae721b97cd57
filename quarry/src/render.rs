//! Presentation: turns an analysis into a report payload and HTML pages.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use eyre::{Result, WrapErr};
use handlebars::Handlebars;
use log::debug;
use serde::Serialize;
use sha2::{Digest, Sha256};
use subtle_encoding::hex;

use crate::markdown::markdown_to_html;
use crate::template::{capitalize_helper, percent_helper};
use crate::{ChartKind, ChartSpec, Config, Error, InsightSet, Table};

pub const PAGE_TEMPLATE: &str = "page";
pub const REPORT_TEMPLATE: &str = "report";

const BUILTIN_TEMPLATES: [(&str, &str); 2] = [
    (PAGE_TEMPLATE, include_str!("../templates/page.hbs")),
    (REPORT_TEMPLATE, include_str!("../templates/report.hbs")),
];
const BUILTIN_TIPS: &str = include_str!("../templates/tips.md");
const TIPS_FILE: &str = "tips.md";

/// The rendered outputs of one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPayload {
    pub title: String,
    pub chart_kind: ChartKind,
    /// The chart image as a PNG `data:` URI.
    pub chart: String,
    pub insights: Vec<String>,
    pub table: Table,
    /// One entry per charted point, in chart order.
    pub legend: Vec<LegendEntry>,
    /// The sum of the non-negative legend values.
    pub legend_total: f64,
}

/// A chart segment's label, value and colour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub value: f64,
    pub color: String,
}

/// What the dashboard page shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    /// Nothing has been asked yet: every output region is empty.
    Blank,
    Report {
        question: String,
        payload: ReportPayload,
    },
    /// The question could not be answered.
    Failed { question: String, message: String },
}

#[derive(Serialize)]
struct PageContext<'a> {
    title: &'a str,
    tips: &'a str,
    question: Option<&'a str>,
    report: Option<&'a ReportPayload>,
    error: Option<&'a str>,
}

/// Renders reports and pages through a Handlebars registry.
pub struct Renderer {
    hb: Handlebars<'static>,
    // Maps template names -> content hashes.
    template_hashes: HashMap<String, String>,
    title: String,
    // Navigation tips, already converted to HTML.
    tips: String,
}

impl Renderer {
    /// Constructor.
    ///
    /// Templates found in the configured templates directory take precedence
    /// over the built-in ones. In debug mode they are reloaded from disk on
    /// every render.
    pub fn new(config: &Config) -> Result<Self> {
        let mut hb = Handlebars::new();
        hb.set_dev_mode(config.debug);
        hb.register_helper("capitalize", Box::new(capitalize_helper));
        hb.register_helper("percent", Box::new(percent_helper));
        let mut renderer = Self {
            hb,
            template_hashes: HashMap::new(),
            title: config.title.clone(),
            tips: markdown_to_html(BUILTIN_TIPS),
        };
        if let Some(dir) = &config.templates_dir {
            renderer.load_overrides(dir)?;
        }
        for (name, content) in BUILTIN_TEMPLATES {
            if renderer.hb.has_template(name) {
                debug!("Built-in template {} is overridden, skipping", name);
                continue;
            }
            renderer.register_template(name, content)?;
        }
        Ok(renderer)
    }

    /// Compiles the given template and adds it to the registry, returning an
    /// error if a different template with the same name already exists.
    pub fn register_template<N, T>(&mut self, name: N, template: T) -> Result<()>
    where
        N: AsRef<str>,
        T: AsRef<str>,
    {
        let name = name.as_ref();
        let template = template.as_ref();
        let template_hash = sha256(template);
        if self.hb.has_template(name) {
            if self.template_hashes.get(name) == Some(&template_hash) {
                debug!(
                    "Already have template {} with hash {}, skipping",
                    name, template_hash
                );
                return Ok(());
            }
            return Err(Error::TemplateAlreadyExists(name.to_string()).into());
        }
        debug!("Registering template {} with hash {}", name, template_hash);
        self.hb.register_template_string(name, template)?;
        self.template_hashes.insert(name.to_string(), template_hash);
        Ok(())
    }

    // Registers every `*.hbs` file in the directory under its file stem, and
    // picks up `tips.md` if present.
    fn load_overrides(&mut self, dir: &Path) -> Result<()> {
        let pattern = dir.join("*.hbs").to_string_lossy().into_owned();
        let paths = glob::glob(&pattern).map_err(|e| Error::TemplatePattern(pattern.clone(), e))?;
        for entry in paths {
            let path = entry?;
            if !path.is_file() {
                continue;
            }
            let name = match path.file_stem().and_then(|s| s.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            debug!("Loading template {} from {}", name, path.display());
            self.hb
                .register_template_file(&name, &path)
                .wrap_err_with(|| Error::FailedToLoadTemplate(path.clone()))?;
        }
        let tips_path = dir.join(TIPS_FILE);
        if tips_path.is_file() {
            let content = fs::read_to_string(&tips_path)
                .wrap_err_with(|| Error::FailedToLoadTemplate(tips_path.clone()))?;
            self.tips = markdown_to_html(&content);
            debug!("Loaded navigation tips from {}", tips_path.display());
        }
        Ok(())
    }

    /// Assembles the payload for one report: the chart as an inline image,
    /// the insight sentences and the raw table.
    pub fn render(
        &self,
        chart: &ChartSpec,
        insights: &InsightSet,
        table: &Table,
    ) -> Result<ReportPayload, Error> {
        let legend = chart
            .points()
            .iter()
            .enumerate()
            .map(|(i, p)| LegendEntry {
                label: p.label.clone(),
                value: p.value,
                color: chart.color(i).to_string(),
            })
            .collect::<Vec<LegendEntry>>();
        let legend_total = legend.iter().map(|e| e.value.max(0.0)).sum();
        Ok(ReportPayload {
            title: chart.title().to_string(),
            chart_kind: chart.kind(),
            chart: chart.to_data_uri()?,
            insights: insights.sentences(),
            table: table.clone(),
            legend,
            legend_total,
        })
    }

    /// Renders the full dashboard page.
    pub fn render_page(&self, page: &Page) -> Result<String, Error> {
        let ctx = match page {
            Page::Blank => PageContext {
                title: &self.title,
                tips: &self.tips,
                question: None,
                report: None,
                error: None,
            },
            Page::Report { question, payload } => PageContext {
                title: &self.title,
                tips: &self.tips,
                question: Some(question.as_str()),
                report: Some(payload),
                error: None,
            },
            Page::Failed { question, message } => PageContext {
                title: &self.title,
                tips: &self.tips,
                question: Some(question.as_str()),
                report: None,
                error: Some(message.as_str()),
            },
        };
        self.hb
            .render(PAGE_TEMPLATE, &ctx)
            .map_err(|e| Error::TemplateRender(PAGE_TEMPLATE.to_string(), e))
    }
}

/// Compute the SHA256 hash of the given string and return its lowercase
/// hexadecimal representation.
fn sha256(s: &str) -> String {
    let digest = Sha256::digest(s);
    String::from_utf8_lossy(&hex::encode(digest)).into_owned()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{aggregate, Cell, Palette, ResultSet};

    fn payload(renderer: &Renderer) -> ReportPayload {
        let rs = ResultSet::new(
            ["vendor", "count"],
            vec![
                vec![Cell::from("Acme"), Cell::from(4)],
                vec![Cell::from("Globex"), Cell::from(6)],
            ],
        );
        let analysis = aggregate(&rs, &Palette::default()).unwrap();
        renderer
            .render(&analysis.chart, &analysis.insights, &analysis.table)
            .unwrap()
    }

    #[test]
    fn blank_page_has_empty_regions() {
        let renderer = Renderer::new(&Config::default()).unwrap();
        let html = renderer.render_page(&Page::Blank).unwrap();
        assert!(html.contains("SQL Generative Business Intelligence Report"));
        assert!(html.contains("Navigation Tips"));
        assert!(html.contains("<p>Use the input box above"));
        assert!(!html.contains("<img"));
        assert!(!html.contains("<li>"));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn report_page_has_chart_insights_and_table() {
        let renderer = Renderer::new(&Config::default()).unwrap();
        let payload = payload(&renderer);
        assert_eq!(payload.chart_kind, ChartKind::Comparison);
        assert!(payload.chart.starts_with("data:image/png;base64,"));
        let html = renderer
            .render_page(&Page::Report {
                question: "Show me vendor distribution".to_string(),
                payload,
            })
            .unwrap();
        assert!(html.contains(r#"<img src="data:image/png;base64,"#));
        assert!(html.contains("<li>Total number of cookies: 10</li>"));
        assert!(html.contains("Globex"));
        assert!(html.contains("table table-striped table-bordered table-hover"));
        assert!(html.contains("<td>Acme</td><td>4</td>"));
        assert!(html.contains(r#"value="Show me vendor distribution""#));
        assert!(html.contains("Comparison chart"));
        assert!(html.contains("Globex (60.0%)"));
    }

    #[test]
    fn failed_page_shows_the_error() {
        let renderer = Renderer::new(&Config::default()).unwrap();
        let html = renderer
            .render_page(&Page::Failed {
                question: "vendors".to_string(),
                message: "no data: the query returned no rows".to_string(),
            })
            .unwrap();
        assert!(html.contains("alert-danger"));
        assert!(html.contains("no data: the query returned no rows"));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn duplicate_templates_are_detected_by_content() {
        let mut renderer = Renderer::new(&Config::default()).unwrap();
        renderer
            .register_template(REPORT_TEMPLATE, BUILTIN_TEMPLATES[1].1)
            .unwrap();
        assert!(renderer.register_template(REPORT_TEMPLATE, "changed").is_err());
    }

    #[test]
    fn templates_dir_overrides_builtins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("report.hbs"), "<p id=\"custom\">{{report.title}}</p>").unwrap();
        fs::write(dir.path().join("tips.md"), "Ask about *vendors*.").unwrap();
        let config = Config {
            templates_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };
        let renderer = Renderer::new(&config).unwrap();
        let payload = payload(&renderer);
        let html = renderer
            .render_page(&Page::Report {
                question: "vendor".to_string(),
                payload,
            })
            .unwrap();
        assert!(html.contains(r#"<p id="custom">Distribution by Vendor</p>"#));
        assert!(html.contains("<em>vendors</em>"));
    }

    #[test]
    fn debug_mode_reloads_overridden_templates() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("report.hbs");
        fs::write(&report, "<p>first</p>").unwrap();
        let config = Config {
            debug: true,
            templates_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };
        let renderer = Renderer::new(&config).unwrap();
        assert!(renderer.render_page(&Page::Blank).unwrap().contains("<p>first</p>"));

        fs::write(&report, "<p>second</p>").unwrap();
        let html = renderer.render_page(&Page::Blank).unwrap();
        assert!(html.contains("<p>second</p>"));
        assert!(!html.contains("<p>first</p>"));
    }
}
