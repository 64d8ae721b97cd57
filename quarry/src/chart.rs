//! Chart selection and rendering.
//!
//! Charts are laid out as SVG documents and rasterised to PNG, which the
//! presentation layer inlines into the page as base64 `data:` URIs.

use std::f64::consts::PI;
use std::fmt::Write;
use std::sync::{Arc, OnceLock};

use handlebars::html_escape as escape;
use log::debug;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{self, fontdb};
use serde::{Deserialize, Serialize};
use subtle_encoding::base64;

use crate::template::capitalize;
use crate::Error;

const WIDTH: f64 = 480.0;
const HEIGHT: f64 = 480.0;
const TITLE_Y: f64 = 30.0;
const EDGE_COLOR: &str = "#000000";

/// The colours used to fill chart segments, cycled in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Palette(Vec<String>);

impl Default for Palette {
    fn default() -> Self {
        Self(
            [
                "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2",
                "#7f7f7f", "#bcbd22", "#17becf",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        )
    }
}

impl Palette {
    /// Constructor. Every colour must be in `#rrggbb` form.
    pub fn new<I, S>(colors: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let colors = colors
            .into_iter()
            .map(|c| {
                let c = c.as_ref().trim();
                if is_hex_color(c) {
                    Ok(c.to_lowercase())
                } else {
                    Err(Error::InvalidColor(c.to_string()))
                }
            })
            .collect::<Result<Vec<String>, Error>>()?;
        if colors.is_empty() {
            return Err(Error::EmptyPalette);
        }
        Ok(Self(colors))
    }

    /// The colour for the segment at the given position.
    pub fn color(&self, index: usize) -> &str {
        &self.0[index % self.0.len()]
    }

    pub fn colors(&self) -> &[String] {
        &self.0
    }
}

impl TryFrom<Vec<String>> for Palette {
    type Error = Error;

    fn try_from(colors: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(colors)
    }
}

impl From<Palette> for Vec<String> {
    fn from(p: Palette) -> Self {
        p.0
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// The shape of chart chosen for a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Pie chart with percentage labels.
    Proportion,
    /// Bar chart with a labelled value axis.
    Comparison,
}

/// A labelled value plotted on a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub label: String,
    pub value: f64,
}

/// Everything needed to draw a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    kind: ChartKind,
    title: String,
    value_label: Option<String>,
    edge_color: Option<String>,
    points: Vec<Point>,
    palette: Palette,
}

impl ChartSpec {
    /// A pie chart of each point's share of the whole.
    pub fn proportion(dimension: &str, points: Vec<Point>, palette: &Palette) -> Self {
        Self {
            kind: ChartKind::Proportion,
            title: title_for(dimension),
            value_label: None,
            edge_color: None,
            points,
            palette: palette.clone(),
        }
    }

    /// A bar chart comparing the points' values.
    pub fn comparison(dimension: &str, points: Vec<Point>, palette: &Palette) -> Self {
        Self {
            kind: ChartKind::Comparison,
            title: title_for(dimension),
            value_label: Some("Count".to_string()),
            edge_color: Some(EDGE_COLOR.to_string()),
            points,
            palette: palette.clone(),
        }
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn value_label(&self) -> Option<&str> {
        self.value_label.as_deref()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The fill colour of the point at the given position.
    pub fn color(&self, index: usize) -> &str {
        self.palette.color(index)
    }

    /// Render the chart as an SVG document.
    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="DejaVu Sans, Liberation Sans, Arial, Helvetica, sans-serif">"#,
            w = WIDTH,
            h = HEIGHT,
        );
        svg.push_str(r##"<rect width="100%" height="100%" fill="#ffffff"/>"##);
        let _ = write!(
            svg,
            r#"<text x="{}" y="{}" font-size="18" text-anchor="middle">{}</text>"#,
            WIDTH / 2.0,
            TITLE_Y,
            escape(&self.title)
        );
        match self.kind {
            ChartKind::Proportion => self.draw_pie(&mut svg),
            ChartKind::Comparison => self.draw_bars(&mut svg),
        }
        svg.push_str("</svg>");
        svg
    }

    /// Rasterise the chart to a PNG image.
    ///
    /// Text is drawn with whichever system fonts are available. Without any,
    /// the shapes are still rendered.
    pub fn to_png(&self) -> Result<Vec<u8>, Error> {
        let options = usvg::Options {
            fontdb: system_fonts(),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(&self.to_svg(), &options)
            .map_err(|e| Error::ChartRender(e.to_string()))?;
        let size = tree.size().to_int_size();
        let mut pixmap = Pixmap::new(size.width(), size.height()).ok_or_else(|| {
            Error::ChartRender(format!(
                "cannot allocate a {}x{} image",
                size.width(),
                size.height()
            ))
        })?;
        resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());
        pixmap
            .encode_png()
            .map_err(|e| Error::ChartRender(e.to_string()))
    }

    /// Render the chart and encode it as a PNG `data:` URI suitable for an
    /// `<img src>` attribute.
    pub fn to_data_uri(&self) -> Result<String, Error> {
        let encoded = base64::encode(self.to_png()?);
        Ok(format!(
            "data:image/png;base64,{}",
            String::from_utf8_lossy(&encoded)
        ))
    }

    fn draw_pie(&self, svg: &mut String) {
        let (cx, cy, r) = (WIDTH / 2.0, 260.0, 160.0);
        let total: f64 = self.points.iter().map(|p| p.value.max(0.0)).sum();
        if total <= 0.0 || !total.is_finite() {
            no_data(svg);
            return;
        }
        // Angles are measured counter-clockwise from the positive x axis,
        // starting at the top of the circle.
        let mut start = 90.0_f64;
        for (i, point) in self.points.iter().enumerate() {
            let frac = point.value.max(0.0) / total;
            if frac <= 0.0 {
                continue;
            }
            let sweep = frac * 360.0;
            let end = start + sweep;
            let color = self.palette.color(i);
            if frac >= 1.0 {
                let _ = write!(
                    svg,
                    r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}"/>"#,
                    cx, cy, r, color
                );
            } else {
                let (x0, y0) = polar(cx, cy, r, start);
                let (x1, y1) = polar(cx, cy, r, end);
                let large_arc = if sweep > 180.0 { 1 } else { 0 };
                let _ = write!(
                    svg,
                    r#"<path d="M {:.2} {:.2} L {:.2} {:.2} A {:.2} {:.2} 0 {} 0 {:.2} {:.2} Z" fill="{}"/>"#,
                    cx, cy, x0, y0, r, r, large_arc, x1, y1, color
                );
            }
            let mid = start + sweep / 2.0;
            let (lx, ly) = polar(cx, cy, r * 1.1, mid);
            let anchor = match mid.to_radians().cos() {
                c if c > 0.1 => "start",
                c if c < -0.1 => "end",
                _ => "middle",
            };
            let _ = write!(
                svg,
                r#"<text x="{:.2}" y="{:.2}" font-size="13" text-anchor="{}" dominant-baseline="middle">{}</text>"#,
                lx,
                ly,
                anchor,
                escape(&point.label)
            );
            let (px, py) = polar(cx, cy, r * 0.6, mid);
            let _ = write!(
                svg,
                r#"<text x="{:.2}" y="{:.2}" font-size="12" text-anchor="middle" dominant-baseline="middle">{:.1}%</text>"#,
                px,
                py,
                frac * 100.0
            );
            start = end;
        }
    }

    fn draw_bars(&self, svg: &mut String) {
        let (left, right, top, bottom) = (70.0, WIDTH - 20.0, 60.0, 380.0);
        if self.points.is_empty() {
            no_data(svg);
            return;
        }
        let max = self
            .points
            .iter()
            .map(|p| p.value)
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max);
        let plot_height = bottom - top;
        let slot = (right - left) / self.points.len() as f64;
        let bar_width = slot * 0.5;
        let edge = self.edge_color.as_deref().unwrap_or("none");
        for (i, point) in self.points.iter().enumerate() {
            let height = if max > 0.0 && point.value.is_finite() {
                point.value.max(0.0) / max * plot_height
            } else {
                0.0
            };
            let center = left + slot * (i as f64 + 0.5);
            let _ = write!(
                svg,
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" stroke="{}"/>"#,
                center - bar_width / 2.0,
                bottom - height,
                bar_width,
                height,
                self.palette.color(i),
                edge
            );
            let label_y = bottom + 10.0;
            let _ = write!(
                svg,
                r#"<text x="{:.2}" y="{:.2}" font-size="12" text-anchor="end" transform="rotate(-90 {:.2} {:.2})" dominant-baseline="middle">{}</text>"#,
                center,
                label_y,
                center,
                label_y,
                escape(&point.label)
            );
        }
        // Axes
        let _ = write!(
            svg,
            r#"<line x1="{l}" y1="{t}" x2="{l}" y2="{b}" stroke="{e}"/><line x1="{l}" y1="{b}" x2="{r}" y2="{b}" stroke="{e}"/>"#,
            l = left,
            t = top,
            b = bottom,
            r = right,
            e = EDGE_COLOR,
        );
        let mut ticks = vec![(bottom, "0".to_string())];
        if max > 0.0 {
            ticks.push((top, format_tick(max)));
        }
        for (y, label) in ticks {
            let _ = write!(
                svg,
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}"/><text x="{:.2}" y="{:.2}" font-size="11" text-anchor="end" dominant-baseline="middle">{}</text>"#,
                left - 5.0,
                y,
                left,
                y,
                EDGE_COLOR,
                left - 8.0,
                y,
                label
            );
        }
        if let Some(label) = &self.value_label {
            let (x, y) = (20.0, (top + bottom) / 2.0);
            let _ = write!(
                svg,
                r#"<text x="{x}" y="{y}" font-size="13" text-anchor="middle" transform="rotate(-90 {x} {y})">{}</text>"#,
                escape(label),
                x = x,
                y = y,
            );
        }
    }
}

fn title_for(dimension: &str) -> String {
    format!("Distribution by {}", capitalize(dimension))
}

fn polar(cx: f64, cy: f64, r: f64, degrees: f64) -> (f64, f64) {
    let rad = degrees * PI / 180.0;
    (cx + r * rad.cos(), cy - r * rad.sin())
}

fn format_tick(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}

fn no_data(svg: &mut String) {
    let _ = write!(
        svg,
        r#"<text x="{}" y="{}" font-size="14" text-anchor="middle">No data to display</text>"#,
        WIDTH / 2.0,
        HEIGHT / 2.0
    );
}

// Scanning the system font directories is slow, so it happens once.
fn system_fonts() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            debug!("Loaded {} font face(s) for chart text", db.len());
            Arc::new(db)
        })
        .clone()
}
