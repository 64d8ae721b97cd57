//! Maps free-text questions onto the fixed set of report queries.
//!
//! There is no language understanding here: a question selects a template
//! purely by the keywords it contains.

use serde::Serialize;

/// One of the predefined report queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryTemplate {
    /// Number of cookies per classification.
    ClassificationDistribution,
    /// Number of cookies per vendor.
    VendorDistribution,
}

impl Default for QueryTemplate {
    fn default() -> Self {
        Self::ClassificationDistribution
    }
}

impl QueryTemplate {
    /// All the templates, in matching priority order.
    pub const ALL: [QueryTemplate; 2] = [Self::ClassificationDistribution, Self::VendorDistribution];

    /// The literal SQL executed for this template.
    pub fn sql(&self) -> &'static str {
        match self {
            Self::ClassificationDistribution => {
                "SELECT classification, COUNT(*) as count FROM cookies GROUP BY classification;"
            }
            Self::VendorDistribution => {
                "SELECT vendor, COUNT(*) as count FROM cookies GROUP BY vendor;"
            }
        }
    }

    /// The keyword that selects this template.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::ClassificationDistribution => "classification",
            Self::VendorDistribution => "vendor",
        }
    }
}

impl std::fmt::Display for QueryTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-distribution", self.keyword())
    }
}

/// Pick the query template for the given question.
///
/// Matching is a case-insensitive substring search, checked in
/// [`QueryTemplate::ALL`] order. Questions that match no keyword (including
/// the empty string) fall back to [`QueryTemplate::default`].
pub fn map_question<Q: AsRef<str>>(question: Q) -> QueryTemplate {
    let q = question.as_ref().to_lowercase();
    QueryTemplate::ALL
        .iter()
        .copied()
        .find(|template| q.contains(template.keyword()))
        .unwrap_or_default()
}
