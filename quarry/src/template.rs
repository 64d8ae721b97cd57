//! Template helpers and text utilities shared by the report templates.

use handlebars::{
    html_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext, RenderError,
};

/// Upper-cases the first character of a string and lower-cases the rest.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Capitalizes a string.
///
/// Usage:
///
/// ```handlebars
/// {{ capitalize "vendor" }}
/// ```
///
/// Produces `Vendor`.
pub fn capitalize_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let s = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .ok_or_else(|| RenderError::new("capitalize: expected a string parameter"))?;
    out.write(&html_escape(&capitalize(s)))?;
    Ok(())
}

/// Formats a value as a percentage of a total, to one decimal place.
///
/// Usage:
///
/// ```handlebars
/// {{ percent 1 8 }}
/// ```
///
/// Produces `12.5%`. A zero total produces `0.0%`.
pub fn percent_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = h
        .param(0)
        .and_then(|v| v.value().as_f64())
        .ok_or_else(|| RenderError::new("percent: expected a numeric value"))?;
    let total = h
        .param(1)
        .and_then(|v| v.value().as_f64())
        .ok_or_else(|| RenderError::new("percent: expected a numeric total"))?;
    let pct = if total == 0.0 { 0.0 } else { value / total * 100.0 };
    out.write(&format!("{:.1}%", pct))?;
    Ok(())
}
