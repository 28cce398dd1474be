//! HTML report templating.
//!
//! The runner renders one HTML document per feature by handing a template
//! name and a key-value argument map to a [`ReportTemplate`]. Hosts may
//! install their own renderer; [`DefaultTemplate`] provides a dependency-free
//! built-in page embedding the JSON trace and the correlated error details.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::correlate::ErrorDetail;

/// Name of the built-in per-feature report template.
pub const FEATURE_REPORT: &str = "feature-report";

/// Errors raised while rendering a report template.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateError {
    /// The renderer knows no template by that name.
    #[error("unknown template: {0}")]
    UnknownTemplate(String),
    /// A template argument the renderer requires was not supplied.
    #[error("missing template argument: {0}")]
    MissingArgument(&'static str),
}

/// Key-value arguments handed to a template renderer.
#[derive(Debug, Default, Clone)]
pub struct TemplateArgs {
    values: BTreeMap<String, String>,
}

impl TemplateArgs {
    /// Empty argument map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument, returning the map for chaining.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Look up an argument by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Look up an argument, raising [`TemplateError::MissingArgument`] when
    /// absent.
    ///
    /// # Errors
    /// Returns an error naming the missing key.
    pub fn require(&self, key: &'static str) -> Result<&str, TemplateError> {
        self.get(key).ok_or(TemplateError::MissingArgument(key))
    }
}

/// Renderer of named report templates.
pub trait ReportTemplate {
    /// Render the named template with the supplied arguments.
    ///
    /// # Errors
    /// Returns an error when the template name is unknown or a required
    /// argument is missing.
    fn render(&self, name: &str, args: &TemplateArgs) -> Result<String, TemplateError>;
}

/// Escape a string for inclusion in HTML text or attribute content.
#[must_use]
pub fn html_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Render the correlated error details as an HTML fragment.
///
/// Each detail becomes a section carrying the failure message and, when the
/// correlator attached one, the source window with the failing line marked.
#[must_use]
pub fn error_details_html(details: &[ErrorDetail]) -> String {
    let mut out = String::new();
    for detail in details {
        out.push_str("<section class=\"error\">\n");
        let _ = writeln!(
            out,
            "  <p class=\"message\">{}</p>",
            html_escape(detail.failure().message())
        );
        if let (Some(path), Some(line)) = (detail.source_path(), detail.error_line()) {
            let _ = writeln!(
                out,
                "  <p class=\"source\">{}:{line}</p>",
                html_escape(path)
            );
        }
        if !detail.window().is_empty() {
            out.push_str("  <pre class=\"window\">\n");
            for source_line in detail.window() {
                let class = if source_line.in_error { "in-error" } else { "context" };
                let _ = writeln!(
                    out,
                    "<span class=\"{class}\">{:>5} {}</span>",
                    source_line.number,
                    html_escape(&source_line.text)
                );
            }
            out.push_str("  </pre>\n");
        }
        out.push_str("</section>\n");
    }
    out
}

/// Render a set of pending-step snippets as an HTML fragment.
#[must_use]
pub fn snippets_html<'a>(snippets: impl IntoIterator<Item = &'a str>) -> String {
    let mut items: Vec<&str> = snippets.into_iter().collect();
    items.sort_unstable();
    if items.is_empty() {
        return String::new();
    }
    let mut out = String::from("<section class=\"snippets\">\n");
    for snippet in items {
        let _ = writeln!(out, "  <pre>{}</pre>", html_escape(snippet));
    }
    out.push_str("</section>\n");
    out
}

/// Built-in renderer producing a self-contained HTML page per feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTemplate;

impl ReportTemplate for DefaultTemplate {
    fn render(&self, name: &str, args: &TemplateArgs) -> Result<String, TemplateError> {
        if name != FEATURE_REPORT {
            return Err(TemplateError::UnknownTemplate(name.to_owned()));
        }
        let uri = args.require("uri")?;
        let feature_name = args.require("name")?;
        let status = args.require("status")?;
        let trace = args.require("trace")?;
        let errors = args.get("errors").unwrap_or_default();
        let snippets = args.get("snippets").unwrap_or_default();
        let mut out = String::from("<!DOCTYPE html>\n<html>\n<head>\n");
        let _ = writeln!(out, "  <title>{}</title>", html_escape(uri));
        out.push_str("</head>\n<body>\n");
        let _ = writeln!(
            out,
            "  <h1>{} <small>{}</small></h1>",
            html_escape(feature_name),
            html_escape(uri)
        );
        let _ = writeln!(
            out,
            "  <p class=\"status\">{}</p>",
            html_escape(status)
        );
        out.push_str(errors);
        out.push_str(snippets);
        let _ = writeln!(
            out,
            "  <script type=\"application/json\" id=\"trace\">{trace}</script>"
        );
        out.push_str("</body>\n</html>\n");
        Ok(out)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests {
    use super::*;
    use crate::failure::StepFailure;
    use crate::sources::InMemorySources;

    #[test]
    fn html_escape_covers_reserved_characters() {
        assert_eq!(html_escape("<b>&\"'</b>"), "&lt;b&gt;&amp;&quot;&#39;&lt;/b&gt;");
    }

    #[test]
    fn unknown_template_name_is_rejected() {
        let err = DefaultTemplate
            .render("nope", &TemplateArgs::new())
            .unwrap_err();
        assert_eq!(err, TemplateError::UnknownTemplate("nope".into()));
    }

    #[test]
    fn missing_argument_is_named() {
        let args = TemplateArgs::new().with("uri", "a.feature");
        let err = DefaultTemplate.render(FEATURE_REPORT, &args).unwrap_err();
        assert_eq!(err, TemplateError::MissingArgument("name"));
    }

    #[test]
    fn report_embeds_trace_and_escapes_identity() {
        let args = TemplateArgs::new()
            .with("uri", "a&b.feature")
            .with("name", "Adding <numbers>")
            .with("status", "PASSED")
            .with("trace", "{\"steps\":[]}");
        let html = DefaultTemplate.render(FEATURE_REPORT, &args).unwrap();
        assert!(html.contains("a&amp;b.feature"));
        assert!(html.contains("Adding &lt;numbers&gt;"));
        assert!(html.contains("{\"steps\":[]}"));
    }

    #[test]
    fn error_fragment_marks_the_failing_line() {
        let source = (1..=20).fold(String::new(), |mut text, n| {
            text.push_str(&format!("line {n}\n"));
            text
        });
        let sources = InMemorySources::new().with_source("app::sums", "src/sums.rs", source);
        let failure = StepFailure::new("expected 4, got 5").with_frame("app::sums", 10);
        let details = crate::correlate::build_errors(vec![failure], &sources);
        let fragment = error_details_html(&details);
        assert!(fragment.contains("expected 4, got 5"));
        assert!(fragment.contains("src/sums.rs:10"));
        assert!(fragment.contains("<span class=\"in-error\">"));
    }

    #[test]
    fn snippet_fragment_is_sorted_and_empty_when_no_snippets() {
        assert!(snippets_html([]).is_empty());
        let fragment = snippets_html(["b snippet", "a snippet"]);
        let a = fragment.find("a snippet").unwrap();
        let b = fragment.find("b snippet").unwrap();
        assert!(a < b);
    }
}
