//! Rendering of [`WeftError`] as miette reports.
//!
//! A parse error becomes one report per diagnostic, in line order, each
//! carrying the source so miette can show the offending line. Other errors
//! become a single report with a `weft::` code.

use miette::{LabeledSpan, MietteDiagnostic, Report, Severity, SourceSpan};

use weft::WeftError;
use weft_parser::{
    error::{self, Diagnostic},
    span::Span,
};

fn source_span(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

fn severity(diagnostic: &Diagnostic) -> Severity {
    match diagnostic.severity() {
        error::Severity::Error => Severity::Error,
        error::Severity::Warning => Severity::Warning,
    }
}

/// Builds the report for one diagnostic. Lines are shown 1-based.
pub fn diagnostic_report(diagnostic: &Diagnostic, src: &str) -> Report {
    let mut report = MietteDiagnostic::new(format!(
        "line {}: {}",
        diagnostic.line() + 1,
        diagnostic.message()
    ))
    .with_severity(severity(diagnostic));

    if let Some(code) = diagnostic.code() {
        report = report.with_code(code.to_string());
    }
    if let Some(help) = diagnostic.help() {
        report = report.with_help(help);
    }

    let marked = diagnostic.mark().map(|mark| {
        LabeledSpan::new_primary_with_span(Some(mark.note.clone()), source_span(mark.span))
    });
    let related = diagnostic
        .related()
        .iter()
        .map(|mark| LabeledSpan::new_with_span(Some(mark.note.clone()), source_span(mark.span)));
    let labels: Vec<LabeledSpan> = marked.into_iter().chain(related).collect();
    if !labels.is_empty() {
        report = report.with_labels(labels);
    }

    Report::new(report).with_source_code(src.to_string())
}

/// Converts a [`WeftError`] into the reports to print.
pub fn to_reports(err: &WeftError) -> Vec<Report> {
    let code = match err {
        WeftError::Parse { err, src } => {
            return err
                .diagnostics()
                .iter()
                .map(|diagnostic| diagnostic_report(diagnostic, src))
                .collect();
        }
        WeftError::Io(_) => "weft::io",
        WeftError::Config(_) => "weft::config",
    };
    vec![Report::new(MietteDiagnostic::new(err.to_string()).with_code(code))]
}

#[cfg(test)]
mod tests {
    use weft_parser::{
        error::{ErrorCode, ParseError},
        span::Position,
    };

    use super::*;

    #[test]
    fn test_diagnostic_report_fields() {
        let diagnostic = Diagnostic::error("Expected ':' after element ID")
            .with_code(ErrorCode::E102)
            .at(Position::new(1, 6))
            .marking(Span::new(14..18), "expected `:`")
            .with_help("write `id: shape`");

        let report = diagnostic_report(&diagnostic, "a: rect\nbroken rect\n");

        assert_eq!(report.to_string(), "line 2: Expected ':' after element ID");
        assert_eq!(report.code().unwrap().to_string(), "E102");
        assert_eq!(report.severity(), Some(Severity::Error));
        assert_eq!(report.help().unwrap().to_string(), "write `id: shape`");
        assert!(report.source_code().is_some());
    }

    #[test]
    fn test_duplicate_id_marks_both_declarations() {
        let source = "a: rect\na: ellipse\n";
        let output = weft_parser::parse(source);

        let reports: Vec<Report> = output
            .errors
            .iter()
            .map(|diagnostic| diagnostic_report(diagnostic, source))
            .collect();

        assert_eq!(reports.len(), 2);
        let labels: Vec<LabeledSpan> = reports[1].labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert_eq!(labels[0].offset(), 8);
        assert!(!labels[1].primary());
        assert_eq!(labels[1].label(), Some("first declared here"));
        assert_eq!(labels[1].offset(), 0);
    }

    #[test]
    fn test_parse_error_reports_per_line() {
        let source = "a: rect\nbroken\nc: rect {\n";
        let err = weft_parser::parse(source).into_result().unwrap_err();
        let err = WeftError::new_parse_error(err, source);

        let reports = to_reports(&err);

        assert_eq!(reports.len(), 2);
        assert!(reports[0].to_string().starts_with("line 2: "));
        assert!(reports[1].to_string().starts_with("line 3: "));
    }

    #[test]
    fn test_warning_severity() {
        let err = WeftError::new_parse_error(
            ParseError::from(Diagnostic::warning("edge connects nothing")),
            "e: edge\n",
        );

        let reports = to_reports(&err);

        assert_eq!(reports[0].severity(), Some(Severity::Warning));
        assert!(reports[0].labels().is_none());
    }

    #[test]
    fn test_config_error_code() {
        let err = WeftError::Config("bad value".to_string());

        let reports = to_reports(&err);

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].to_string(), "Configuration error: bad value");
        assert_eq!(reports[0].code().unwrap().to_string(), "weft::config");
    }
}
