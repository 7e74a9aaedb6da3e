//! Syntax highlighting for source lines.
//!
//! Output is HTML: recognized pieces are wrapped in `<span class="...">`
//! markers and all other text is escaped. Lines with diagnostics are
//! wrapped as a whole in `syntax-error`. Highlighting never affects parsing.

use crate::error::LineErrors;

pub const CLASS_STRING: &str = "syntax-string";
pub const CLASS_KEYWORD: &str = "syntax-keyword";
pub const CLASS_LABEL: &str = "syntax-label";
pub const CLASS_BRACKET: &str = "syntax-bracket";
pub const CLASS_ERROR: &str = "syntax-error";

const BODY_KEYWORDS: [&str; 3] = ["props", "metadata", "stylesheet"];

/// Highlights every line, marking the ones `errors` reports on.
pub fn highlight<S: AsRef<str>>(lines: &[S], errors: &LineErrors) -> Vec<String> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let html = highlight_line(line.as_ref());
            if errors.has_line(idx) {
                span(CLASS_ERROR, &html)
            } else {
                html
            }
        })
        .collect()
}

fn span(class: &str, inner: &str) -> String {
    format!("<span class=\"{class}\">{inner}</span>")
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}

/// Length of a leading `word:` prefix, including the colon.
fn leading_prefix(line: &str) -> Option<(usize, &str)> {
    let word_len = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(line.len());
    let word = &line[..word_len];
    (word_len > 0 && line[word_len..].starts_with(':')).then_some((word_len + 1, word))
}

/// Byte length of the string literal starting at the beginning of `text`.
fn string_len(text: &str) -> usize {
    let mut escaped = false;
    for (idx, c) in text.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return idx + 1,
            _ => {}
        }
    }
    text.len()
}

/// Highlights a single line.
pub fn highlight_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len() * 2);
    let trimmed = line.trim_start();
    let (indent, mut rest) = line.split_at(line.len() - trimmed.len());
    out.push_str(indent);

    if let Some((len, word)) = leading_prefix(rest) {
        let class = if BODY_KEYWORDS.contains(&word) {
            CLASS_KEYWORD
        } else {
            CLASS_LABEL
        };
        out.push_str(&span(class, &escape(&rest[..len])));
        rest = &rest[len..];
    }

    let mut plain_start = 0;
    let mut idx = 0;
    while idx < rest.len() {
        let Some(c) = rest[idx..].chars().next() else {
            break;
        };
        let marked = match c {
            '"' => Some((string_len(&rest[idx..]), CLASS_STRING)),
            '{' | '}' => Some((1, CLASS_BRACKET)),
            _ => None,
        };
        match marked {
            Some((len, class)) => {
                escape_into(&mut out, &rest[plain_start..idx]);
                out.push_str(&span(class, &escape(&rest[idx..idx + len])));
                idx += len;
                plain_start = idx;
            }
            None => idx += c.len_utf8(),
        }
    }
    escape_into(&mut out, &rest[plain_start..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Diagnostic, span::Position};

    #[test]
    fn test_label_string_and_brace() {
        assert_eq!(
            highlight_line("a: rect \"Hi <b>\" {"),
            "<span class=\"syntax-label\">a:</span> rect \
             <span class=\"syntax-string\">&quot;Hi &lt;b&gt;&quot;</span> \
             <span class=\"syntax-bracket\">{</span>"
        );
    }

    #[test]
    fn test_body_keyword_keeps_indent() {
        assert_eq!(
            highlight_line("  props: \"fill.color=red\""),
            "  <span class=\"syntax-keyword\">props:</span> \
             <span class=\"syntax-string\">&quot;fill.color=red&quot;</span>"
        );
    }

    #[test]
    fn test_escaped_quote_and_unterminated_string() {
        assert_eq!(
            highlight_line(r#"x "a\"b" y"#),
            "x <span class=\"syntax-string\">&quot;a\\&quot;b&quot;</span> y"
        );
        assert_eq!(
            highlight_line("\"open"),
            "<span class=\"syntax-string\">&quot;open</span>"
        );
    }

    #[test]
    fn test_error_lines_wrapped() {
        let mut errors = LineErrors::new();
        errors.push(Diagnostic::error("bad").at(Position::new(1, 0)));
        let lines = highlight(&["ok: rect", "bad & worse"], &errors);
        assert_eq!(lines[0], "<span class=\"syntax-label\">ok:</span> rect");
        assert_eq!(
            lines[1],
            "<span class=\"syntax-error\">bad &amp; worse</span>"
        );
    }
}
