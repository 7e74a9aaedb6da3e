//! Weft - A text diagram language reconciled against a live document.
//!
//! Parsing, reconciliation and serialization for the Weft diagram language.
//! Text edits are applied to an identity-bearing document graph as single
//! undoable transactions, and the document can be written back as canonical
//! text.

pub mod config;
pub mod placement;
pub mod reconcile;
pub mod session;

mod error;

pub use weft_core::{document, geometry, history, identifier, props};
pub use weft_parser::{ParseOutput, error::LineErrors, parser_types};

pub use error::WeftError;

use log::{debug, info, trace};

use weft_core::document::Document;
use weft_parser::{parser_types::ParsedElement, serialize};

use config::AppConfig;
use reconcile::{ReconcileReport, Reconciler};
use session::Session;

/// A document together with the state needed to edit it through text.
///
/// The editor owns one [`Document`] and its [`Session`], so undo history and
/// placement references never leak between documents.
///
/// # Examples
///
/// ```rust
/// use weft::{Editor, config::AppConfig};
///
/// let mut editor = Editor::new(AppConfig::default());
///
/// // Apply text to the document
/// let report = editor.apply("a: rect \"A\"\nb: rect\nab: edge a --> b\n")
///     .expect("Failed to apply");
/// assert_eq!(report.added.len(), 3);
///
/// // Write the document back as text
/// let text = editor.to_text();
/// assert!(text.starts_with("a: rect \"A\"\n"));
///
/// // One apply is one undo step
/// assert!(editor.undo());
/// assert!(editor.document().is_empty());
/// ```
pub struct Editor {
    config: AppConfig,
    document: Document,
    session: Session,
    reconciler: Reconciler,
}

impl Editor {
    /// Create an editor with an empty document.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including viewport and reconcile settings
    pub fn new(config: AppConfig) -> Self {
        let document = Document::new(config.document().viewport());
        let reconciler = Reconciler::new(config.reconcile().clone());
        Self {
            config,
            document,
            session: Session::new(),
            reconciler,
        }
    }

    /// Replaces the reconciler, keeping the document and session.
    pub fn with_reconciler(mut self, reconciler: Reconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access for edits made outside of text, such as selection.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Parse source text into a forest.
    ///
    /// # Errors
    ///
    /// Returns [`WeftError::Parse`] carrying every diagnostic and the source
    /// when any line failed to parse or validate.
    pub fn parse(&self, source: &str) -> Result<Vec<ParsedElement>, WeftError> {
        info!("Parsing source");
        let forest = weft_parser::parse(source)
            .into_result()
            .map_err(|err| WeftError::new_parse_error(err, source))?;

        debug!(elements = forest.len(); "Source parsed successfully");
        trace!(forest:?; "Parsed forest");
        Ok(forest)
    }

    /// Parse `source` and reconcile the document with it.
    ///
    /// Nothing is applied when the text has diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`WeftError::Parse`] when the text does not parse cleanly.
    pub fn apply(&mut self, source: &str) -> Result<ReconcileReport, WeftError> {
        let forest = self.parse(source)?;
        Ok(self.reconcile(&forest))
    }

    /// Reconcile with whatever parsed, returning the diagnostics alongside.
    ///
    /// Lines with errors are skipped. Elements they declared count as absent
    /// from the text and are removed from the document.
    pub fn apply_lenient(&mut self, source: &str) -> (ReconcileReport, LineErrors) {
        let output = weft_parser::parse(source);
        if output.has_errors() {
            debug!(lines = output.errors.lines().count(); "Applying text with errors");
        }
        let report = self.reconcile(&output.elements);
        (report, output.errors)
    }

    /// Reconcile the document with an already parsed forest.
    pub fn reconcile(&mut self, forest: &[ParsedElement]) -> ReconcileReport {
        self.reconciler
            .reconcile(forest, &mut self.document, &mut self.session)
    }

    /// Serialize the whole document as lines.
    pub fn serialize(&self) -> Vec<String> {
        serialize::serialize(&self.document, self.document.roots())
    }

    /// Serialize the whole document as one string with a trailing newline per line.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for line in self.serialize() {
            text.push_str(&line);
            text.push('\n');
        }
        text
    }

    /// Undo the most recent reconciliation. Returns `false` when there is none.
    pub fn undo(&mut self) -> bool {
        self.session.undo(&mut self.document)
    }

    /// Redo the most recently undone reconciliation.
    pub fn redo(&mut self) -> bool {
        self.session.redo(&mut self.document)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

/// Highlights `source` line by line, marking lines that carry diagnostics.
pub fn highlight(source: &str) -> Vec<String> {
    let output = weft_parser::parse(source);
    let lines: Vec<&str> = source.split('\n').collect();
    weft_parser::highlight::highlight(&lines, &output.errors)
}
