//! Non-fatal composition diagnostics.
//!
//! Precedence inconsistencies do not abort a composition run; they are
//! recorded through a [`DiagnosticAcceptor`] for the caller to inspect
//! afterwards. [`DiagnosticLog`] is the stock accumulating implementation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::RwLock;
use tracing::warn;

/// The kinds of non-fatal findings the engine can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A contribution declared a category that is absent from the global
    /// categorization order.
    MissingCategoryPrecedence,

    /// A contribution's effective categories are not strictly increasing in
    /// global precedence order.
    PrecedenceMismatchInContribution,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::MissingCategoryPrecedence => write!(f, "missing category precedence"),
            IssueKind::PrecedenceMismatchInContribution => {
                write!(f, "precedence mismatch in contribution")
            }
        }
    }
}

/// One recorded finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: IssueKind,
    /// Which contribution the finding concerns (its source id).
    pub location: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

/// Sink for non-fatal findings.
pub trait DiagnosticAcceptor: Send + Sync {
    fn accept(&self, kind: IssueKind, location: &str, detail: String);
}

/// The default acceptor: accumulates diagnostics in memory and logs each one
/// as a warning.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: RwLock<Vec<Diagnostic>>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of everything recorded so far.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.read().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// How many findings of the given kind were recorded.
    pub fn count_of(&self, kind: IssueKind) -> usize {
        self.entries
            .read()
            .unwrap()
            .iter()
            .filter(|d| d.kind == kind)
            .count()
    }
}

impl DiagnosticAcceptor for DiagnosticLog {
    fn accept(&self, kind: IssueKind, location: &str, detail: String) {
        warn!(%kind, location, "{detail}");
        self.entries.write().unwrap().push(Diagnostic {
            kind,
            location: location.to_string(),
            detail,
            timestamp: Utc::now(),
        });
    }
}
