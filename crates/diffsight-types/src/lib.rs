//! Core types and DTOs for diffsight.
//!
//! This crate defines the value types shared across the diffsight workspace:
//! the violation record consumed from violation sources, the classified
//! source-line types produced by hunk classification, and the assembled
//! `ReportContext` handed to renderers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Violation
// ============================================================================

/// A reported issue (coverage gap, lint finding) at a specific line of a file.
///
/// Plain value type; the line number is 1-based, matching the underlying
/// file's numbering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Line number carrying the violation (1-based).
    pub line: u32,
    /// Optional human-readable description of the violation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Violation {
    /// Create a violation with no message.
    pub fn new(line: u32) -> Self {
        Self {
            line,
            message: None,
        }
    }

    /// Create a violation carrying a message.
    pub fn with_message(line: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Classified Lines and Hunks
// ============================================================================

/// Relationship of a displayed source line to the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineClass {
    /// A missing/violation line.
    Violation,
    /// A changed line that carries no violation (covered new code).
    NewContext,
    /// A line shown only for surrounding readability, not part of the diff.
    OldContext,
}

impl LineClass {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineClass::Violation => "violation",
            LineClass::NewContext => "new_context",
            LineClass::OldContext => "old_context",
        }
    }
}

/// One source line of a rendered hunk: number, raw text, and classification.
///
/// `content` keeps the trailing newline of the underlying file line; the last
/// line of a file may lack one, mirroring the file itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedLine {
    /// Line number (1-based).
    pub line_number: u32,
    /// Raw text of the line.
    pub content: String,
    /// Relationship of the line to the diff.
    pub class: LineClass,
}

/// A contiguous, context-padded region of a file selected for display.
///
/// Lines are ordered with strictly increasing `line_number`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceHunk {
    /// Classified lines of the hunk, ascending by line number.
    pub lines: Vec<ClassifiedLine>,
}

impl SourceHunk {
    /// First line number of the hunk, if any.
    pub fn first_line(&self) -> Option<u32> {
        self.lines.first().map(|l| l.line_number)
    }

    /// Last line number of the hunk, if any.
    pub fn last_line(&self) -> Option<u32> {
        self.lines.last().map(|l| l.line_number)
    }
}

// ============================================================================
// Report Context
// ============================================================================

/// Per-file summary and detail for the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrcStats {
    /// Percent of measured changed lines that carry no violation, in [0, 100].
    pub percent_covered: f64,
    /// Missing (violation) line numbers, ascending.
    pub missing_lines: Vec<u32>,
    /// Count of missing lines.
    pub num_missing: usize,
    /// Classified hunks around the missing lines, ascending, non-overlapping.
    pub hunks: Vec<SourceHunk>,
}

/// The assembled report data handed to renderers.
///
/// This is the sole artifact the engine produces for the rendering step;
/// renderers have no other channel back into the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportContext {
    /// Display name of the violation/coverage report.
    pub report_name: String,
    /// Display name of the diff (e.g. a revision range).
    pub diff_name: String,
    /// Per-file statistics, keyed by source path.
    pub src_stats: BTreeMap<String, SrcStats>,
    /// Sum of measured changed lines across all files.
    pub total_num_lines: usize,
    /// Sum of missing lines across all files.
    pub total_num_missing: usize,
    /// Integer percent of measured changed lines covered, in [0, 100].
    /// A run with zero measured lines reports exactly 100.
    pub total_percent_covered: u32,
}

// ============================================================================
// Tests
// ============================================================================
