//! Port traits for diffsight's external collaborators.
//!
//! The engine is polymorphic over three capability contracts: where the
//! violation data comes from, where the diff data comes from, and how source
//! file content is read. Concrete collectors and readers live outside the
//! engine; the engine trusts them to return well-formed, 1-based line data.

use std::collections::BTreeSet;
use std::io;

use diffsight_types::Violation;

/// Canonical line-number set used at the port boundary.
pub type LineSet = BTreeSet<u32>;

/// Port for querying line-level violations from a coverage or lint report.
pub trait ViolationSource {
    /// Display name of the report, used as a report title.
    fn name(&self) -> String;

    /// Violations recorded for `src_path`, in report order.
    fn violations(&self, src_path: &str) -> Vec<Violation>;

    /// Lines of `src_path` the source has coverage/violation status for.
    ///
    /// Returns `None` when the source cannot report granular measurement,
    /// meaning every changed line is assumed measurable.
    fn measured_lines(&self, src_path: &str) -> Option<LineSet>;
}

/// Port for querying which files and lines a diff touches.
pub trait DiffSource {
    /// Display name of the diff (e.g. a revision range), used as a report title.
    fn name(&self) -> String;

    /// All file paths touched by the diff.
    fn src_paths_changed(&self) -> BTreeSet<String>;

    /// Line numbers added or modified in the new revision for `src_path`.
    fn lines_changed(&self, src_path: &str) -> LineSet;
}

/// Port for reading source file content for hunk context display.
pub trait SourceReader {
    /// Returns the full text content of the file at `path`.
    fn read_source(&self, path: &str) -> io::Result<String>;
}
