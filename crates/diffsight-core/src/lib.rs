//! Orchestration for diffsight.
//!
//! This crate drives the diff coverage pipeline: it walks every file the
//! diff source reports as changed, intersects each file's violation data
//! with its changed lines, memoizes the result for the lifetime of the run,
//! answers summary queries, and assembles the `ReportContext` handed to
//! renderers.
//!
//! # Example
//!
//! ```rust,ignore
//! use diffsight_core::{CoverageAggregator, FsSourceReader};
//!
//! let aggregator = CoverageAggregator::new(violation_source, diff_source);
//! let reader = FsSourceReader::new(".");
//! let context = aggregator.report_context(&reader)?;
//! println!("{}% covered", context.total_percent_covered);
//! ```

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use diffsight_domain::{classified_hunks, split_source_lines, DiffViolations, CONTEXT_RADIUS};
use diffsight_ports::{DiffSource, SourceReader, ViolationSource};
use diffsight_types::{ReportContext, SrcStats};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur while assembling a report.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A source file needed for hunk context could not be read.
    ///
    /// Fatal for the report run; there is no partial-report fallback.
    #[error("failed to read source file `{path}`: {source}")]
    SourceRead {
        path: String,
        #[source]
        source: io::Error,
    },
}

// ============================================================================
// Source Reader
// ============================================================================

/// Filesystem-backed source reader rooted at a base directory.
pub struct FsSourceReader {
    root: PathBuf,
}

impl FsSourceReader {
    /// Create a reader resolving relative paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SourceReader for FsSourceReader {
    fn read_source(&self, path: &str) -> io::Result<String> {
        let full_path = if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.root.join(path)
        };
        fs::read_to_string(full_path)
    }
}

// ============================================================================
// Coverage Aggregator
// ============================================================================

/// Orchestrates per-file `DiffViolations` construction across all files
/// touched by the diff and answers summary queries over the result.
///
/// Construction triggers no I/O and no collaborator calls. The per-file map
/// is computed in one pass on first access to any derived statistic and
/// memoized for the lifetime of the aggregator, so repeated queries never
/// re-invoke the collaborators.
pub struct CoverageAggregator<V, D> {
    violations: V,
    diff: D,
    diff_violations: OnceCell<BTreeMap<String, DiffViolations>>,
}

impl<V: ViolationSource, D: DiffSource> CoverageAggregator<V, D> {
    /// Create an aggregator over the given collaborators.
    pub fn new(violations: V, diff: D) -> Self {
        Self {
            violations,
            diff,
            diff_violations: OnceCell::new(),
        }
    }

    /// Display name of the violation/coverage report.
    pub fn coverage_report_name(&self) -> String {
        self.violations.name()
    }

    /// Display name of the diff.
    pub fn diff_report_name(&self) -> String {
        self.diff.name()
    }

    /// The memoized per-file map, computed on first access.
    fn diff_violations(&self) -> &BTreeMap<String, DiffViolations> {
        self.diff_violations.get_or_init(|| {
            self.diff
                .src_paths_changed()
                .into_iter()
                .map(|src_path| {
                    let summary = DiffViolations::new(
                        &self.violations.violations(&src_path),
                        self.violations.measured_lines(&src_path).as_ref(),
                        &self.diff.lines_changed(&src_path),
                    );
                    (src_path, summary)
                })
                .collect()
        })
    }

    /// Source paths in the diff for which coverage information exists,
    /// ascending.
    ///
    /// Files touched by the diff but wholly unmeasured are excluded;
    /// "untested" and "clean" must not be conflated.
    pub fn src_paths(&self) -> Vec<String> {
        self.diff_violations()
            .iter()
            .filter(|(_, summary)| !summary.measured_lines().is_empty())
            .map(|(src_path, _)| src_path.clone())
            .collect()
    }

    /// Percent of measured changed lines in `src_path` carrying no
    /// violation, or `None` when there is no coverage information.
    pub fn percent_covered(&self, src_path: &str) -> Option<f64> {
        self.diff_violations().get(src_path)?.percent_covered()
    }

    /// Missing (violation) line numbers in `src_path` that were changed,
    /// ascending. Empty when there is no coverage information.
    pub fn missing_lines(&self, src_path: &str) -> Vec<u32> {
        self.diff_violations()
            .get(src_path)
            .map(|summary| summary.violation_lines().iter().copied().collect())
            .unwrap_or_default()
    }

    /// Total number of changed lines with coverage information.
    pub fn total_num_lines(&self) -> usize {
        self.diff_violations()
            .values()
            .map(|summary| summary.measured_lines().len())
            .sum()
    }

    /// Total number of changed lines that should be covered but aren't.
    pub fn total_num_missing(&self) -> usize {
        self.diff_violations()
            .values()
            .map(|summary| summary.violation_lines().len())
            .sum()
    }

    /// Integer percent of measured changed lines covered across the whole
    /// diff, floored.
    ///
    /// A diff with zero measured lines reports exactly 100; absence of
    /// evidence is not evidence of failure.
    pub fn total_percent_covered(&self) -> u32 {
        let total_lines = self.total_num_lines();
        if total_lines == 0 {
            return 100;
        }
        let missing = self.total_num_missing();
        (100.0 - missing as f64 / total_lines as f64 * 100.0).floor() as u32
    }

    /// Assemble the full report context for the rendering step.
    ///
    /// For every path with coverage information this combines the summary
    /// statistics with the classified hunk sequence, reading each source
    /// file once through `reader`. Files whose changed lines are fully
    /// covered produce no hunks and are not read at all.
    pub fn report_context<R: SourceReader>(&self, reader: &R) -> Result<ReportContext, CoreError> {
        let mut src_stats = BTreeMap::new();

        for src_path in self.src_paths() {
            // src_paths() guarantees a non-empty measured set, so the
            // percentage exists.
            let Some(percent_covered) = self.percent_covered(&src_path) else {
                continue;
            };

            let missing_lines = self.missing_lines(&src_path);
            let hunks = if missing_lines.is_empty() {
                Vec::new()
            } else {
                let content =
                    reader
                        .read_source(&src_path)
                        .map_err(|source| CoreError::SourceRead {
                            path: src_path.clone(),
                            source,
                        })?;
                let source_lines = split_source_lines(&content);
                classified_hunks(
                    &missing_lines,
                    &source_lines,
                    &self.diff.lines_changed(&src_path),
                    CONTEXT_RADIUS,
                )
            };

            let num_missing = missing_lines.len();
            src_stats.insert(
                src_path,
                SrcStats {
                    percent_covered,
                    missing_lines,
                    num_missing,
                    hunks,
                },
            );
        }

        Ok(ReportContext {
            report_name: self.coverage_report_name(),
            diff_name: self.diff_report_name(),
            src_stats,
            total_num_lines: self.total_num_lines(),
            total_num_missing: self.total_num_missing(),
            total_percent_covered: self.total_percent_covered(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
