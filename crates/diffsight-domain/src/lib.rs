//! Pure diff-restricted aggregation logic for diffsight.
//!
//! This crate implements the algorithmic core with no side effects: the
//! per-file intersection of violation data with changed lines
//! (`DiffViolations`), the grouping of missing lines into contiguous
//! context-padded hunks, and the per-line classification of each hunk
//! against the diff.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use diffsight_types::{ClassifiedLine, LineClass, SourceHunk, Violation};

/// Number of context lines shown before and after a hunk's missing lines.
pub const CONTEXT_RADIUS: u32 = 2;

// ============================================================================
// DiffViolations
// ============================================================================

/// Per-file intersection of violation and measured lines with the changed-line set.
///
/// Guarantees `violation_lines ⊆ measured_lines ⊆ changed_lines` by
/// construction. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffViolations {
    violation_lines: BTreeSet<u32>,
    measured_lines: BTreeSet<u32>,
}

impl DiffViolations {
    /// Restrict `violations` and `measured_lines` to the diff's changed lines.
    ///
    /// A `measured_lines` of `None` means the violation source cannot report
    /// granular measurement; every changed line is then assumed measurable.
    pub fn new(
        violations: &[Violation],
        measured_lines: Option<&BTreeSet<u32>>,
        changed_lines: &BTreeSet<u32>,
    ) -> Self {
        let measured_lines: BTreeSet<u32> = match measured_lines {
            Some(measured) => measured.intersection(changed_lines).copied().collect(),
            None => changed_lines.clone(),
        };
        let violation_lines = violations
            .iter()
            .map(|v| v.line)
            .filter(|line| measured_lines.contains(line))
            .collect();
        Self {
            violation_lines,
            measured_lines,
        }
    }

    /// Violation lines restricted to measured changed lines.
    pub fn violation_lines(&self) -> &BTreeSet<u32> {
        &self.violation_lines
    }

    /// Measured lines restricted to changed lines.
    pub fn measured_lines(&self) -> &BTreeSet<u32> {
        &self.measured_lines
    }

    /// Percent of measured lines carrying no violation, in [0, 100].
    ///
    /// Returns `None` when nothing is measured; "untested" must not read
    /// as either 0% or 100%.
    pub fn percent_covered(&self) -> Option<f64> {
        if self.measured_lines.is_empty() {
            return None;
        }
        Some(
            100.0
                - self.violation_lines.len() as f64 / self.measured_lines.len() as f64
                    * 100.0,
        )
    }
}

// ============================================================================
// Hunk Building
// ============================================================================

/// Group sorted missing line numbers into raw (unpadded) hunks.
///
/// Two consecutive missing lines stay in one hunk when their gap is smaller
/// than `2 * radius + 2`, i.e. when their padded windows would overlap or
/// touch. The input must be ascending and duplicate-free; an empty input
/// yields zero hunks, and the trailing hunk is always flushed.
pub fn group_hunks(missing_lines: &[u32], radius: u32) -> Vec<Vec<u32>> {
    let Some((&first, rest)) = missing_lines.split_first() else {
        return Vec::new();
    };

    let merge_gap = 2 * radius + 2;
    let mut hunks = Vec::new();
    let mut current = vec![first];
    let mut prev = first;
    for &line in rest {
        if line - prev < merge_gap {
            current.push(line);
        } else {
            hunks.push(std::mem::replace(&mut current, vec![line]));
        }
        prev = line;
    }
    hunks.push(current);
    hunks
}

/// Compute the rendered window for a raw hunk spanning `[first..last]`.
///
/// The window is padded by `radius` on both sides and clamped to
/// `[1, total_lines]`; it is empty (start > end) when the hunk lies entirely
/// past the end of the file.
pub fn padded_window(first: u32, last: u32, radius: u32, total_lines: u32) -> RangeInclusive<u32> {
    let start = first.saturating_sub(radius).max(1);
    let end = (last + radius).min(total_lines);
    start..=end
}

// ============================================================================
// Line Classification
// ============================================================================

/// Classify every line of a padded window against the diff.
///
/// Lines are tagged `Violation` when missing, `NewContext` when changed but
/// not missing, and `OldContext` otherwise. Window positions past the end of
/// `source_lines` are dropped.
pub fn classify_window(
    window: RangeInclusive<u32>,
    source_lines: &[String],
    violation_lines: &BTreeSet<u32>,
    changed_lines: &BTreeSet<u32>,
) -> SourceHunk {
    let mut lines = Vec::new();
    for line_number in window {
        let Some(content) = line_number
            .checked_sub(1)
            .and_then(|idx| source_lines.get(idx as usize))
        else {
            break;
        };
        let class = if violation_lines.contains(&line_number) {
            LineClass::Violation
        } else if changed_lines.contains(&line_number) {
            LineClass::NewContext
        } else {
            LineClass::OldContext
        };
        lines.push(ClassifiedLine {
            line_number,
            content: content.clone(),
            class,
        });
    }
    SourceHunk { lines }
}

/// Build the full classified-hunk sequence for one file.
///
/// Groups `missing_lines` into hunks, pads each against the file length, and
/// classifies every window line. Hunks are ordered by increasing line number
/// and non-overlapping by construction; windows that fall entirely outside
/// the file are dropped.
pub fn classified_hunks(
    missing_lines: &[u32],
    source_lines: &[String],
    changed_lines: &BTreeSet<u32>,
    radius: u32,
) -> Vec<SourceHunk> {
    let violation_lines: BTreeSet<u32> = missing_lines.iter().copied().collect();
    let total_lines = source_lines.len() as u32;

    group_hunks(missing_lines, radius)
        .into_iter()
        .filter_map(|hunk| {
            let (&first, &last) = (hunk.first()?, hunk.last()?);
            let window = padded_window(first, last, radius, total_lines);
            let classified =
                classify_window(window, source_lines, &violation_lines, changed_lines);
            (!classified.lines.is_empty()).then_some(classified)
        })
        .collect()
}

/// Split file content into lines, each keeping its trailing newline.
///
/// The last line mirrors the file: it carries a newline only if the file
/// ends with one.
pub fn split_source_lines(content: &str) -> Vec<String> {
    content.split_inclusive('\n').map(str::to_string).collect()
}

// ============================================================================
// Tests
// ============================================================================


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn sorted_unique_lines() -> impl Strategy<Value = Vec<u32>> {
        proptest::collection::btree_set(1u32..500, 0..40)
            .prop_map(|set| set.into_iter().collect())
    }

    proptest! {
        #[test]
        fn every_missing_line_lands_in_exactly_one_hunk(missing in sorted_unique_lines()) {
            let hunks = group_hunks(&missing, CONTEXT_RADIUS);
            let flattened: Vec<u32> = hunks.into_iter().flatten().collect();
            prop_assert_eq!(flattened, missing);
        }

        #[test]
        fn hunks_are_nonempty_and_ordered(missing in sorted_unique_lines(), radius in 0u32..5) {
            let hunks = group_hunks(&missing, radius);
            for hunk in &hunks {
                prop_assert!(!hunk.is_empty());
            }
            for pair in hunks.windows(2) {
                let last = *pair[0].last().unwrap();
                let first = *pair[1].first().unwrap();
                // Adjacent hunks split on gaps >= the merge threshold, so
                // their padded windows never overlap.
                prop_assert!(first - last >= 2 * radius + 2);
            }
        }

        #[test]
        fn percent_covered_always_in_range(
            violations in proptest::collection::btree_set(1u32..100, 0..20),
            changed in proptest::collection::btree_set(1u32..100, 1..40),
        ) {
            let violations: Vec<Violation> =
                violations.into_iter().map(Violation::new).collect();
            let dv = DiffViolations::new(&violations, None, &changed);
            if let Some(pct) = dv.percent_covered() {
                prop_assert!((0.0..=100.0).contains(&pct));
            }
        }

        #[test]
        fn classified_line_numbers_strictly_increase(
            missing in sorted_unique_lines(),
            changed in proptest::collection::btree_set(1u32..500, 0..40),
            file_len in 0usize..120,
        ) {
            let source: Vec<String> =
                (1..=file_len).map(|n| format!("line {}\n", n)).collect();
            let hunks = classified_hunks(&missing, &source, &changed, CONTEXT_RADIUS);
            for hunk in &hunks {
                prop_assert!(!hunk.lines.is_empty());
                for pair in hunk.lines.windows(2) {
                    prop_assert!(pair[0].line_number < pair[1].line_number);
                }
                prop_assert!(hunk.last_line().unwrap() as usize <= file_len);
            }
        }

        #[test]
        fn violation_classification_matches_missing_set(
            missing in sorted_unique_lines(),
            file_len in 1usize..120,
        ) {
            let source: Vec<String> =
                (1..=file_len).map(|n| format!("line {}\n", n)).collect();
            let missing_set: BTreeSet<u32> = missing.iter().copied().collect();
            let hunks = classified_hunks(&missing, &source, &missing_set, CONTEXT_RADIUS);
            for line in hunks.iter().flat_map(|h| &h.lines) {
                let expected = if missing_set.contains(&line.line_number) {
                    LineClass::Violation
                } else {
                    LineClass::OldContext
                };
                prop_assert_eq!(line.class, expected);
            }
        }
    }
}
