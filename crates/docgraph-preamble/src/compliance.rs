//! Compliance checking
//!
//! Two independent check families feed one score:
//! - every required header field must be present
//! - every required section heading must appear at its expected level
//!
//! `score = 100 * passed / (8 + 9)`, rounded to two decimals.

use crate::header::ParsedHeader;
use docgraph_record::REQUIRED_FIELDS;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

/// Required section headings and their expected marker length
pub const EXPECTED_HEADINGS: [(&str, u8); 9] = [
    ("abstract", 2),
    ("motivation", 2),
    ("specification", 2),
    ("rationale", 2),
    ("backwards compatibility", 2),
    ("reference implementation", 2),
    ("security considerations", 2),
    ("copyright", 2),
    ("references", 2),
];

/// Shortest and longest heading marker
const MARKER_LEVELS: std::ops::RangeInclusive<usize> = 2..=6;
const MARKER: char = '=';

/// Outcome for one required heading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingStatus {
    /// Found at the expected level
    Present,
    /// Not found
    Missing,
    /// Found at another level
    WrongLevel {
        /// Expected marker length
        expected: u8,
        /// Marker length found
        found: u8,
    },
}

/// Check result for one required heading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingCheck {
    /// Lower-cased heading text
    pub heading: &'static str,
    /// Expected marker length
    pub expected_level: u8,
    /// Outcome
    pub status: HeadingStatus,
}

impl HeadingCheck {
    /// Whether this check passed
    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == HeadingStatus::Present
    }
}

impl Display for HeadingCheck {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.status {
            HeadingStatus::Present => write!(f, "Present: {}", self.heading),
            HeadingStatus::Missing => write!(f, "Missing: {}", self.heading),
            HeadingStatus::WrongLevel { expected, found } => write!(
                f,
                "Wrong level for {}: expected {expected}, found {found}",
                self.heading
            ),
        }
    }
}

/// Heading checks against the closed heading schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingReport {
    checks: Vec<HeadingCheck>,
}

impl HeadingReport {
    /// Build the report from the levels found in a document
    #[must_use]
    pub fn from_found(found: &HashMap<String, u8>) -> Self {
        let checks = EXPECTED_HEADINGS
            .iter()
            .map(|&(heading, expected_level)| {
                let status = match found.get(heading) {
                    None => HeadingStatus::Missing,
                    Some(&level) if level == expected_level => HeadingStatus::Present,
                    Some(&level) => HeadingStatus::WrongLevel {
                        expected: expected_level,
                        found: level,
                    },
                };
                HeadingCheck {
                    heading,
                    expected_level,
                    status,
                }
            })
            .collect();
        Self { checks }
    }

    /// All checks, in schema order
    #[inline]
    #[must_use]
    pub fn checks(&self) -> &[HeadingCheck] {
        &self.checks
    }

    /// Number of headings at the right level
    #[must_use]
    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|c| c.passed()).count()
    }

    /// Failed checks
    pub fn failures(&self) -> impl Iterator<Item = &HeadingCheck> {
        self.checks.iter().filter(|c| !c.passed())
    }
}

/// Combined field and heading report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceReport {
    /// Required fields absent from the header
    pub missing_fields: Vec<&'static str>,
    /// Heading checks
    pub headings: HeadingReport,
}

impl ComplianceReport {
    /// Total number of checks
    #[inline]
    #[must_use]
    pub const fn total() -> usize {
        REQUIRED_FIELDS.len() + EXPECTED_HEADINGS.len()
    }

    /// Number of checks that produced no flag
    #[must_use]
    pub fn passed(&self) -> usize {
        (REQUIRED_FIELDS.len() - self.missing_fields.len()) + self.headings.passed()
    }

    /// Score in `[0, 100]`
    #[must_use]
    pub fn score(&self) -> f64 {
        score_for(self.passed(), Self::total())
    }

    /// Human-readable list of flags
    #[must_use]
    pub fn issues(&self) -> Vec<String> {
        self.missing_fields
            .iter()
            .map(|f| format!("Missing field: {f}"))
            .chain(self.headings.failures().map(ToString::to_string))
            .collect()
    }
}

/// `100 * passed / total`, rounded to two decimals
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score_for(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    let raw = passed as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Parse a heading line of the form `== Text ==`
///
/// The closing marker must be identical to the opening one; the longest
/// opening run is tried first.
fn heading_on_line(line: &str) -> Option<(u8, &str)> {
    let line = line.trim_end_matches('\r');
    let lead = line.chars().take_while(|&c| c == MARKER).count();
    let longest = lead.min(*MARKER_LEVELS.end());
    for level in (*MARKER_LEVELS.start()..=longest).rev() {
        let (marker, rest) = line.split_at(level);
        if let Some(inner) = rest.strip_suffix(marker) {
            let text = inner.trim();
            if !text.is_empty() {
                return u8::try_from(level).ok().map(|l| (l, text));
            }
        }
    }
    None
}

/// Lower-cased heading text → marker length
///
/// When the same heading appears more than once, the last one wins.
#[must_use]
pub fn scan_headings(text: &str) -> HashMap<String, u8> {
    text.lines()
        .filter_map(heading_on_line)
        .map(|(level, heading)| (heading.to_lowercase(), level))
        .collect()
}

/// Compliance checker
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplianceChecker;

impl ComplianceChecker {
    /// Create new checker
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Check a parsed header against the full raw document text
    #[must_use]
    pub fn check(&self, header: &ParsedHeader, raw_text: &str) -> ComplianceReport {
        let missing_fields = REQUIRED_FIELDS
            .into_iter()
            .filter(|f| !header.contains(f))
            .collect();
        let headings = HeadingReport::from_found(&scan_headings(raw_text));
        let report = ComplianceReport {
            missing_fields,
            headings,
        };
        for issue in report.issues() {
            tracing::debug!(%issue, "compliance issue");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderParser;
    use proptest::prelude::*;

    const FULL_HEADINGS: &str = "\
==Abstract==
==Motivation==
==Specification==
==Rationale==
==Backwards Compatibility==
==Reference Implementation==
==Security Considerations==
==Copyright==
==References==
";

    const FULL_HEADER: &str = "<pre>
  BIP: 1
  Title: T
  Author: A
  Comments-URI: u
  Status: Draft
  Type: Process
  Created: 2020-01-01
  License: PD
</pre>
";

    fn check(text: &str) -> ComplianceReport {
        let header = HeaderParser::new().parse(text).unwrap();
        ComplianceChecker::new().check(&header, text)
    }

    #[test]
    fn score_rises_as_document_is_completed() {
        let fields: Vec<&str> = FULL_HEADER
            .lines()
            .filter(|line| line.starts_with("  "))
            .collect();
        let render = |fields: &[&str], headings: &[&str]| {
            let mut text = String::from("<pre>\n");
            for field in fields {
                text.push_str(field);
                text.push('\n');
            }
            text.push_str("</pre>\n");
            for heading in headings {
                text.push_str(heading);
                text.push('\n');
            }
            text
        };

        let mut previous = check(&render(&fields[..1], &[])).score();
        for count in 2..=fields.len() {
            let score = check(&render(&fields[..count], &[])).score();
            assert!(score > previous, "field {count}: {score} <= {previous}");
            previous = score;
        }
        let headings: Vec<&str> = FULL_HEADINGS.lines().collect();
        for count in 1..=headings.len() {
            let score = check(&render(&fields, &headings[..count])).score();
            assert!(score > previous, "heading {count}: {score} <= {previous}");
            previous = score;
        }
        assert_eq!(previous, 100.0);
    }

    #[test]
    fn fully_compliant_document_scores_100() {
        let text = format!("{FULL_HEADER}{FULL_HEADINGS}");
        let report = check(&text);
        assert!(report.issues().is_empty());
        assert_eq!(report.score(), 100.0);
    }

    #[test]
    fn header_only_scores_eight_of_seventeen() {
        let report = check(FULL_HEADER);
        assert_eq!(report.passed(), 8);
        assert_eq!(report.score(), 47.06);
        assert_eq!(report.headings.failures().count(), 9);
    }

    #[test]
    fn missing_fields_are_flagged() {
        let text = format!("<pre>\n  BIP: 3\n  Title: T\n</pre>\n{FULL_HEADINGS}");
        let report = check(&text);
        assert_eq!(
            report.missing_fields,
            vec!["author", "comments_uri", "status", "type", "created", "license"]
        );
        assert_eq!(report.passed(), 11);
        assert_eq!(report.score(), 64.71);
    }

    #[test]
    fn wrong_level_is_flagged() {
        let text = format!("{FULL_HEADER}{}", FULL_HEADINGS.replace("==Abstract==", "===Abstract==="));
        let report = check(&text);
        let abstract_check = report.headings.checks()[0];
        assert_eq!(
            abstract_check.status,
            HeadingStatus::WrongLevel { expected: 2, found: 3 }
        );
        assert_eq!(
            abstract_check.to_string(),
            "Wrong level for abstract: expected 2, found 3"
        );
        assert_eq!(report.passed(), 16);
    }

    #[test]
    fn heading_markers_must_match() {
        assert_eq!(heading_on_line("== Abstract =="), Some((2, "Abstract")));
        assert_eq!(heading_on_line("=== Abstract ==="), Some((3, "Abstract")));
        assert_eq!(heading_on_line("====== Deep ======"), Some((6, "Deep")));
        assert_eq!(heading_on_line("= Title ="), None);
        assert_eq!(heading_on_line("===="), None);
        assert_eq!(heading_on_line("== Abstract"), None);
        assert_eq!(heading_on_line("== Abstract ==\r"), Some((2, "Abstract")));
    }

    #[test]
    fn mismatched_run_falls_back_to_shorter_marker() {
        assert_eq!(heading_on_line("=== Abstract =="), Some((2, "= Abstract")));
    }

    #[test]
    fn duplicate_heading_last_wins() {
        let found = scan_headings("==Abstract==\ntext\n===Abstract===\n");
        assert_eq!(found.get("abstract"), Some(&3));
    }

    #[test]
    fn score_formula_is_exact() {
        for passed in 0..=17 {
            let expected = (passed as f64 / 17.0 * 100.0 * 100.0).round() / 100.0;
            assert_eq!(score_for(passed, 17), expected);
        }
    }

    proptest! {
        #[test]
        fn prop_score_monotonic(a in 0usize..=17, b in 0usize..=17) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(score_for(lo, 17) <= score_for(hi, 17));
            prop_assert!((0.0..=100.0).contains(&score_for(hi, 17)));
        }
    }
}
