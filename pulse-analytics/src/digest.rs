//! Alignment of narrative digests with a snapshot, and extraction of per-symbol digest sections.

use crate::config::{DigestConfig, DigestMode};
use itertools::Itertools;
use pulse_data::{digest::DigestDocument, snapshot::SnapshotId};
use std::ops::Range;

/// Prefix (and suffix) of a section marker line, eg/ `=== BTC ===`.
pub const SECTION_MARKER: &str = "===";

/// Separator placed between sections aggregated from several digests.
pub const SECTION_SEPARATOR: &str = "\n---\n";

/// Selects the digest text relevant to a snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestAligner {
    config: DigestConfig,
}

impl DigestAligner {
    pub fn new(config: DigestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DigestConfig {
        &self.config
    }

    /// Digest text for `symbol` at snapshot `target`, according to the configured
    /// [`DigestMode`]. `documents` must be in chronological order.
    ///
    /// Empty when nothing matches.
    pub fn align(&self, documents: &[DigestDocument], target: SnapshotId, symbol: &str) -> String {
        match self.config.mode {
            DigestMode::Nearest => nearest_index(documents, target)
                .map(|index| documents[index].text.clone())
                .unwrap_or_default(),
            DigestMode::Window => aggregate_sections(
                &documents[window_range(documents, target, self.config.window)],
                symbol,
            ),
        }
    }
}

/// Index of the document closest in time to `target`. Ties resolve to the earliest index.
pub fn nearest_index(documents: &[DigestDocument], target: SnapshotId) -> Option<usize> {
    documents
        .iter()
        .enumerate()
        .min_by_key(|(_, document)| document.id.abs_diff_secs(&target))
        .map(|(index, _)| index)
}

/// Range of the (at most) `n` documents at and immediately preceding `target`'s position in
/// `documents`. The position is that of the last document not after `target`.
///
/// Clipped at the start of the list, and empty if every document is after `target`.
pub fn window_range(documents: &[DigestDocument], target: SnapshotId, n: usize) -> Range<usize> {
    let end = documents.partition_point(|document| document.id <= target);
    end.saturating_sub(n)..end
}

/// Join the non-empty `symbol` sections of `documents` with [`SECTION_SEPARATOR`].
pub fn aggregate_sections(documents: &[DigestDocument], symbol: &str) -> String {
    documents
        .iter()
        .filter_map(|document| extract_section(&document.text, symbol))
        .filter(|section| !section.is_empty())
        .join(SECTION_SEPARATOR)
}

/// Text of the `symbol` section of `text`, trimmed of surrounding whitespace.
pub fn extract_section<'a>(text: &'a str, symbol: &str) -> Option<&'a str> {
    locate_section(text, symbol).map(|range| &text[range])
}

/// Byte range of the `symbol` section of `text`: the text after its `=== SYMBOL ===` marker line
/// up to the next marker line (or the end of the document), trimmed of surrounding whitespace.
///
/// Symbols match ASCII case-insensitively, and the first matching marker wins. Marker lines
/// naming no symbol (eg/ a bare `===`) still terminate the preceding section.
pub fn locate_section(text: &str, symbol: &str) -> Option<Range<usize>> {
    let symbol = symbol.trim();
    let mut markers = markers(text);

    let open = markers.find(|marker| {
        marker
            .symbol
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(symbol))
    })?;
    let end = markers.next().map_or(text.len(), |next| next.line.start);

    Some(trim_range(text, open.line.end..end))
}

#[derive(Debug, Clone, PartialEq)]
struct Marker<'a> {
    /// Byte range of the whole marker line, including its line terminator.
    line: Range<usize>,
    symbol: Option<&'a str>,
}

/// Every marker line of `text`, in order.
fn markers(text: &str) -> impl Iterator<Item = Marker<'_>> {
    let mut offset = 0;
    text.split_inclusive('\n').filter_map(move |line| {
        let start = offset;
        offset += line.len();
        parse_marker(line).map(|symbol| Marker {
            line: start..offset,
            symbol,
        })
    })
}

/// `Some(symbol)` if `line` is a marker line, where `symbol` is `None` for markers naming nothing.
fn parse_marker(line: &str) -> Option<Option<&str>> {
    let rest = line.trim().strip_prefix(SECTION_MARKER)?;
    Some(
        rest.strip_suffix(SECTION_MARKER)
            .map(str::trim)
            .filter(|symbol| !symbol.is_empty()),
    )
}

fn trim_range(text: &str, range: Range<usize>) -> Range<usize> {
    let slice = &text[range.clone()];
    let start = range.start + (slice.len() - slice.trim_start().len());
    start..start + slice.trim().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "\
Market overview: risk-on.
=== BTC ===
Funding flipped positive.
OI rising into resistance.

=== ETH ===
Shorts squeezed overnight.
===
Footer without a symbol.
=== SOL ===";

    fn id(raw: &str) -> SnapshotId {
        raw.parse().unwrap()
    }

    fn doc(raw_id: &str, text: &str) -> DigestDocument {
        DigestDocument::new(id(raw_id), text)
    }

    #[test]
    fn test_parse_marker() {
        struct TestCase {
            input: &'static str,
            expected: Option<Option<&'static str>>,
        }

        let tests = vec![
            TestCase {
                // TC0: symbol marker
                input: "=== BTCUSDT ===\n",
                expected: Some(Some("BTCUSDT")),
            },
            TestCase {
                // TC1: marker with loose whitespace
                input: "  ===ETH===  \r\n",
                expected: Some(Some("ETH")),
            },
            TestCase {
                // TC2: bare marker
                input: "===\n",
                expected: Some(None),
            },
            TestCase {
                // TC3: marker naming nothing
                input: "=== ===",
                expected: Some(None),
            },
            TestCase {
                // TC4: prose mentioning the marker mid-line
                input: "see === BTC === above",
                expected: None,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            assert_eq!(parse_marker(test.input), test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_extract_section() {
        struct TestCase {
            symbol: &'static str,
            expected: Option<&'static str>,
        }

        let tests = vec![
            TestCase {
                // TC0: section ending at the next symbol marker
                symbol: "BTC",
                expected: Some("Funding flipped positive.\nOI rising into resistance."),
            },
            TestCase {
                // TC1: section ending at a bare marker
                symbol: "eth",
                expected: Some("Shorts squeezed overnight."),
            },
            TestCase {
                // TC2: marker on the final line yields an empty section
                symbol: "SOL",
                expected: Some(""),
            },
            TestCase {
                // TC3: symbol with no marker
                symbol: "XRP",
                expected: None,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            assert_eq!(extract_section(DIGEST, test.symbol), test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_extract_section_runs_to_end_without_further_marker() {
        let text = "=== BTC ===\nonly section\n";
        assert_eq!(extract_section(text, "BTC"), Some("only section"));
        assert_eq!(extract_section("no markers at all", "BTC"), None);
        assert_eq!(extract_section("", "BTC"), None);
    }

    #[test]
    fn test_locate_section_relocates_to_same_bounds() {
        let range = locate_section(DIGEST, "ETH").unwrap();

        // The marker precedes the section
        let marker_at = DIGEST.find("=== ETH ===").unwrap();
        assert!(DIGEST[..range.start].trim_end().ends_with("=== ETH ==="));

        // Re-locating from the marker yields the same bounds
        let relocated = locate_section(&DIGEST[marker_at..], "ETH").unwrap();
        assert_eq!(relocated.start + marker_at..relocated.end + marker_at, range);
        assert_eq!(&DIGEST[range], extract_section(DIGEST, "ETH").unwrap());
    }

    #[test]
    fn test_nearest_index() {
        let documents = vec![
            doc("20250101_0000", "a"),
            doc("20250101_0400", "b"),
            doc("20250101_0800", "c"),
        ];

        struct TestCase {
            target: &'static str,
            expected: Option<usize>,
        }

        let tests = vec![
            TestCase {
                // TC0: exact match
                target: "20250101_0400",
                expected: Some(1),
            },
            TestCase {
                // TC1: closer to the later document
                target: "20250101_0700",
                expected: Some(2),
            },
            TestCase {
                // TC2: equidistant resolves to the earliest
                target: "20250101_0200",
                expected: Some(0),
            },
            TestCase {
                // TC3: far future
                target: "20260101_0000",
                expected: Some(2),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            assert_eq!(nearest_index(&documents, id(test.target)), test.expected, "TC{} failed", index);
        }

        assert_eq!(nearest_index(&[], id("20250101_0000")), None);
    }

    #[test]
    fn test_nearest_mode_returns_document_unmodified() {
        let documents = vec![
            doc("20250101_0000", "=== BTC ===\nearlier"),
            doc("20250101_0400", DIGEST),
        ];
        let aligner = DigestAligner::new(DigestConfig::default().with_mode(DigestMode::Nearest));

        assert_eq!(aligner.align(&documents, id("20250101_0400"), "BTC"), DIGEST);
        assert_eq!(aligner.align(&[], id("20250101_0400"), "BTC"), "");
    }

    #[test]
    fn test_window_range() {
        let documents = (0..6)
            .map(|hour| doc(&format!("20250101_{:02}00", hour), ""))
            .collect::<Vec<_>>();

        struct TestCase {
            target: &'static str,
            n: usize,
            expected: Range<usize>,
        }

        let tests = vec![
            TestCase {
                // TC0: first document, window clipped rather than padded
                target: "20250101_0000",
                n: 4,
                expected: 0..1,
            },
            TestCase {
                // TC1: full window
                target: "20250101_0500",
                n: 4,
                expected: 2..6,
            },
            TestCase {
                // TC2: target between documents uses the last one before it
                target: "20250101_0230",
                n: 2,
                expected: 1..3,
            },
            TestCase {
                // TC3: target before every document
                target: "20241231_2300",
                n: 4,
                expected: 0..0,
            },
            TestCase {
                // TC4: zero width
                target: "20250101_0500",
                n: 0,
                expected: 6..6,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = window_range(&documents, id(test.target), test.n);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_window_mode_aggregates_sections() {
        let documents = vec![
            doc("20250101_0000", "=== BTC ===\nfirst\n=== ETH ===\neth first"),
            doc("20250101_0400", "=== ETH ===\nno btc here"),
            doc("20250101_0800", "=== BTC ===\n\n=== ETH ===\nempty btc"),
            doc("20250101_1200", "=== BTC ===\nfourth"),
            doc("20250101_1600", "=== BTC ===\nfifth"),
        ];
        let aligner = DigestAligner::default();

        // Window at index 0 holds only the first document
        assert_eq!(aligner.align(&documents, id("20250101_0000"), "BTC"), "first");

        // Window of 4 ending at the fifth document skips missing & empty sections
        assert_eq!(
            aligner.align(&documents, id("20250101_1600"), "BTC"),
            "fourth\n---\nfifth"
        );

        assert_eq!(
            aligner.align(&documents, id("20250101_0800"), "ETH"),
            "eth first\n---\nno btc here\n---\nempty btc"
        );

        assert_eq!(aligner.align(&documents, id("20250101_1600"), "XRP"), "");
    }
}
