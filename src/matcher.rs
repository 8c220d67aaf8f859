use core::ops::Range;

use log::debug;

/// Quote text with at most one emphasis marker resolved.
///
/// `text` is the punctuation-normalized source; byte ranges index into it.
/// `emphasis` wraps only the phrase body. `span` additionally covers up to
/// one adjacent quote/punctuation character on each side that the matcher
/// consumed while accepting the occurrence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkedText {
    /// Normalized source text.
    pub text: String,
    /// Byte range of the emphasized phrase body, when matched.
    pub emphasis: Option<Range<usize>>,
    /// Byte range of the full accepted match span, when matched.
    pub span: Option<Range<usize>>,
}

impl MarkedText {
    /// Whether the matcher placed an emphasis marker.
    pub fn matched(&self) -> bool {
        self.emphasis.is_some()
    }

    /// The emphasized phrase body, when matched.
    pub fn emphasized_fragment(&self) -> Option<&str> {
        self.emphasis.clone().map(|range| &self.text[range])
    }
}

/// Map typographic quote and apostrophe variants to their ASCII equivalents.
///
/// Comparison and marked output both operate on this form; casing and all
/// other characters are preserved.
pub fn normalize_punctuation(text: &str) -> String {
    text.chars().map(normalize_char).collect()
}

fn normalize_char(ch: char) -> char {
    match ch {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => '\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => '"',
        other => other,
    }
}

fn is_quote_char(ch: char) -> bool {
    matches!(ch, '\'' | '"')
}

fn is_edge_punct(ch: char) -> bool {
    ch.is_ascii_punctuation()
}

/// Build the normalized search key for a target phrase.
///
/// Strips at most one leading and one trailing quote character, then
/// normalizes punctuation and ASCII-lowercases. Returns `None` for empty or
/// whitespace-only phrases, which never match.
pub fn phrase_key(phrase: &str) -> Option<String> {
    let normalized = normalize_punctuation(phrase.trim());
    let mut stripped = normalized.as_str();
    if let Some(rest) = stripped.strip_prefix(is_quote_char) {
        stripped = rest;
    }
    if let Some(rest) = stripped.strip_suffix(is_quote_char) {
        stripped = rest;
    }
    let key = stripped.trim();
    if key.is_empty() {
        return None;
    }
    Some(key.to_ascii_lowercase())
}

/// Whether the normalized phrase occurs anywhere in the normalized text.
///
/// This is the plain substring check used by diagnostics; it ignores the
/// boundary rules [`mark_phrase`] enforces.
pub fn phrase_occurs(text: &str, phrase: &str) -> bool {
    match phrase_key(phrase) {
        Some(key) => normalize_punctuation(text)
            .to_ascii_lowercase()
            .contains(&key),
        None => false,
    }
}

/// Locate and mark the first acceptable occurrence of `phrase` in `text`.
///
/// The occurrence may be preceded by one quote/punctuation character and
/// followed by one punctuation/quote character; both join the match span but
/// stay outside the emphasis marker. Anything further out must be whitespace
/// or the text edge. Later identical occurrences are left unmarked. On
/// failure the normalized text is returned without a marker.
pub fn mark_phrase(text: &str, phrase: &str) -> MarkedText {
    let normalized = normalize_punctuation(text);
    let Some(key) = phrase_key(phrase) else {
        return MarkedText {
            text: normalized,
            ..MarkedText::default()
        };
    };

    // ASCII lowercasing is byte-length preserving, so haystack offsets map
    // directly onto the normalized text.
    let haystack = normalized.to_ascii_lowercase();
    let mut from = 0;
    while let Some(found) = haystack[from..].find(&key) {
        let start = from + found;
        let end = start + key.len();
        if let Some(span) = accept_span(&normalized, start, end) {
            return MarkedText {
                text: normalized,
                emphasis: Some(start..end),
                span: Some(span),
            };
        }
        from = match normalized[start..].chars().next() {
            Some(ch) => start + ch.len_utf8(),
            None => break,
        };
    }

    debug!("no acceptable occurrence of target phrase");
    MarkedText {
        text: normalized,
        ..MarkedText::default()
    }
}

/// Validate the boundary rules around a candidate occurrence.
///
/// Returns the full match span (phrase body plus up to one punctuation
/// character on each side) when the occurrence sits on clean word edges.
fn accept_span(text: &str, start: usize, end: usize) -> Option<Range<usize>> {
    let mut span_start = start;
    match text[..start].chars().next_back() {
        None => {}
        Some(ch) if ch.is_whitespace() => {}
        Some(ch) if is_edge_punct(ch) => {
            let outer = start - ch.len_utf8();
            match text[..outer].chars().next_back() {
                None => span_start = outer,
                Some(prev) if prev.is_whitespace() => span_start = outer,
                Some(_) => return None,
            }
        }
        Some(_) => return None,
    }

    let mut span_end = end;
    match text[end..].chars().next() {
        None => {}
        Some(ch) if ch.is_whitespace() => {}
        Some(ch) if is_edge_punct(ch) => {
            let outer = end + ch.len_utf8();
            match text[outer..].chars().next() {
                None => span_end = outer,
                Some(next) if next.is_whitespace() => span_end = outer,
                Some(_) => return None,
            }
        }
        Some(_) => return None,
    }

    Some(span_start..span_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_first_occurrence_on_word_boundaries() {
        let marked = mark_phrase("half past nine, and half past nine again", "half past nine");
        assert_eq!(marked.emphasized_fragment(), Some("half past nine"));
        let emphasis = marked.emphasis.unwrap();
        assert_eq!(emphasis.start, 0);
    }

    #[test]
    fn curly_apostrophe_and_trailing_comma_match() {
        let marked = mark_phrase(
            "It was twelve o\u{2019}clock, near enough.",
            "twelve o'clock",
        );
        assert_eq!(marked.emphasized_fragment(), Some("twelve o'clock"));
        // The comma joins the span but not the marker.
        let span = marked.span.unwrap();
        let emphasis = marked.emphasis.unwrap();
        assert_eq!(span.end, emphasis.end + 1);
        assert_eq!(&marked.text[span.clone()], "twelve o'clock,");
    }

    #[test]
    fn leading_quote_on_adjacent_word_is_untouched() {
        let marked = mark_phrase(
            "'Tis now the very witching time of night",
            "witching time of night",
        );
        assert_eq!(marked.emphasized_fragment(), Some("witching time of night"));
        assert!(marked.text.starts_with("'Tis"));
    }

    #[test]
    fn phrase_quotes_are_stripped_before_search() {
        assert_eq!(phrase_key("'ten o'clock'"), Some("ten o'clock".to_string()));
        assert_eq!(phrase_key("\u{201C}Noon\u{201D}"), Some("noon".to_string()));
    }

    #[test]
    fn empty_or_whitespace_phrase_never_matches() {
        assert!(!mark_phrase("some text", "").matched());
        assert!(!mark_phrase("some text", "   \n").matched());
        assert!(phrase_key("''").is_none());
    }

    #[test]
    fn occurrence_inside_a_longer_word_is_rejected() {
        let marked = mark_phrase("they met nightly at the gate", "night");
        assert!(!marked.matched());
        assert!(phrase_occurs("they met nightly at the gate", "night"));
    }

    #[test]
    fn double_punctuation_before_occurrence_is_rejected() {
        let marked = mark_phrase("he said (\"ten past four\" or so)", "ten past four");
        assert!(!marked.matched());
        assert!(phrase_occurs("he said (\"ten past four\" or so)", "ten past four"));
    }

    #[test]
    fn case_differences_are_tolerated() {
        let marked = mark_phrase("At Half Past Nine the bell rang", "half past nine");
        assert_eq!(marked.emphasized_fragment(), Some("Half Past Nine"));
    }

    #[test]
    fn later_occurrence_accepted_when_first_is_embedded() {
        let marked = mark_phrase("midnightish, but truly midnight", "midnight");
        let emphasis = marked.emphasis.unwrap();
        assert_eq!(&marked.text[emphasis], "midnight");
        assert!(marked.span.unwrap().start > 0);
    }
}
