use quote_fit::{flatten_newlines, mark_phrase, phrase_occurs, tokenize, StyledRun};

const WITCHING: &str = "'Tis now the very witching time of night";

#[test]
fn witching_time_marker_wraps_exactly_the_phrase() {
    let marked = mark_phrase(WITCHING, "witching time of night");
    assert!(marked.matched());
    assert_eq!(marked.emphasized_fragment(), Some("witching time of night"));
    // The leading quote belongs to 'Tis, not the phrase, and stays put.
    assert!(marked.text.starts_with("'Tis now"));
    let emphasis = marked.emphasis.clone().unwrap();
    assert_eq!(&marked.text[..emphasis.start], "'Tis now the very ");
}

#[test]
fn curly_apostrophe_and_trailing_comma_tolerated() {
    let text = "It was twelve o\u{2019}clock, and the fog had thickened.";
    let marked = mark_phrase(text, "twelve o'clock");
    assert!(marked.matched());
    assert_eq!(marked.emphasized_fragment(), Some("twelve o'clock"));
    let emphasis = marked.emphasis.clone().unwrap();
    assert_eq!(&marked.text[emphasis.end..emphasis.end + 1], ",");
}

#[test]
fn single_marked_occurrence_even_with_repeats() {
    let text = "ten past ten, then again ten past ten";
    let marked = mark_phrase(text, "ten past ten");
    let runs = tokenize(&marked);
    assert_eq!(runs.iter().filter(|run| run.emphasized).count(), 1);
    assert_eq!(marked.emphasis.clone().unwrap().start, 0);
}

#[test]
fn tokenize_round_trip_over_varied_inputs() {
    let cases = [
        ("plain words only", "absent"),
        ("with\nnewlines\nand a phrase", "a phrase"),
        ("  leading and trailing  ", "leading"),
        ("tabs\tand  double  spaces", "double"),
        ("'quoted start' and \u{201C}curly\u{201D} ends", "curly"),
    ];
    for (text, phrase) in cases {
        let marked = mark_phrase(text, phrase);
        let runs = tokenize(&marked);
        let concat: String = runs.iter().map(|run| run.text.as_str()).collect();
        assert_eq!(
            concat,
            flatten_newlines(&marked.text),
            "round trip failed for {:?}",
            text
        );
        assert!(runs.iter().all(|run| !run.text.is_empty()));
    }
}

#[test]
fn substring_present_but_unmatchable_is_detectable() {
    // Phrase occurs only inside a longer word, so the matcher refuses it
    // while the plain substring probe still sees it.
    let text = "the midnighttide swallowed the shore";
    let marked = mark_phrase(text, "midnight");
    assert!(!marked.matched());
    assert!(phrase_occurs(text, "midnight"));
}

#[test]
fn styled_run_whitespace_classification() {
    assert!(StyledRun::plain("  \t ").is_whitespace());
    assert!(!StyledRun::plain(" a ").is_whitespace());
}
