//! Phrase matching and styled tokenization for e-paper quote frames.
//!
//! This crate owns the text side of the pipeline: locating a target phrase
//! inside a quote while tolerating typographic quote/apostrophe drift, and
//! splitting the marked text into styled word/whitespace runs. Layout and
//! rendering live in `quote-fit-render` and its backends.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

mod matcher;
mod record;
mod tokenizer;

pub use matcher::{mark_phrase, normalize_punctuation, phrase_key, phrase_occurs, MarkedText};
pub use record::QuoteRecord;
pub use tokenizer::{flatten_newlines, tokenize, StyledRun};
