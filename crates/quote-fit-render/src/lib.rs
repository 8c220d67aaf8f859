//! Render IR, fit search, and layout engine for `quote-fit`.

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

mod render_ir;
mod render_layout;

pub use quote_fit::{QuoteRecord, StyledRun};
pub use render_ir::{
    CanvasConfig, EngineConfig, FitResult, FitSummary, FontConfig, FontWeight, Line, QuotePage,
    QuoteDiagnostic, TextCommand,
};
pub use render_layout::{
    compose_page, fit_text, wrap_runs, ComposedQuote, QuoteEngine, TextMeasurer,
};
