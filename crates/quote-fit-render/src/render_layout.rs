use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use quote_fit::{
    flatten_newlines, mark_phrase, phrase_occurs, tokenize, MarkedText, QuoteRecord, StyledRun,
};

use crate::render_ir::{
    EngineConfig, FitResult, FontConfig, FontWeight, Line, QuoteDiagnostic, QuotePage, TextCommand,
};

const ELLIPSIS: &str = "...";

/// Text measurement hook for width fitting.
///
/// Implementations must be usable across records at a fixed size; the engine
/// only reads through a shared reference.
pub trait TextMeasurer: Send + Sync {
    /// Measure rendered fragment width in pixels.
    fn measure_px(&self, text: &str, size_px: u32, weight: FontWeight) -> f32;

    /// Rendered line height for a font size.
    ///
    /// Default assumes the nominal size covers the glyph box.
    fn line_height_px(&self, size_px: u32) -> i32 {
        size_px as i32
    }
}

/// Width estimate used when no backend measurer is installed.
///
/// Assumes a mono-ish advance of six tenths of the font size per char.
struct CharEstimateMeasurer;

static CHAR_ESTIMATE: CharEstimateMeasurer = CharEstimateMeasurer;

impl TextMeasurer for CharEstimateMeasurer {
    fn measure_px(&self, text: &str, size_px: u32, _weight: FontWeight) -> f32 {
        text.chars().count() as f32 * size_px as f32 * 0.6
    }
}

/// Greedily pack styled runs into width-constrained lines.
///
/// The first run on an empty line is placed unconditionally, so an
/// unbreakable over-wide run overflows instead of producing an empty line.
/// Lines are closed as-is; trailing whitespace runs are kept.
pub fn wrap_runs<F>(runs: &[StyledRun], max_width: f32, mut width_of: F) -> Vec<Line>
where
    F: FnMut(&StyledRun) -> f32,
{
    let mut lines = Vec::new();
    let mut current = Line::default();
    let mut current_width = 0.0f32;

    for run in runs {
        let width = width_of(run);
        if current.runs.is_empty() {
            current.runs.push(run.clone());
            current_width = width;
        } else if current_width + width <= max_width {
            current.runs.push(run.clone());
            current_width += width;
        } else {
            lines.push(core::mem::take(&mut current));
            current.runs.push(run.clone());
            current_width = width;
        }
    }
    if !current.runs.is_empty() {
        lines.push(current);
    }
    lines
}

fn block_height_px(line_count: usize, size_px: u32, line_gap: u32) -> i32 {
    line_count as i32 * (size_px + line_gap) as i32
}

fn emphasis_applied(lines: &[Line]) -> bool {
    lines
        .iter()
        .flat_map(|line| line.runs.iter())
        .any(|run| run.emphasized && !run.is_whitespace())
}

/// Fit marked text into `available_height` by walking the font-size ladder.
///
/// Tokenization is size-independent and happens once; each ladder step
/// re-measures and re-wraps. The first (largest) size whose block height fits
/// wins. When nothing fits the word-dropping fallback takes over at the
/// minimum size.
pub fn fit_text(
    marked: &MarkedText,
    measurer: &dyn TextMeasurer,
    fonts: &FontConfig,
    max_width: f32,
    available_height: i32,
) -> FitResult {
    let runs = tokenize(marked);
    let mut size = fonts.initial_size.max(fonts.min_size);

    loop {
        let lines = wrap_runs(&runs, max_width, |run| {
            measurer.measure_px(&run.text, size, FontWeight::for_run(run))
        });
        if block_height_px(lines.len(), size, fonts.line_gap) <= available_height {
            debug!("fit at size={} lines={}", size, lines.len());
            let emphasis_applied = emphasis_applied(&lines);
            return FitResult {
                font_size: size,
                lines,
                emphasis_applied,
                truncated: false,
            };
        }
        if size == fonts.min_size {
            break;
        }
        size = size.saturating_sub(fonts.decrement.max(1)).max(fonts.min_size);
    }

    warn!("no ladder size fits; entering truncation fallback");
    truncate_to_fit(marked, measurer, fonts, max_width, available_height)
}

/// Word-dropping degradation over the original, unmarked text.
///
/// Emphasis is deliberately abandoned here; legibility at the minimum size
/// wins over preserving the marker.
fn truncate_to_fit(
    marked: &MarkedText,
    measurer: &dyn TextMeasurer,
    fonts: &FontConfig,
    max_width: f32,
    available_height: i32,
) -> FitResult {
    let flattened = flatten_newlines(&marked.text);
    let words: Vec<&str> = flattened.split_whitespace().collect();
    let size = fonts.min_size;

    for kept in (0..words.len()).rev() {
        let mut candidate = words[..kept].join(" ");
        candidate.push_str(ELLIPSIS);
        let runs = tokenize(&MarkedText {
            text: candidate,
            ..MarkedText::default()
        });
        let lines = wrap_runs(&runs, max_width, |run| {
            measurer.measure_px(&run.text, size, FontWeight::for_run(run))
        });
        if block_height_px(lines.len(), size, fonts.line_gap) <= available_height {
            return FitResult {
                font_size: size,
                lines,
                emphasis_applied: false,
                truncated: true,
            };
        }
    }

    debug!("truncation exhausted; emitting ellipsis-only line");
    let mut line = Line::default();
    line.runs.push(StyledRun::plain(ELLIPSIS));
    FitResult {
        font_size: size,
        lines: vec![line],
        emphasis_applied: false,
        truncated: true,
    }
}

/// Convert a fit result into absolute draw commands.
///
/// Content commands carry the quote runs; chrome commands carry the two
/// right-aligned footer lines (author above title) pinned to the canvas
/// bottom at the secondary size.
pub fn compose_page(
    fit: &FitResult,
    record: &QuoteRecord,
    cfg: &EngineConfig,
    measurer: &dyn TextMeasurer,
) -> QuotePage {
    let mut page = QuotePage::default();
    let line_advance = (fit.font_size + cfg.fonts.line_gap) as i32;
    let mut y = cfg.canvas.padding;

    for line in &fit.lines {
        let mut x = cfg.canvas.padding as f32;
        for run in &line.runs {
            let weight = FontWeight::for_run(run);
            let width = measurer.measure_px(&run.text, fit.font_size, weight);
            page.content_commands.push(TextCommand {
                x: x.round() as i32,
                y,
                text: run.text.clone(),
                size_px: fit.font_size,
                weight,
            });
            x += width;
        }
        y += line_advance;
    }

    let secondary = cfg.fonts.secondary_size;
    let footer_line = measurer.line_height_px(secondary);
    let title_y = cfg.canvas.height as i32 - cfg.canvas.padding - footer_line;
    let author_y = title_y - cfg.canvas.footer_gap - footer_line;
    for (text, footer_y) in [(&record.author, author_y), (&record.title, title_y)] {
        let width = measurer.measure_px(text, secondary, FontWeight::Regular);
        page.chrome_commands.push(TextCommand {
            x: cfg.canvas.width as i32 - cfg.canvas.padding - width.round() as i32,
            y: footer_y,
            text: text.clone(),
            size_px: secondary,
            weight: FontWeight::Regular,
        });
    }

    page
}

/// Advisory per-record signals, returned by value and merged by the caller.
fn collect_diagnostics(
    record: &QuoteRecord,
    marked: &MarkedText,
    page: &QuotePage,
) -> Vec<QuoteDiagnostic> {
    let mut out = Vec::new();
    if !marked.matched() && phrase_occurs(&record.text, &record.target_phrase) {
        out.push(QuoteDiagnostic::MatchExpectedButAbsent);
    }
    if marked.matched() && !page.draws_emphasis() {
        out.push(QuoteDiagnostic::EmphasisLostInRender);
    }
    out
}

/// Fully composed output for one record.
#[derive(Clone, Debug, PartialEq)]
pub struct ComposedQuote {
    /// Fit-search outcome.
    pub fit: FitResult,
    /// Draw commands for the canvas.
    pub page: QuotePage,
    /// Advisory diagnostics for audit.
    pub diagnostics: Vec<QuoteDiagnostic>,
}

/// Orchestrates match, fit, and layout for quote records.
#[derive(Clone)]
pub struct QuoteEngine {
    cfg: EngineConfig,
    measurer: Option<Arc<dyn TextMeasurer>>,
}

impl fmt::Debug for QuoteEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuoteEngine")
            .field("cfg", &self.cfg)
            .field("has_text_measurer", &self.measurer.is_some())
            .finish()
    }
}

impl QuoteEngine {
    /// Create an engine for the given configuration.
    pub fn new(cfg: EngineConfig) -> Self {
        Self {
            cfg,
            measurer: None,
        }
    }

    /// Install a shared backend measurer so wrap decisions match the draw
    /// model.
    pub fn with_text_measurer(mut self, measurer: Arc<dyn TextMeasurer>) -> Self {
        self.measurer = Some(measurer);
        self
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    fn measurer(&self) -> &dyn TextMeasurer {
        self.measurer.as_deref().unwrap_or(&CHAR_ESTIMATE)
    }

    /// Height budget available to the quote block: canvas height minus the
    /// footer block and paddings.
    pub fn available_height(&self) -> i32 {
        let canvas = &self.cfg.canvas;
        let footer_line = self.measurer().line_height_px(self.cfg.fonts.secondary_size);
        let footer_block = 2 * footer_line + canvas.footer_gap + 2 * canvas.padding;
        canvas.height as i32 - footer_block - canvas.padding
    }

    /// Compose one record into a page plus diagnostics.
    ///
    /// Never fails: matching, fitting, and truncation all degrade rather
    /// than abort.
    pub fn compose(&self, record: &QuoteRecord) -> ComposedQuote {
        let marked = mark_phrase(&record.text, &record.target_phrase);
        let fit = fit_text(
            &marked,
            self.measurer(),
            &self.cfg.fonts,
            self.cfg.canvas.max_text_width(),
            self.available_height(),
        );
        let page = compose_page(&fit, record, &self.cfg, self.measurer());
        let diagnostics = collect_diagnostics(record, &marked, &page);
        ComposedQuote {
            fit,
            page,
            diagnostics,
        }
    }

    /// Compose a batch in input order.
    ///
    /// Records are independent; callers may shard this freely as long as the
    /// measurer is shared read-only.
    pub fn compose_all(&self, records: &[QuoteRecord]) -> Vec<ComposedQuote> {
        records.iter().map(|record| self.compose(record)).collect()
    }
}
