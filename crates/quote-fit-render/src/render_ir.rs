use core::fmt;

use quote_fit::StyledRun;
use serde::Serialize;
use smallvec::SmallVec;

/// Font weight requested for a draw or measurement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    /// Base weight.
    #[default]
    Regular,
    /// Emphasis weight.
    Bold,
}

impl FontWeight {
    /// Weight used to draw and measure a styled run.
    pub fn for_run(run: &StyledRun) -> Self {
        if run.emphasized {
            Self::Bold
        } else {
            Self::Regular
        }
    }
}

/// Text draw command.
///
/// `x`/`y` address the top-left corner of the fragment on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct TextCommand {
    /// Left x.
    pub x: i32,
    /// Top y.
    pub y: i32,
    /// Fragment content.
    pub text: String,
    /// Font size in pixels.
    pub size_px: u32,
    /// Requested weight.
    pub weight: FontWeight,
}

/// One composed quote canvas as backend-agnostic draw commands.
///
/// Content and chrome layers mirror their roles: content holds the fitted
/// quote runs, chrome holds the footer lines. The page owns no pixels;
/// backends execute it against their own draw target.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuotePage {
    /// Quote-run draw commands in reading order.
    pub content_commands: Vec<TextCommand>,
    /// Footer draw commands (author, then title).
    pub chrome_commands: Vec<TextCommand>,
}

impl QuotePage {
    /// Iterate content then chrome commands without allocating.
    pub fn commands_iter(&self) -> impl Iterator<Item = &TextCommand> {
        self.content_commands.iter().chain(self.chrome_commands.iter())
    }

    /// Whether any emphasized non-whitespace fragment would be drawn.
    pub fn draws_emphasis(&self) -> bool {
        self.content_commands.iter().any(|cmd| {
            cmd.weight == FontWeight::Bold && !cmd.text.chars().all(char::is_whitespace)
        })
    }
}

/// One wrapped line of styled runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Line {
    /// Runs in visual order, trailing whitespace included.
    pub runs: SmallVec<[StyledRun; 8]>,
}

impl Line {
    /// Concatenated fragment text of the line.
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// Outcome of the fit search for one quote.
///
/// Computed fresh per record; never cached, never mutated after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct FitResult {
    /// Chosen font size in pixels.
    pub font_size: u32,
    /// Wrapped lines at that size.
    pub lines: Vec<Line>,
    /// True iff some emphasized non-whitespace run survived into the lines.
    pub emphasis_applied: bool,
    /// True when the word-dropping fallback produced this result.
    pub truncated: bool,
}

impl FitResult {
    /// Compact serializable summary for audit logs.
    pub fn summary(&self) -> FitSummary {
        FitSummary {
            font_size: self.font_size,
            line_count: self.lines.len(),
            emphasis_applied: self.emphasis_applied,
            truncated: self.truncated,
        }
    }
}

/// Serializable fit outcome for post-hoc audit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FitSummary {
    pub font_size: u32,
    pub line_count: usize,
    pub emphasis_applied: bool,
    pub truncated: bool,
}

impl FitSummary {
    /// JSON form used by audit sinks.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Advisory per-record diagnostic; never fatal, never alters generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteDiagnostic {
    /// The normalized phrase occurs in the normalized text, yet no marker
    /// was placed (boundary rules rejected every occurrence).
    MatchExpectedButAbsent,
    /// A marker was placed but no emphasized non-whitespace fragment was
    /// drawn (truncation fallback, or an emphasized run collapsing to
    /// whitespace).
    EmphasisLostInRender,
}

impl QuoteDiagnostic {
    /// Stable string tag used by audit sinks.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MatchExpectedButAbsent => "match_expected_but_absent",
            Self::EmphasisLostInRender => "emphasis_lost_in_render",
        }
    }
}

impl fmt::Display for QuoteDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed canvas geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Uniform padding inset.
    pub padding: i32,
    /// Gap between the two footer lines.
    pub footer_gap: i32,
}

impl CanvasConfig {
    /// Geometry for a target display size with default insets.
    pub fn for_display(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Maximum line width available to the quote block.
    pub fn max_text_width(&self) -> f32 {
        (self.width as i32 - 2 * self.padding).max(1) as f32
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            padding: 30,
            footer_gap: 10,
        }
    }
}

/// Font-size ladder and spacing constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontConfig {
    /// Largest size tried by the fit search.
    pub initial_size: u32,
    /// Smallest size tried; also the truncation-fallback size.
    pub min_size: u32,
    /// Ladder step.
    pub decrement: u32,
    /// Footer font size, outside the fit search.
    pub secondary_size: u32,
    /// Extra pixels between lines.
    pub line_gap: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            initial_size: 30,
            min_size: 16,
            decrement: 2,
            secondary_size: 24,
            line_gap: 5,
        }
    }
}

/// Full engine configuration, passed explicitly into every call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Canvas geometry.
    pub canvas: CanvasConfig,
    /// Font ladder and spacing.
    pub fonts: FontConfig,
}

impl EngineConfig {
    /// Configuration for a target display size.
    pub fn for_display(width: u32, height: u32) -> Self {
        Self {
            canvas: CanvasConfig::for_display(width, height),
            fonts: FontConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_tags_are_stable() {
        assert_eq!(
            QuoteDiagnostic::MatchExpectedButAbsent.to_string(),
            "match_expected_but_absent"
        );
        assert_eq!(
            QuoteDiagnostic::EmphasisLostInRender.as_str(),
            "emphasis_lost_in_render"
        );
    }

    #[test]
    fn fit_summary_serializes_for_audit() {
        let summary = FitSummary {
            font_size: 22,
            line_count: 4,
            emphasis_applied: true,
            truncated: false,
        };
        let json = summary.to_json().unwrap();
        assert!(json.contains("\"font_size\":22"));
        assert!(json.contains("\"truncated\":false"));
    }

    #[test]
    fn default_geometry_matches_display_constants() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.canvas.width, 800);
        assert_eq!(cfg.canvas.height, 480);
        assert_eq!(cfg.canvas.max_text_width(), 740.0);
        assert_eq!(cfg.fonts.initial_size, 30);
        assert_eq!(cfg.fonts.min_size, 16);
    }
}
