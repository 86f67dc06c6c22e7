//! Vertical flow layout of the conversation.
//!
//! Every rebuild measures all turns from scratch and stacks one bubble per
//! turn, then the optional trailing gap, then the footer. Nothing is diffed:
//! with at most ten turns the whole pass is cheap, and the result depends only
//! on the history and the width.

use serde::Deserialize;
use tracing::debug;

use crate::animation::{SparkSize, SpriteAnimator};
use crate::context::AppContext;
use crate::store::{MessageStore, Role};
use crate::timer::TimerService;

/// Static disclaimer shown in the footer.
pub const FOOTER_DISCLAIMER: &str = "Answers\ncan be\nwrong.";

/// Frame the footer spark rests on when it is not animating.
pub const FOOTER_REST_FRAME: usize = 3;

// ---------------------------------------------------------------------------
// Rendering capability
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// Bubble text.
    Message,
    /// Footer disclaimer.
    Footer,
}

/// Wrapped text with its extent. The renderer draws `lines` as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: i32,
    pub height: i32,
}

/// Word-wrapping text measurement.
pub trait TextMeasurer {
    /// Wrap `text` to `max_width` and report its extent. `None` means the
    /// text could not be laid out at all.
    fn measure(&self, text: &str, font: Font, max_width: i32) -> Option<TextBlock>;
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Pixel metrics for bubbles, the footer and scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
    /// Space around bubble text, on every side.
    pub bubble_padding: i32,
    /// Space left under a trailing user turn in the auto-dictation variant.
    pub trailing_gap: i32,
    /// Distance moved per manual scroll step.
    pub scroll_step: i32,
    pub footer_padding: i32,
    pub footer_spark_size: i32,
}

impl LayoutMetrics {
    /// Metrics of the 144 px wide watch screen.
    pub fn watch() -> Self {
        Self {
            bubble_padding: 10,
            trailing_gap: 40,
            scroll_step: 60,
            footer_padding: 10,
            footer_spark_size: 25,
        }
    }

    /// Metrics where one px is one terminal cell.
    pub fn terminal() -> Self {
        Self {
            bubble_padding: 1,
            trailing_gap: 2,
            scroll_step: 3,
            footer_padding: 1,
            footer_spark_size: 1,
        }
    }
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self::terminal()
    }
}

/// What follows the last bubble before the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapPolicy {
    /// Leave `gap` px free when the last turn is a user turn.
    AfterUserTurn(i32),
    Never,
}

// ---------------------------------------------------------------------------
// Render artifacts
// ---------------------------------------------------------------------------

/// One laid-out turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub role: Role,
    pub y: i32,
    pub height: i32,
    pub text: TextBlock,
}

/// Persistent footer: spark on the left, disclaimer on the right.
pub struct Footer {
    height: i32,
    spark_x: i32,
    spark_y: i32,
    spark_size: i32,
    text_x: i32,
    text_y: i32,
    text: TextBlock,
    spark: SpriteAnimator,
}

impl Footer {
    /// Measure the disclaimer once at `width` and park the spark on its rest
    /// frame.
    pub fn new(ctx: &AppContext, engine: &LayoutEngine, width: i32, timers: &mut impl TimerService) -> Self {
        let m = engine.metrics();
        let padding = m.footer_padding;
        let spark_size = m.footer_spark_size;
        let text_x = padding + spark_size + padding;
        let text_width = width - text_x - padding;

        let text = engine
            .measure(FOOTER_DISCLAIMER, Font::Footer, text_width)
            .unwrap_or_default();

        let content_height = text.height.max(spark_size);
        let height = padding + content_height + padding;

        let mut spark = SpriteAnimator::new(ctx.sequences(), SparkSize::Small);
        spark.set_frame(FOOTER_REST_FRAME, timers);

        Self {
            height,
            spark_x: padding,
            spark_y: (height - spark_size) / 2,
            spark_size,
            text_x,
            text_y: (height - text.height) / 2,
            text,
            spark,
        }
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Spark box as (x, y, size), relative to the footer origin.
    pub fn spark_rect(&self) -> (i32, i32, i32) {
        (self.spark_x, self.spark_y, self.spark_size)
    }

    /// Disclaimer origin relative to the footer origin.
    pub fn text_origin(&self) -> (i32, i32) {
        (self.text_x, self.text_y)
    }

    pub fn text(&self) -> &TextBlock {
        &self.text
    }

    pub fn spark(&self) -> &SpriteAnimator {
        &self.spark
    }

    pub fn spark_mut(&mut self) -> &mut SpriteAnimator {
        &mut self.spark
    }

    pub fn start_animation(&mut self, timers: &mut impl TimerService) {
        self.spark.start(timers);
    }

    /// Stop and return to the rest frame.
    pub fn stop_animation(&mut self, timers: &mut impl TimerService) {
        self.spark.stop(timers);
        self.spark.set_frame(FOOTER_REST_FRAME, timers);
    }
}

/// Result of a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// No turns: the scroll region is hidden behind the empty-state prompt.
    Empty,
    Flow(FlowLayout),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowLayout {
    pub bubbles: Vec<Bubble>,
    /// Trailing gap actually inserted (0 when none).
    pub gap: i32,
    pub footer_y: i32,
    pub content_height: i32,
}

impl Layout {
    pub fn content_height(&self) -> i32 {
        match self {
            Layout::Empty => 0,
            Layout::Flow(flow) => flow.content_height,
        }
    }

    pub fn is_empty_state(&self) -> bool {
        matches!(self, Layout::Empty)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct LayoutEngine {
    measurer: Box<dyn TextMeasurer>,
    metrics: LayoutMetrics,
    gap: GapPolicy,
    empty_state: bool,
}

impl LayoutEngine {
    /// `empty_state` selects whether an empty history hides the scroll
    /// region (`Layout::Empty`) or still lays out the footer alone.
    pub fn new(measurer: Box<dyn TextMeasurer>, metrics: LayoutMetrics, gap: GapPolicy, empty_state: bool) -> Self {
        Self {
            measurer,
            metrics,
            gap,
            empty_state,
        }
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    pub fn gap_policy(&self) -> GapPolicy {
        self.gap
    }

    pub fn measure(&self, text: &str, font: Font, max_width: i32) -> Option<TextBlock> {
        self.measurer.measure(text, font, max_width)
    }

    /// Lay out every turn of `store` at `width`, followed by the footer.
    pub fn rebuild(&self, store: &MessageStore, footer: &Footer, width: i32) -> Layout {
        if store.is_empty() && self.empty_state {
            return Layout::Empty;
        }

        let padding = self.metrics.bubble_padding;
        let text_width = width - padding * 2;
        let mut bubbles = Vec::with_capacity(store.len());
        let mut y = 0;

        for (index, turn) in store.iter().enumerate() {
            let Some(text) = self.measurer.measure(turn.text(), Font::Message, text_width) else {
                debug!(index, width, "bubble could not be measured, skipped");
                continue;
            };
            let height = text.height + padding * 2;
            bubbles.push(Bubble {
                role: turn.role(),
                y,
                height,
                text,
            });
            y += height;
        }

        let gap = match (self.gap, store.last().map(|t| t.role())) {
            (GapPolicy::AfterUserTurn(gap), Some(Role::User)) => gap,
            _ => 0,
        };
        y += gap;

        let footer_y = y;
        y += footer.height();

        Layout::Flow(FlowLayout {
            bubbles,
            gap,
            footer_y,
            content_height: y,
        })
    }
}
