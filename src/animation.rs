//! Spark animation.
//!
//! A `SpriteAnimator` steps through a shared, immutable `FrameSequence`,
//! holding each frame for that frame's own duration. Timing comes from a
//! [`TimerService`]; the animator only keeps the handle of its pending timer
//! so a fire for any other handle is recognised as stale and ignored.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::ChatError;
use crate::timer::{TimerHandle, TimerService};

// ---------------------------------------------------------------------------
// Frame sequences
// ---------------------------------------------------------------------------

/// Which of the two preloaded sequences an animator draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SparkSize {
    Small,
    Large,
}

/// One frame: the lines to draw and how long to hold them.
#[derive(Debug, Clone, Deserialize)]
pub struct SpriteFrame {
    pub duration_ms: u16,
    pub glyph: Vec<String>,
}

/// An ordered, non-empty list of frames with per-frame durations.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawSequence")]
pub struct FrameSequence {
    /// Bounding box shared by all frames, in cells.
    pub width: u16,
    pub height: u16,
    frames: Vec<SpriteFrame>,
}

/// Sequence as stored in the asset files, before validation.
#[derive(Deserialize)]
struct RawSequence {
    width: u16,
    height: u16,
    frames: Vec<SpriteFrame>,
}

impl TryFrom<RawSequence> for FrameSequence {
    type Error = ChatError;

    fn try_from(raw: RawSequence) -> Result<Self, Self::Error> {
        Self::from_frames(raw.width, raw.height, raw.frames)
    }
}

impl FrameSequence {
    pub fn from_json(json: &str) -> Result<Self, ChatError> {
        let raw: RawSequence = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    pub fn from_frames(width: u16, height: u16, frames: Vec<SpriteFrame>) -> Result<Self, ChatError> {
        if frames.is_empty() {
            return Err(ChatError::Sequence("sequence has no frames".into()));
        }
        Ok(Self {
            width,
            height,
            frames,
        })
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, index: usize) -> &SpriteFrame {
        &self.frames[index % self.frames.len()]
    }

    pub fn duration(&self, index: usize) -> Duration {
        Duration::from_millis(u64::from(self.frame(index).duration_ms))
    }
}

/// The small and large spark sequences, loaded once and shared read-only.
#[derive(Debug, Clone)]
pub struct SparkSequences {
    small: Arc<FrameSequence>,
    large: Arc<FrameSequence>,
}

impl SparkSequences {
    pub fn new(small: FrameSequence, large: FrameSequence) -> Self {
        Self {
            small: Arc::new(small),
            large: Arc::new(large),
        }
    }

    pub fn get(&self, size: SparkSize) -> &Arc<FrameSequence> {
        match size {
            SparkSize::Small => &self.small,
            SparkSize::Large => &self.large,
        }
    }
}

// ---------------------------------------------------------------------------
// Animator
// ---------------------------------------------------------------------------

pub struct SpriteAnimator {
    sequences: SparkSequences,
    size: SparkSize,
    frame_index: usize,
    timer: Option<TimerHandle>,
    is_animating: bool,
    dirty: bool,
}

impl SpriteAnimator {
    // -- public API ----------------------------------------------------------

    pub fn new(sequences: &SparkSequences, size: SparkSize) -> Self {
        Self {
            sequences: sequences.clone(),
            size,
            frame_index: 0,
            timer: None,
            is_animating: false,
            dirty: true,
        }
    }

    pub fn size(&self) -> SparkSize {
        self.size
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    /// Handle of the pending frame timer, if one is scheduled.
    pub fn pending_timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    pub fn sequence(&self) -> &FrameSequence {
        self.sequences.get(self.size)
    }

    pub fn current_frame(&self) -> &SpriteFrame {
        self.sequence().frame(self.frame_index)
    }

    /// Returns `true` once per visible change.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Loop from frame 0. Does nothing if already running.
    pub fn start(&mut self, timers: &mut impl TimerService) {
        if self.is_animating {
            return;
        }
        self.is_animating = true;
        self.frame_index = 0;
        self.dirty = true;
        let delay = self.sequence().duration(0);
        self.timer = Some(timers.schedule(delay));
    }

    /// Advance one frame if `handle` is this animator's pending timer.
    /// Returns `true` if the fire was consumed.
    pub fn on_timer_fire(&mut self, handle: TimerHandle, timers: &mut impl TimerService) -> bool {
        if self.timer != Some(handle) {
            return false;
        }
        self.timer = None;
        if !self.is_animating {
            debug!("stale spark timer ignored");
            return false;
        }

        self.frame_index = (self.frame_index + 1) % self.sequence().num_frames();
        self.dirty = true;

        let delay = self.sequence().duration(self.frame_index);
        self.timer = Some(timers.schedule(delay));
        true
    }

    /// Stop and keep showing the current frame.
    pub fn stop(&mut self, timers: &mut impl TimerService) {
        self.is_animating = false;
        if let Some(handle) = self.timer.take() {
            timers.cancel(handle);
        }
    }

    /// Stop and show frame `index` (wrapped to the sequence length).
    pub fn set_frame(&mut self, index: usize, timers: &mut impl TimerService) {
        self.stop(timers);
        self.frame_index = index % self.sequence().num_frames();
        self.dirty = true;
    }

    /// Switch between the small and large sequence.
    pub fn set_size(&mut self, size: SparkSize, timers: &mut impl TimerService) {
        if self.is_animating {
            self.stop(timers);
            self.size = size;
            self.start(timers);
        } else {
            self.size = size;
            let last = self.sequence().num_frames() - 1;
            self.frame_index = self.frame_index.min(last);
            self.dirty = true;
        }
    }
}
