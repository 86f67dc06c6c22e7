//! The chat session.
//!
//! `SessionController` owns the history, the layout output, the scroll state
//! and both spark animators, and reacts to one `SessionEvent` at a time. Each
//! event runs to completion, rebuild included, before the next one is
//! handled. Side effects that belong to the host (starting dictation, leaving
//! the session) come back as `Effects`.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::animation::{SparkSize, SpriteAnimator};
use crate::context::AppContext;
use crate::layout::{Footer, GapPolicy, Layout, LayoutEngine, LayoutMetrics, TextMeasurer};
use crate::protocol::{encode_request, OutboundRequest};
use crate::scroll::ScrollController;
use crate::store::{MessageStore, Role};
use crate::stream::{DeliveryMode, StreamAssembler, StreamInput, StreamState};
use crate::timer::{TimerHandle, Timers};
use crate::transport::Transport;

/// Frame the empty-state spark shows.
pub const EMPTY_STATE_FRAME: usize = 4;

/// Prompt shown instead of the conversation when the history is empty.
pub const EMPTY_STATE_PROMPT: &str = "How can\nI help you?";

/// What distinguishes the two product variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Back clears the history (or leaves when empty); up/down scroll
    /// manually; an empty history shows the empty-state prompt.
    pub has_back_navigation: bool,
    /// Dictation opens as soon as the session does; a trailing user turn
    /// leaves a gap for the reply.
    pub auto_start_dictation: bool,
    pub delivery_mode: DeliveryMode,
}

impl Capabilities {
    pub fn browse() -> Self {
        Self {
            has_back_navigation: true,
            auto_start_dictation: false,
            delivery_mode: DeliveryMode::Chunked,
        }
    }

    pub fn quick_launch() -> Self {
        Self {
            has_back_navigation: false,
            auto_start_dictation: true,
            delivery_mode: DeliveryMode::WholeText,
        }
    }

    pub fn shows_empty_state(&self) -> bool {
        self.has_back_navigation
    }

    pub fn gap_policy(&self, metrics: &LayoutMetrics) -> GapPolicy {
        if self.auto_start_dictation {
            GapPolicy::AfterUserTurn(metrics.trailing_gap)
        } else {
            GapPolicy::Never
        }
    }

    /// Whether a failed dictation on an empty history ends the session.
    pub fn exits_on_empty_dictation_failure(&self) -> bool {
        !self.has_back_navigation
    }
}

/// Identifies one dictation request handed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DictationId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationResult {
    Transcribed(String),
    Failed,
    Cancelled,
}

/// Everything the session reacts to, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    UserSubmitted(String),
    InboundChunk(String),
    InboundComplete(String),
    InboundEnd,
    TimerFired(TimerHandle),
    DictationResult {
        id: DictationId,
        result: DictationResult,
    },
    /// Dictate button.
    Select,
    Back,
    ScrollUp,
    ScrollDown,
    Resize {
        width: i32,
        viewport_height: i32,
    },
}

/// Work the host has to carry out after an event.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Effects {
    pub start_dictation: Option<DictationId>,
    pub exit: bool,
}

/// Which action-bar icons are live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionBar {
    pub dictate: bool,
    pub scroll: bool,
}

pub struct SessionController {
    caps: Capabilities,
    store: MessageStore,
    assembler: StreamAssembler,
    engine: LayoutEngine,
    footer: Footer,
    empty_spark: SpriteAnimator,
    scroll: ScrollController,
    layout: Layout,
    timers: Timers,
    transport: Box<dyn Transport>,
    width: i32,
    pending_dictation: Option<DictationId>,
    next_dictation: u64,
}

impl SessionController {
    pub fn new(
        ctx: &AppContext,
        caps: Capabilities,
        measurer: Box<dyn TextMeasurer>,
        metrics: LayoutMetrics,
        transport: Box<dyn Transport>,
        width: i32,
        viewport_height: i32,
    ) -> Self {
        let mut timers = Timers::new();
        let engine = LayoutEngine::new(measurer, metrics, caps.gap_policy(&metrics), caps.shows_empty_state());
        let footer = Footer::new(ctx, &engine, width, &mut timers);

        let mut empty_spark = SpriteAnimator::new(ctx.sequences(), SparkSize::Large);
        empty_spark.set_frame(EMPTY_STATE_FRAME, &mut timers);

        let mut session = Self {
            caps,
            store: MessageStore::new(),
            assembler: StreamAssembler::new(caps.delivery_mode),
            engine,
            footer,
            empty_spark,
            scroll: ScrollController::new(viewport_height, metrics.scroll_step),
            layout: Layout::Empty,
            timers,
            transport,
            width,
            pending_dictation: None,
            next_dictation: 0,
        };
        session.rebuild();
        session
    }

    /// Called once the session is on screen.
    pub fn open(&mut self) -> Effects {
        let mut effects = Effects::default();
        if self.caps.auto_start_dictation {
            effects.start_dictation = self.begin_dictation();
        }
        effects
    }

    // -- accessors -----------------------------------------------------------

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn scroll(&self) -> &ScrollController {
        &self.scroll
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        self.engine.metrics()
    }

    pub fn footer(&self) -> &Footer {
        &self.footer
    }

    pub fn empty_spark(&self) -> &SpriteAnimator {
        &self.empty_spark
    }

    pub fn stream_state(&self) -> StreamState {
        self.assembler.state()
    }

    pub fn is_awaiting(&self) -> bool {
        self.assembler.is_awaiting()
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn pending_dictation(&self) -> Option<DictationId> {
        self.pending_dictation
    }

    pub fn action_bar(&self) -> ActionBar {
        ActionBar {
            dictate: !self.assembler.is_awaiting(),
            scroll: self.caps.has_back_navigation && !self.store.is_empty(),
        }
    }

    pub fn next_timer_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    // -- events --------------------------------------------------------------

    /// Deliver every timer due at `now`. Returns `true` if a spark needs to
    /// be redrawn.
    pub fn fire_due_timers(&mut self, now: Instant) -> bool {
        for handle in self.timers.take_expired(now) {
            self.handle_event(SessionEvent::TimerFired(handle));
        }
        self.take_spark_dirty()
    }

    /// Returns `true` once per visible spark change since the last call.
    pub fn take_spark_dirty(&mut self) -> bool {
        let footer = self.footer.spark_mut().take_dirty();
        let empty = self.empty_spark.take_dirty();
        footer || empty
    }

    /// The host abandoned the pending dictation; its result, if it still
    /// arrives, is dropped.
    pub fn cancel_dictation(&mut self) {
        if let Some(id) = self.pending_dictation.take() {
            debug!(?id, "dictation cancelled by host");
        }
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> Effects {
        let mut effects = Effects::default();
        match event {
            SessionEvent::UserSubmitted(text) => self.submit(&text),
            SessionEvent::InboundChunk(text) => self.apply_stream(StreamInput::Chunk(&text)),
            SessionEvent::InboundComplete(text) => self.apply_stream(StreamInput::Complete(&text)),
            SessionEvent::InboundEnd => self.apply_stream(StreamInput::End),
            SessionEvent::TimerFired(handle) => {
                let consumed = self.footer.spark_mut().on_timer_fire(handle, &mut self.timers)
                    || self.empty_spark.on_timer_fire(handle, &mut self.timers);
                if !consumed {
                    debug!(?handle, "timer for stopped animation ignored");
                }
            }
            SessionEvent::DictationResult { id, result } => {
                effects.exit = self.on_dictation(id, result);
            }
            SessionEvent::Select => {
                effects.start_dictation = self.select();
            }
            SessionEvent::Back => {
                effects.exit = self.back();
            }
            SessionEvent::ScrollUp => {
                if self.caps.has_back_navigation {
                    self.scroll.scroll_up();
                }
            }
            SessionEvent::ScrollDown => {
                if self.caps.has_back_navigation {
                    self.scroll.scroll_down();
                }
            }
            SessionEvent::Resize {
                width,
                viewport_height,
            } => {
                self.width = width;
                self.scroll.set_viewport_height(viewport_height);
                self.rebuild();
            }
        }
        effects
    }

    // -- internals -----------------------------------------------------------

    fn submit(&mut self, text: &str) {
        self.store.append(Role::User, text);
        self.rebuild();
        self.scroll.scroll_to_bottom();
        self.send_request();
    }

    fn send_request(&mut self) {
        let encoded = encode_request(&self.store);
        let bytes = encoded.len();
        let payload = match OutboundRequest::new(encoded).to_json() {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "failed to serialize chat request");
                return;
            }
        };

        match self.transport.send(&payload) {
            Ok(()) => {
                debug!(bytes, turns = self.store.len(), "sent chat request");
                self.assembler.mark_sent();
                self.footer.start_animation(&mut self.timers);
            }
            Err(e) => {
                // The user turn stays in the history; nothing is rolled back.
                warn!(error = %e, "failed to send chat request");
            }
        }
    }

    fn apply_stream(&mut self, input: StreamInput<'_>) {
        let outcome = self.assembler.apply(&mut self.store, input);
        if outcome.rebuild {
            self.rebuild();
        }
        if outcome.scroll_to_bottom {
            self.scroll.scroll_to_bottom();
        }
        if outcome.finished {
            self.footer.stop_animation(&mut self.timers);
        }
    }

    fn select(&mut self) -> Option<DictationId> {
        if self.assembler.is_awaiting() {
            debug!("dictation refused while awaiting a response");
            return None;
        }
        if self.pending_dictation.is_some() {
            debug!("dictation already in progress");
            return None;
        }
        self.begin_dictation()
    }

    fn begin_dictation(&mut self) -> Option<DictationId> {
        self.next_dictation += 1;
        let id = DictationId(self.next_dictation);
        self.pending_dictation = Some(id);
        Some(id)
    }

    /// Returns `true` if the session should exit.
    fn on_dictation(&mut self, id: DictationId, result: DictationResult) -> bool {
        if self.pending_dictation != Some(id) {
            debug!(?id, "result for abandoned dictation ignored");
            return false;
        }
        self.pending_dictation = None;

        match result {
            DictationResult::Transcribed(text) if !text.trim().is_empty() => {
                self.submit(&text);
                false
            }
            other => {
                debug!(result = ?other, "dictation produced no text");
                self.store.is_empty() && self.caps.exits_on_empty_dictation_failure()
            }
        }
    }

    /// Returns `true` if the session should exit.
    fn back(&mut self) -> bool {
        if !self.caps.has_back_navigation {
            return false;
        }
        if self.store.is_empty() {
            return true;
        }

        info!(turns = self.store.len(), "clearing chat history");
        self.store.clear();
        self.assembler.reset();
        self.footer.stop_animation(&mut self.timers);
        self.rebuild();
        self.scroll.scroll_to_top();
        false
    }

    fn rebuild(&mut self) {
        let saved = self.scroll.offset();
        self.layout = self.engine.rebuild(&self.store, &self.footer, self.width);
        self.scroll.restore(self.layout.content_height(), saved);
    }
}
