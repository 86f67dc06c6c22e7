use tracing::info;

use spark_chat::session::{DictationId, Effects, SessionController, SessionEvent};

/// Connection status with the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

/// Open dictation: the single-line text box standing in for speech input.
#[derive(Debug)]
pub struct Composer {
    pub id: DictationId,
    pub input: String,
    pub cursor_pos: usize,
}

impl Composer {
    pub fn new(id: DictationId) -> Self {
        Self {
            id,
            input: String::new(),
            cursor_pos: 0,
        }
    }
}

/// Everything the terminal host tracks around the session.
pub struct AppState {
    pub session: SessionController,
    /// Bridge reports the assistant as configured. Assumed until told
    /// otherwise.
    pub ready: bool,
    pub connection: ConnectionState,
    pub composer: Option<Composer>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(session: SessionController) -> Self {
        Self {
            session,
            ready: true,
            connection: ConnectionState::Connecting,
            composer: None,
            should_quit: false,
        }
    }

    /// Feed one event to the session and carry out what it asks for.
    pub fn dispatch(&mut self, event: SessionEvent) {
        let effects = self.session.handle_event(event);
        self.apply(effects);
    }

    pub fn apply(&mut self, effects: Effects) {
        if let Some(id) = effects.start_dictation {
            self.composer = Some(Composer::new(id));
        }
        if effects.exit {
            info!("session requested exit");
            self.should_quit = true;
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        if self.ready != ready {
            info!(ready, "bridge ready status changed");
            self.ready = ready;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use spark_chat::context::AppContext;
    use spark_chat::layout::LayoutMetrics;
    use spark_chat::measure::CellMeasurer;
    use spark_chat::session::Capabilities;
    use spark_chat::transport::ChannelTransport;

    use super::*;

    /// A 40x20 session whose bridge is down.
    pub(crate) fn test_state(caps: Capabilities) -> AppState {
        let ctx = AppContext::load().unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let transport = ChannelTransport::new(tx, Arc::new(AtomicBool::new(false)));
        let session = SessionController::new(
            &ctx,
            caps,
            Box::new(CellMeasurer::terminal()),
            LayoutMetrics::terminal(),
            Box::new(transport),
            40,
            20,
        );
        AppState::new(session)
    }

    #[test]
    fn test_exit_effect_sets_quit() {
        let mut state = test_state(Capabilities::browse());
        state.dispatch(SessionEvent::Back);
        assert!(state.should_quit);
    }

    #[test]
    fn test_dictation_effect_opens_composer() {
        let mut state = test_state(Capabilities::browse());
        state.dispatch(SessionEvent::Select);
        let composer = state.composer.as_ref().unwrap();
        assert_eq!(Some(composer.id), state.session.pending_dictation());
        assert!(composer.input.is_empty());
    }
}
