use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{Event as CEvent, EventStream, KeyEventKind};
use futures_util::StreamExt;
use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tracing::{debug, info};

use spark_chat::config::SparkConfig;
use spark_chat::context::AppContext;
use spark_chat::measure::CellMeasurer;
use spark_chat::protocol::InboundEvent;
use spark_chat::session::{SessionController, SessionEvent};
use spark_chat::transport::ChannelTransport;

use crate::gateway::{self, BridgeEvent};
use crate::input::{self, InputAction};
use crate::state::{AppState, ConnectionState};
use crate::theme::ThemeColors;
use crate::ui;

pub async fn run(config: SparkConfig) -> anyhow::Result<()> {
    let caps = config.capabilities();
    let theme = ThemeColors::by_name(&config.theme.name);
    let ctx = AppContext::load()?;
    info!(?caps, bridge = %config.bridge.url, "starting spark-chat");

    // Bridge channels
    let connected = Arc::new(AtomicBool::new(false));
    let (bridge_tx, mut bridge_rx) = mpsc::unbounded_channel::<BridgeEvent>();
    let (out_tx, out_rx) = mpsc::unbounded_channel::<String>();

    // Spawn the bridge connection
    let bridge_url = config.bridge.url.clone();
    let flag = connected.clone();
    tokio::spawn(async move {
        gateway::connect(bridge_url, bridge_tx, out_rx, flag).await;
    });

    // Setup terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    let size = terminal.size()?;
    let chat = ui::chat_area(Rect::new(0, 0, size.width, size.height));
    let session = SessionController::new(
        &ctx,
        caps,
        Box::new(CellMeasurer::terminal()),
        config.layout,
        Box::new(ChannelTransport::new(out_tx, connected)),
        i32::from(chat.width),
        i32::from(chat.height),
    );
    let mut state = AppState::new(session);
    let effects = state.session.open();
    state.apply(effects);

    // Crossterm event stream
    let mut reader = EventStream::new();

    // Main event loop: redraw after input, bridge traffic, or a spark frame
    let mut redraw = true;
    loop {
        if redraw {
            terminal.draw(|f| {
                ui::render(f, &state, &theme);
            })?;
            state.session.take_spark_dirty();
            redraw = false;
        }

        if state.should_quit {
            break;
        }

        let deadline = state.session.next_timer_deadline();

        tokio::select! {
            // Terminal events
            maybe_event = reader.next() => {
                redraw = true;
                match maybe_event {
                    Some(Ok(CEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                        match input::handle_key(key, &mut state) {
                            InputAction::Session(event) => state.dispatch(event),
                            InputAction::Quit => state.should_quit = true,
                            InputAction::None => {}
                        }
                    }
                    Some(Ok(CEvent::Resize(width, height))) => {
                        let chat = ui::chat_area(Rect::new(0, 0, width, height));
                        state.dispatch(SessionEvent::Resize {
                            width: i32::from(chat.width),
                            viewport_height: i32::from(chat.height),
                        });
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        info!(error = %e, "terminal event stream failed");
                        state.should_quit = true;
                    }
                    None => state.should_quit = true,
                }
            }

            // Bridge events
            Some(event) = bridge_rx.recv() => {
                handle_bridge_event(event, &mut state);
                redraw = true;
            }

            // Spark frame timers
            _ = sleep_until(deadline) => {
                redraw = state.session.fire_due_timers(Instant::now());
            }
        }
    }

    // Restore terminal
    ratatui::restore();
    Ok(())
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at.into()).await,
        None => std::future::pending().await,
    }
}

fn handle_bridge_event(event: BridgeEvent, state: &mut AppState) {
    match event {
        BridgeEvent::Connected => {
            state.connection = ConnectionState::Connected;
        }
        BridgeEvent::Disconnected => {
            state.connection = ConnectionState::Disconnected;
        }
        BridgeEvent::Inbound(message) => {
            for inbound in message.into_events() {
                let event = match inbound {
                    InboundEvent::ReadyStatus(ready) => {
                        state.set_ready(ready);
                        continue;
                    }
                    InboundEvent::Chunk(text) => SessionEvent::InboundChunk(text),
                    InboundEvent::Complete(text) => SessionEvent::InboundComplete(text),
                    InboundEvent::End => SessionEvent::InboundEnd,
                };
                debug!(?event, "bridge event");
                state.dispatch(event);
            }
        }
    }
}
