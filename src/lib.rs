//! Chat session engine for a small-screen assistant client.
//!
//! The library holds everything that does not touch the terminal or the
//! network: bounded history, request encoding, reply assembly, flow layout,
//! scrolling, the spark animation and the `SessionController` tying them
//! together. The `spark-chat` binary supplies a ratatui host and a websocket
//! bridge.

pub mod animation;
pub mod config;
pub mod context;
pub mod error;
pub mod layout;
pub mod measure;
pub mod protocol;
pub mod scroll;
pub mod session;
pub mod store;
pub mod stream;
pub mod timer;
pub mod transport;
