mod app;
mod gateway;
mod input;
mod state;
mod theme;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use spark_chat::config::{self, LaunchMode};

#[derive(Parser, Debug)]
#[command(name = "spark-chat", version, about = "Talk to the assistant from a tiny chat window")]
struct Cli {
    /// Start in quick-launch mode (dictation opens immediately)
    #[arg(long)]
    quick: bool,

    /// Config file to use instead of the default search path
    #[arg(long, env = "SPARK_CHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Bridge websocket URL (overrides the config file)
    #[arg(long)]
    bridge: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to a file so they don't corrupt the TUI
    let log_dir = dirs::home_dir()
        .map(|h| h.join(".spark-chat/logs"))
        .unwrap_or_else(|| "/tmp".into());
    std::fs::create_dir_all(&log_dir).ok();

    let log_file = std::fs::File::create(log_dir.join("terminal.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    let mut config = config::load(cli.config.as_deref());
    if cli.quick {
        config.session.mode = LaunchMode::Quick;
    }
    if let Some(url) = cli.bridge {
        config.bridge.url = url;
    }

    app::run(config).await
}
