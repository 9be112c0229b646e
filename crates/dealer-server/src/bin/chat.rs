//! Terminal chat with the dealer assistant
//!
//! One session per process. `/reset` starts over, `/quit` exits.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use agent_core::{ControllerConfig, Role, SessionController, Turn, TurnKind, TurnObserver};
use dealer_server::{build_agent, config::ServerConfig, init_tracing};

/// Prints entries the moment the controller appends them
struct Printer;

impl Printer {
    fn render(turn: &Turn) -> Option<String> {
        match turn.kind {
            // Already on screen as typed
            TurnKind::Message if turn.role == Role::User => None,
            TurnKind::ToolAction { .. } => Some(format!("  {}", turn.content)),
            TurnKind::Message | TurnKind::Error => Some(format!("\nBot: {}\n", turn.content)),
        }
    }
}

impl TurnObserver for Printer {
    fn on_entry(&mut self, turn: &Turn) {
        if let Some(line) = Self::render(turn) {
            println!("{line}");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("warn");

    let config = ServerConfig::from_env()?;
    let provider = config.provider.build()?;
    let (_, agent) = build_agent(&config, Arc::clone(&provider))?;

    let controller_config: ControllerConfig = config.controller.clone();
    let mut controller = SessionController::new(agent, controller_config);

    println!("🚗 Asisten Pembelian Mobil ({} / {})", provider.name(), config.provider.model);
    println!("Ketik pertanyaan Anda. /reset untuk mulai ulang, /quit untuk keluar.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"Anda: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => {}
            "/quit" => break,
            "/reset" => {
                controller.reset();
                println!("Percakapan telah direset.\n");
            }
            input => {
                controller.submit(input, &mut Printer).await?;
            }
        }
    }

    Ok(())
}
