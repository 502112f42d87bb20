mod command;
mod config;

use crate::command::{Command, HELP, WELCOME};
use crate::config::ConsoleConfig;
use rehearsal_ai::OpenAiCompatibleBackend;
use rehearsal_conversation::{DialogueService, JsonFileLog, Reply, ReplyKind};
use rehearsal_core::ConversationId;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ConsoleConfig::from_env().expect("failed to load configuration");
    tracing::info!(
        base_url = %config.llm.base_url,
        model = %config.dialogue.model,
        max_window = config.dialogue.window.max_window,
        log_dir = %config.log_dir.display(),
        "Loaded configuration"
    );

    let backend = Arc::new(
        OpenAiCompatibleBackend::new(config.llm.clone()).expect("failed to create LLM backend"),
    );
    let log = Arc::new(JsonFileLog::new(config.log_dir.clone()));
    let service = DialogueService::new(backend, log, config.dialogue.clone());
    let conversation_id = ConversationId::from(config.conversation_id);

    println!("{HELP}\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read input");
                break;
            }
        };

        let reply = match Command::parse(&line) {
            Command::Blank => continue,
            Command::Quit => break,
            Command::Help => {
                println!("{HELP}\n");
                continue;
            }
            Command::Welcome => {
                println!("{WELCOME}\n");
                continue;
            }
            Command::Consent => service.on_session_start(conversation_id).await,
            Command::Reset => service.on_reset(conversation_id).await,
            Command::Feedback => {
                println!("(preparing feedback...)");
                service.on_report_request(conversation_id).await
            }
            Command::Text(text) => service.on_user_text(conversation_id, &text).await,
        };
        print_reply(&reply);
    }

    tracing::info!(conversation_id = %conversation_id, "Console session ended");
}

fn print_reply(reply: &Reply) {
    match reply.kind {
        ReplyKind::Feedback => {
            if let Some(synopsis) = &reply.synopsis {
                println!("Session synopsis:\n{synopsis}\n");
            }
            println!("Supervisor feedback:\n{}\n", reply.text);
        }
        ReplyKind::Answer => println!("client> {}\n", reply.text),
        ReplyKind::Failure => println!("! {}\n", reply.text),
        ReplyKind::Greeting | ReplyKind::Guidance => println!("{}\n", reply.text),
    }
}
