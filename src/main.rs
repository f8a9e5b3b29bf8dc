//! `nlui-client`: send one chat turn and print the streamed answer.
//!
//! ```text
//! nlui-client [--conversation <id>] [--yes] <message>...
//! ```
//!
//! Server and credentials come from `NLUI_BASE_URL` / `NLUI_API_KEY`.
//! Tools that need confirmation are denied unless `--yes` is given.
//! Ctrl+C cancels the turn.

use std::io::Write;

use color_eyre::eyre::eyre;
use color_eyre::Result;

use nlui_client::logging::init_logging;
use nlui_client::prelude::*;

const VERSION: &str = env!("CARGO_PKG_VERSION");

struct Args {
    conversation_id: Option<String>,
    approve_tools: bool,
    message: String,
}

fn parse_args() -> Result<Args> {
    let mut conversation_id = None;
    let mut approve_tools = false;
    let mut words = Vec::new();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--conversation" | "-c" => {
                conversation_id = Some(
                    args.next()
                        .ok_or_else(|| eyre!("--conversation needs an id"))?,
                );
            }
            "--yes" | "-y" => approve_tools = true,
            _ => words.push(arg),
        }
    }

    if words.is_empty() {
        return Err(eyre!(
            "usage: nlui-client [--conversation <id>] [--yes] <message>..."
        ));
    }
    Ok(Args {
        conversation_id,
        approve_tools,
        message: words.join(" "),
    })
}

/// Prints deltas as they arrive and tool activity on stderr. Call errors
/// are reported once by `main`.
fn render(event: &ChatEvent) {
    match event.kind() {
        EventKind::ContentDelta => {
            if let Some(delta) = event.delta() {
                print!("{}", delta);
                let _ = std::io::stdout().flush();
            }
        }
        EventKind::ToolCall => {
            eprintln!("\n[tool] {}", event.tool_name().unwrap_or("?"));
        }
        EventKind::Error => {
            eprintln!("\n[server] {}", event.error_message().unwrap_or("unknown error"));
        }
        _ => {}
    }
}

/// Answer a `tool_confirm` event so the server-side turn can continue.
async fn answer_confirm(client: &NluiClient, event: &ChatEvent, approve: bool) -> Result<()> {
    let tool = event.tool_name().unwrap_or("?");
    let session_id = event
        .session_id()
        .ok_or_else(|| eyre!("confirmation for {} carried no session id", tool))?;

    if approve {
        eprintln!("\n[confirm] {} approved", tool);
    } else {
        eprintln!("\n[confirm] {} denied (pass --yes to allow)", tool);
    }
    client.confirm_tool(session_id, approve).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().any(|arg| arg == "--version") {
        println!("nlui-client {}", VERSION);
        return Ok(());
    }

    color_eyre::install()?;
    init_logging();

    let args = parse_args()?;
    let client = NluiClient::from_env()?;

    let cancel = CancelHandle::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let (sink, mut rx) = ChannelSink::channel();
    let client = &client;
    let call = async {
        let mut sink = sink;
        client
            .chat(
                &args.message,
                args.conversation_id.as_deref(),
                &mut sink,
                Some(&cancel),
            )
            .await
    };
    let consume = async {
        while let Some(message) = rx.recv().await {
            if let StreamMessage::Event(event) = message {
                if event.kind() == EventKind::ToolConfirm {
                    if let Err(err) = answer_confirm(client, &event, args.approve_tools).await {
                        eprintln!("\n[confirm] failed: {}", err);
                    }
                } else {
                    render(&event);
                }
            }
        }
    };
    let (outcome, ()) = tokio::join!(call, consume);
    let completion = outcome?;

    println!();
    if let Some(id) = completion.conversation_id {
        eprintln!("conversation: {}", id);
    }
    Ok(())
}
