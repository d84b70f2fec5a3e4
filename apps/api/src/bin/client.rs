use std::io::Write;

use anyhow::Result;
use base64::Engine;
use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

use mini_ai_api::client::render::render_state;
use mini_ai_api::client::{ClientSession, ExtractApi, ExtractionClient, SubmitOutcome, ViewMode};

#[derive(Parser)]
#[command(name = "mini-ai-client")]
#[command(about = "Describe an app in plain English; get back entities, roles and features")]
#[command(version)]
struct Cli {
    /// Base URL of the extraction service
    #[arg(long, env = "MINI_AI_SERVER", default_value = "http://localhost:5050")]
    server: String,

    /// Initial result view
    #[arg(long, value_enum, default_value_t = View::Pretty)]
    view: View,

    /// App description; omit to start the interactive form
    description: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum View {
    Pretty,
    Json,
}

impl From<View> for ViewMode {
    fn from(view: View) -> Self {
        match view {
            View::Pretty => ViewMode::Pretty,
            View::Json => ViewMode::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = ExtractionClient::new(&cli.server)?;
    let mut session = ClientSession::new(client, cli.view.into());

    if cli.description.is_empty() {
        run_interactive(&mut session).await
    } else {
        let description = cli.description.join(" ");
        let outcome = session.submit(&description).await;
        print!("{}", render_state(session.state(), session.view()));
        if outcome == SubmitOutcome::Errored {
            std::process::exit(1);
        }
        Ok(())
    }
}

async fn run_interactive(session: &mut ClientSession<ExtractionClient>) -> Result<()> {
    println!("Describe an app (e.g. \"students submit homework and teachers grade it\").");
    println!("Commands: :view toggles Pretty/JSON, :copy copies the JSON, :quit exits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt(session)?;
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            ":quit" | ":q" => break,
            ":view" => {
                session.toggle_view();
                print!("{}", render_state(session.state(), session.view()));
            }
            ":copy" => match session.copy_json(Instant::now()) {
                Some(text) => {
                    copy_to_terminal_clipboard(&text)?;
                }
                None => println!("Nothing to copy yet"),
            },
            _ => {
                if session.begin_submit(&line) {
                    print!("{}", render_state(session.state(), session.view()));
                    std::io::stdout().flush()?;
                    let outcome = session.api().extract(&line).await;
                    session.finish_submit(outcome);
                    print!("{}", render_state(session.state(), session.view()));
                }
            }
        }
        prompt(session)?;
    }
    Ok(())
}

/// Redraws the controls before every prompt so an expired "Copied!" shows as "Copy JSON".
fn prompt(session: &ClientSession<ExtractionClient>) -> Result<()> {
    if let Some(controls) = session.controls_line(Instant::now()) {
        println!("{controls}");
    }
    print!("Extract Features > ");
    std::io::stdout().flush()?;
    Ok(())
}

/// OSC 52: asks the terminal emulator to put `text` on the system clipboard.
fn copy_to_terminal_clipboard(text: &str) -> Result<()> {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text);
    let mut stdout = std::io::stdout();
    write!(stdout, "\x1b]52;c;{encoded}\x07")?;
    stdout.flush()?;
    Ok(())
}
