//! CLI binary for sending testing ideas to a `/generate` endpoint.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

use promptgen_client::{
    ClientConfig, Encoding, HttpTransport, PromptgenError, SubmissionController,
    TerminalRenderer,
};

#[derive(Parser)]
#[command(name = "promptgen", version, about = "Turn a testing idea into generated test scenarios")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the server that exposes POST /generate [env: PROMPTGEN_URL]
    #[arg(long, global = true)]
    url: Option<String>,

    /// Request body encoding: json or form [env: PROMPTGEN_ENCODING]
    #[arg(long, global = true)]
    encoding: Option<Encoding>,

    /// Shorthand for --encoding form
    #[arg(long, global = true, conflicts_with = "encoding")]
    form: bool,

    /// Request timeout in seconds, none by default [env: PROMPTGEN_TIMEOUT_SECS]
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit one prompt and print the result
    Generate {
        /// The testing idea or scenario (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },

    /// Read prompts from stdin, one per line, and print each result
    Interactive,
}

impl Cli {
    /// Environment first, then flags on top.
    fn client_config(&self) -> Result<ClientConfig, PromptgenError> {
        Ok(self.apply_overrides(ClientConfig::from_env()?))
    }

    fn apply_overrides(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(url) = &self.url {
            config.base_url = url.clone();
        }
        if self.form {
            config.encoding = Encoding::Form;
        } else if let Some(encoding) = self.encoding {
            config.encoding = encoding;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Some(Duration::from_secs(secs));
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is the display region.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.client_config()?;
    let transport = HttpTransport::new(&config)?;
    tracing::debug!(endpoint = %transport.endpoint(), encoding = ?config.encoding, "client ready");

    let controller = SubmissionController::new(transport, TerminalRenderer::stdout());

    match cli.command {
        Commands::Generate { prompt } => {
            cmd_generate(&controller, &prompt.join(" ")).await;
        }
        Commands::Interactive => {
            cmd_interactive(Arc::new(controller)).await?;
        }
    }

    Ok(())
}

async fn cmd_generate(controller: &SubmissionController, prompt: &str) {
    let outcome = controller.submit(prompt).await;
    if !outcome.is_success() {
        std::process::exit(1);
    }
}

fn is_quit(line: &str) -> bool {
    matches!(line.trim(), "quit" | "exit")
}

/// Each line is one activation. Submissions run concurrently; the controller
/// only displays the result of the most recent one.
async fn cmd_interactive(controller: Arc<SubmissionController>) -> anyhow::Result<()> {
    eprintln!("Enter a testing idea per line (quit or Ctrl-D to leave).");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = JoinSet::new();

    while let Some(line) = lines.next_line().await? {
        if is_quit(&line) {
            break;
        }
        let controller = controller.clone();
        in_flight.spawn(async move { controller.submit(&line).await });

        // Reap whatever already finished so the set does not grow unbounded.
        while let Some(joined) = in_flight.try_join_next() {
            if let Err(e) = joined {
                tracing::error!(error = %e, "submission task failed");
            }
        }
    }

    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "submission task failed");
        }
    }

    Ok(())
}
