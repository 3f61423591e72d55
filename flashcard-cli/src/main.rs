mod cli;
mod client;
mod output;

use clap::Parser;

use cli::{Cli, Command};
use client::{ClientError, FlashcardClient};
use flashcard_core::card::GenerationRequest;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Server(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 2,
            Self::Transport(_) => 4,
            Self::Server(_) => 5,
        }
    }
}

impl From<ClientError> for CliError {
    fn from(value: ClientError) -> Self {
        match value {
            ClientError::Server { status, detail } if status == 422 => Self::Usage(detail),
            err @ ClientError::Server { .. } => Self::Server(err.to_string()),
            ClientError::Transport(message) | ClientError::InvalidResponse(message) => {
                Self::Transport(message)
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    match run(cli).await {
        Ok(payload) => output::print_success(json_mode, &payload),
        Err(err) => {
            let exit_code = err.exit_code();
            output::print_error(json_mode, &err.to_string(), exit_code);
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: Cli) -> Result<serde_json::Value, CliError> {
    let client = FlashcardClient::new(&cli.addr, cli.timeout)?;
    match cli.command {
        Command::Health => Ok(client.health().await?),
        Command::Generate(args) => {
            let mut request = GenerationRequest::new(args.topic, args.count);
            if let Some(notes) = args.notes {
                request = request.with_notes(notes);
            }
            request
                .validate()
                .map_err(|err| CliError::Usage(err.to_string()))?;
            Ok(client.generate(&request).await?)
        }
    }
}
