use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use flashcard_core::card::{MAX_CARD_COUNT, MIN_CARD_COUNT};

#[derive(Debug, Parser)]
#[command(
    name = "flashctl",
    version,
    about = "Generate study flashcards through a running flashcardd"
)]
pub struct Cli {
    /// Daemon base URL.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    pub addr: String,

    /// Emit stable JSON envelopes.
    #[arg(long)]
    pub json: bool,

    /// Request timeout. Generation runs research first, so keep this generous.
    #[arg(long, default_value = "5m", value_parser = parse_duration)]
    pub timeout: Duration,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Research a topic and generate flashcards for it.
    Generate(GenerateArgs),
    /// Check that the daemon is up.
    Health,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Subject to study.
    pub topic: String,

    /// Number of cards to generate.
    #[arg(
        short = 'n',
        long,
        default_value_t = 5,
        value_parser = clap::value_parser!(u32).range(MIN_CARD_COUNT as i64..=MAX_CARD_COUNT as i64)
    )]
    pub count: u32,

    /// Extra instructions that focus the research.
    #[arg(long)]
    pub notes: Option<String>,
}

fn parse_duration(input: &str) -> Result<Duration, String> {
    humantime::parse_duration(input).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate_with_notes() {
        let cli = Cli::try_parse_from([
            "flashctl",
            "generate",
            "Photosynthesis",
            "--count",
            "7",
            "--notes",
            "focus on the Calvin cycle",
        ])
        .expect("cli should parse");

        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.topic, "Photosynthesis");
                assert_eq!(args.count, 7);
                assert_eq!(args.notes.as_deref(), Some("focus on the Calvin cycle"));
            }
            other => panic!("unexpected command parsed: {other:?}"),
        }
        assert_eq!(cli.addr, "http://127.0.0.1:8000");
        assert_eq!(cli.timeout, Duration::from_secs(300));
    }

    #[test]
    fn generate_count_defaults_and_bounds() {
        let cli = Cli::try_parse_from(["flashctl", "generate", "Osmosis"]).expect("cli parse");
        match cli.command {
            Command::Generate(args) => assert_eq!(args.count, 5),
            other => panic!("unexpected command parsed: {other:?}"),
        }

        for bad in ["0", "51", "-3"] {
            assert!(
                Cli::try_parse_from(["flashctl", "generate", "Osmosis", "-n", bad]).is_err(),
                "count {bad} should be rejected"
            );
        }
    }

    #[test]
    fn parses_timeout_duration() {
        let cli =
            Cli::try_parse_from(["flashctl", "--timeout", "3s", "health"]).expect("cli parse");
        assert_eq!(cli.timeout, Duration::from_secs(3));
        assert!(matches!(cli.command, Command::Health));
    }
}
