use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use parley::config::{Overrides, file, listen_config};
use parley::voice::{AudioCapture, SAMPLE_RATE, rms};
use parley::{Config, InteractionLoop, OpenAiGenerator, SpeechCapture};

/// Length of one `test-mic` meter window
const METER_WINDOW: Duration = Duration::from_millis(500);

/// Parley - talk to a chat model through your microphone
#[derive(Parser)]
#[command(name = "parley", version, about)]
struct Cli {
    /// Chat model identifier
    #[arg(short, long, env = "PARLEY_LLM_MODEL")]
    model: Option<String>,

    /// Speech recognition language (BCP-47, e.g. "en-US")
    #[arg(short, long, env = "PARLEY_SPEECH_LANGUAGE")]
    language: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long, env = "PARLEY_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so the conversation on stdout stays readable
    let filter = match cli.verbose {
        0 => "warn,parley=warn",
        1 => "info,parley=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(Command::TestMic { duration }) = cli.command {
        return test_mic(duration, cli.config.as_deref()).await;
    }

    let overrides = Overrides {
        model: cli.model,
        language: cli.language,
        config_path: cli.config,
    };

    let config = Config::load(&overrides)?;
    let generator = OpenAiGenerator::new(config.llm)?;
    let capture = SpeechCapture::from_config(config.speech, config.listen)?;

    tracing::info!(model = generator.model(), "parley ready");

    let mut interaction = InteractionLoop::new(capture, generator);
    let mut input = std::io::stdin().lock();
    let mut output = std::io::stdout().lock();
    let turns = interaction.run(&mut input, &mut output).await?;

    tracing::info!(turns, "goodbye");
    Ok(())
}

/// Show live input levels against the configured speech threshold
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64, config_path: Option<&Path>) -> anyhow::Result<()> {
    let file = match config_path {
        Some(path) => file::load_explicit(path)?,
        None => file::load_config_file(),
    };
    let listen = listen_config(&file.listen)?;

    let mut capture = AudioCapture::new()?;
    println!(
        "Input: {} Hz, {} channel(s), converted to {SAMPLE_RATE} Hz mono",
        capture.device_rate(),
        capture.channels()
    );
    println!("Speech threshold (RMS): {:.3}", listen.energy_threshold);
    println!("Listening for {duration} seconds, speak now.\n");
    capture.start()?;

    let windows = duration * 2;
    let mut voiced = 0;
    let mut ticker = tokio::time::interval(METER_WINDOW);
    ticker.tick().await;

    for window in 1..=windows {
        ticker.tick().await;

        let level = rms(&capture.take_buffer()?);
        let speech = level > listen.energy_threshold;
        if speech {
            voiced += 1;
        }

        let at = METER_WINDOW * u32::try_from(window).unwrap_or(u32::MAX);
        println!(
            "{:>5.1}s {} {level:.4}{}",
            at.as_secs_f32(),
            level_bar(level),
            if speech { "  speech" } else { "" }
        );
    }

    capture.stop();

    if voiced == 0 {
        println!("\nNothing crossed the speech threshold.");
        println!("Check the default input device, or lower energy_threshold under [listen].");
    } else {
        println!("\n{voiced} of {windows} windows counted as speech.");
    }

    Ok(())
}

/// Render an RMS level as a fixed-width bar
fn level_bar(level: f32) -> String {
    const WIDTH: usize = 40;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = (level * 200.0).clamp(0.0, 40.0) as usize;
    format!("|{}{}|", "=".repeat(filled), " ".repeat(WIDTH - filled))
}
