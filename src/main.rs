use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use parley_gateway::api::ApiServerBuilder;
use parley_gateway::tutor::Timeouts;
use parley_gateway::{
    Config, Gemini, SpeechToText, Synthesizer, TextToSpeech, Tutor, shared_session,
};

/// Parley - spoken English conversation practice with grammar feedback
#[derive(Parser)]
#[command(name = "parley", version, about)]
struct Cli {
    /// Port to listen on (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the practice web server (default)
    Serve,
    /// Synthesize text with the tutor voice and save it as MP3
    Say {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
        /// Output file
        #[arg(short, long, default_value = "parley.mp3")]
        out: PathBuf,
    },
    /// Print formal and casual English for Japanese text
    Translate {
        /// Japanese text
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity, RUST_LOG wins when set
    let filter = match cli.verbose {
        0 => "info,parley_gateway=info",
        1 => "info,parley_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load();
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    tracing::debug!(?config, "loaded configuration");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Say { text, out } => say(&config, &text, &out).await,
        Command::Translate { text } => translate(config, &text).await,
    }
}

/// Wire the Google clients into a tutor
fn build_tutor(config: &Config) -> anyhow::Result<Tutor> {
    let google_key = config.api_keys.require_google_cloud()?;

    let stt = SpeechToText::new(google_key.clone(), config.voice.recognition.clone())?;
    let tts = TextToSpeech::new(google_key, config.voice.synthesis.clone())?;
    let gemini = Gemini::new(config.api_keys.require_gemini()?, config.llm_model.clone())?;

    Ok(Tutor::new(shared_session(), Arc::new(stt), Arc::new(tts), Arc::new(gemini))
        .with_timeouts(Timeouts {
            transcription: config.voice.stt_timeout,
            request: config.server.request_timeout,
        }))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        model = %config.llm_model,
        voice = %config.voice.synthesis.name,
        "starting parley gateway"
    );

    let tutor = build_tutor(&config)?;

    let static_dir = config.server.static_dir.clone();
    let static_dir = if static_dir.is_dir() {
        Some(static_dir)
    } else {
        tracing::warn!(path = %static_dir.display(), "static directory not found, web page disabled");
        None
    };

    ApiServerBuilder::new(tutor, config.server.port)
        .host(config.server.host)
        .llm_model(config.llm_model)
        .tts_voice(config.voice.synthesis.name)
        .static_dir(static_dir)
        .build()
        .run()
        .await?;

    Ok(())
}

/// Smoke test for TTS credentials
async fn say(config: &Config, text: &str, out: &Path) -> anyhow::Result<()> {
    let tts = TextToSpeech::new(
        config.api_keys.require_google_cloud()?,
        config.voice.synthesis.clone(),
    )?;

    println!("Synthesizing: \"{text}\"");
    let audio = tts.synthesize(text).await?;
    tokio::fs::write(out, &audio).await?;
    println!("Wrote {} bytes to {}", audio.len(), out.display());

    Ok(())
}

async fn translate(config: Config, text: &str) -> anyhow::Result<()> {
    let tutor = build_tutor(&config)?;
    let en_text = tutor.translate(text).await?;
    println!("{en_text}");
    Ok(())
}
