use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use parley::room::token::mint_join_token;
use parley::voice::{MicCapture, Playback, SampleSource};
use parley::{Config, Daemon, JoinOptions};

/// Parley - voice assistant gateway for real-time audio rooms
#[derive(Parser)]
#[command(name = "parley", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "PARLEY_PORT")]
    port: Option<u16>,

    /// Room to join in --join mode
    #[arg(long, env = "PARLEY_ROOM")]
    room: Option<String>,

    /// Local participant identity in --join mode
    #[arg(long, default_value = "parley")]
    identity: String,

    /// Join the room and run the assistant loop (default: serve only)
    #[arg(long)]
    join: bool,

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
    /// Test speaker output
    TestSpeaker,
    /// Mint and print a join token
    Token {
        /// Room name
        #[arg(long)]
        room: Option<String>,
        /// Participant identity
        #[arg(long, default_value = "parley")]
        identity: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,parley=info",
        1 => "info,parley=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
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
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestSpeaker => test_speaker(),
            Command::Token { room, identity } => mint_token(room.as_deref(), &identity),
        };
    }

    let mut config = Config::load()?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(room) = &cli.room {
        config.room = room.clone();
    }

    tracing::info!(port = config.port, join = cli.join, "starting parley gateway");

    let join = cli.join.then(|| JoinOptions {
        room: config.room.clone(),
        identity: cli.identity.clone(),
    });

    Daemon::new(config).run(join).await?;

    Ok(())
}

/// Test microphone input with a level meter
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = MicCapture::open()?;
    capture.start()?;

    println!("Sample rate: {} Hz", capture.sample_rate());
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.drain();
        let rms = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (rms * 100.0).min(50.0) as usize;
        let meter: String = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!("[{:2}s] RMS: {rms:.4} | Peak: {peak:.4} | [{meter}]", i + 1);
    }

    capture.stop();

    println!("\n---");
    println!("If the meter moved, your microphone is working.");

    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test speaker output with a sine wave
fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let playback = Playback::open()?;

    let sample_rate = 24000_u32;
    let frequency = 440.0_f32;
    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..sample_rate * 2)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3
        })
        .collect();

    playback.play(&samples)?;

    println!("\n---");
    println!("If you heard the tone, your speakers are working.");

    Ok(())
}

/// Mint and print a join token
fn mint_token(room: Option<&str>, identity: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let room = room.unwrap_or(&config.room);

    let jwt = mint_join_token(&config.livekit, room, identity)?;
    println!("{jwt}");

    Ok(())
}
