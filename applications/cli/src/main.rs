/// Sonance - batch loudness normalization and clip generation
use clap::{Parser, Subcommand};
use sonance_cli::{AppConfig, BatchNormalizer};
use sonance_clipgen::{ClipGenerator, PromptList};
use sonance_transcode::AudioFormat;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sonance")]
#[command(about = "Normalize audio loudness and generate sound clips", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./sonance.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize every audio file in a directory
    Normalize {
        /// Directory to read audio files from
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Directory to write normalized files to
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Target integrated loudness in LUFS
        #[arg(short, long, allow_negative_numbers = true)]
        target: Option<f64>,
        /// Maximum absolute sample value after gain (0 < ceiling <= 1)
        #[arg(long)]
        ceiling: Option<f64>,
        /// Compressed derivative format
        #[arg(short, long)]
        format: Option<AudioFormat>,
        /// Write only the lossless files
        #[arg(long)]
        no_derivative: bool,
    },
    /// Measure loudness without writing anything
    Analyze {
        /// Directory to read audio files from
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Generate clips from a prompt list
    Generate {
        /// Prompt list (TOML)
        #[arg(short, long)]
        prompts: Option<PathBuf>,
        /// Directory to write clips to
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// API key for the sound-generation endpoint
        #[arg(long, env = "ELEVENLABS_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // .env feeds both the config layer and clap's env fallbacks
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sonance=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Normalize {
            input,
            output,
            target,
            ceiling,
            format,
            no_derivative,
        } => {
            if let Some(input) = input {
                config.normalize.input_dir = input;
            }
            if let Some(output) = output {
                config.normalize.output_dir = output;
            }
            if let Some(target) = target {
                config.normalize.target_lufs = target;
            }
            if let Some(ceiling) = ceiling {
                config.normalize.peak_ceiling = ceiling;
            }
            if let Some(format) = format {
                config.transcode.derivative_format = format;
            }
            if no_derivative {
                config.transcode.enabled = false;
            }
            normalize(config).await?;
        }
        Commands::Analyze { input } => {
            if let Some(input) = input {
                config.normalize.input_dir = input;
            }
            analyze(config)?;
        }
        Commands::Generate {
            prompts,
            output,
            api_key,
        } => {
            if let Some(prompts) = prompts {
                config.clipgen.prompts_file = prompts;
            }
            if let Some(output) = output {
                config.clipgen.output_dir = output;
            }
            if api_key.is_some() {
                config.clipgen.api_key = api_key;
            }
            generate(config).await?;
        }
    }

    Ok(())
}

async fn normalize(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;

    let bridge = config.ffmpeg_bridge();
    if config.transcode.enabled {
        // Missing encoder is reported per file, not fatal
        match bridge.probe().await {
            Ok(version) => tracing::debug!("Using {}", version),
            Err(e) => tracing::warn!("Encoder unavailable, derivatives will fail: {}", e),
        }
    }

    let mut normalizer = BatchNormalizer::new(
        config.normalization_target()?,
        config.normalize.output_dir.clone(),
        bridge,
    )
    .with_derivative_format(config.derivative_format());

    // Dropping the run future kills any in-flight encoder
    let report = tokio::select! {
        result = normalizer.run(&config.normalize.input_dir) => result?,
        _ = tokio::signal::ctrl_c() => anyhow::bail!("Interrupted"),
    };

    println!("{}", report);
    Ok(())
}

fn analyze(config: AppConfig) -> anyhow::Result<()> {
    let mut normalizer = BatchNormalizer::new(
        config.normalization_target()?,
        config.normalize.output_dir.clone(),
        config.ffmpeg_bridge(),
    );

    let report = normalizer.analyze(&config.normalize.input_dir)?;
    println!("{}", report);
    Ok(())
}

async fn generate(config: AppConfig) -> anyhow::Result<()> {
    // No request goes out without a key
    let clip_config = config.clip_generator_config()?;
    let prompts = PromptList::load(&config.clipgen.prompts_file)?;

    tracing::info!(
        "Generating {} clip(s) into {}",
        prompts.len(),
        clip_config.output_dir.display()
    );

    let generator = ClipGenerator::new(clip_config, config.ffmpeg_bridge())?;

    let report = tokio::select! {
        report = generator.generate(&prompts) => report,
        _ = tokio::signal::ctrl_c() => anyhow::bail!("Interrupted"),
    };

    println!("{}", report);
    Ok(())
}
