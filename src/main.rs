use clap::{Parser, Subcommand};
use restyle::{
    logger::{self, LogLevel, LoggerConfig},
    Config, EditSession, GeminiClient, ImageClient, PromptParams, Quality, RequestState,
    RestyleError, SourceImage, StyleOption,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "restyle", version, about = "Re-style photos with Gemini image models")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the built-in styles
    Styles,
    /// List known image models
    Models,
    /// Transform a photo into a new style
    Transform {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Catalog style id (see `restyle styles`)
        #[arg(short, long, default_value = "cyberpunk")]
        style: String,
        /// Custom base prompt, used instead of the style template
        #[arg(short, long)]
        prompt: Option<String>,
        /// 0-100: how closely to follow the character and scene text
        #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=100))]
        influence: u8,
        #[arg(long, default_value = "")]
        character: String,
        #[arg(long, default_value = "")]
        scene: String,
        /// `high` for 2K-4K output, anything else for standard quality
        #[arg(long, default_value = "standard")]
        quality: String,
        /// Remove the background before transforming
        #[arg(long)]
        remove_background: bool,
    },
    /// Remove the background of a photo, producing a transparent PNG
    RemoveBackground {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Serve the HTTP API
    #[cfg(feature = "server")]
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let cli = Cli::parse();

    let logger_config = if cli.verbose {
        LoggerConfig::development().with_level(LogLevel::Debug)
    } else {
        LoggerConfig::from_env()
    };
    if let Err(e) = logger::init_with_config(logger_config) {
        eprintln!("{}", e);
    }
    if dotenv_loaded {
        log::debug!("✅ .env file loaded");
    }

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("❌ {}", e);
            eprintln!("{}", user_message(&e));
            ExitCode::FAILURE
        }
    }
}

fn user_message(error: &RestyleError) -> String {
    match error {
        RestyleError::InvalidInput(msg) => msg.clone(),
        RestyleError::ConfigurationMissing(msg) => format!("Missing configuration: {}", msg),
        RestyleError::Io(e) => format!("File error: {}", e),
        // Only ever built from a session's already-generic failure message.
        RestyleError::GenerationFailed(msg) => msg.clone(),
        _ => "Something went wrong. Please try again.".to_string(),
    }
}

async fn run(command: Command) -> restyle::Result<()> {
    match command {
        Command::Styles => {
            for style in StyleOption::all() {
                println!("{:<14} {}", style.id, style.name);
            }
            Ok(())
        }
        Command::Models => {
            for (id, name, notes) in ImageClient::supported_models() {
                println!("{:<32} {} ({})", id, name, notes);
            }
            Ok(())
        }
        Command::Transform {
            input,
            output,
            style,
            prompt,
            influence,
            character,
            scene,
            quality,
            remove_background,
        } => {
            let base_style = match prompt {
                Some(prompt) => prompt,
                None => StyleOption::by_id(&style)
                    .map(|s| s.prompt_template.to_string())
                    .ok_or_else(|| {
                        RestyleError::InvalidInput(format!(
                            "Unknown style '{}'. Run `restyle styles` to list them.",
                            style
                        ))
                    })?,
            };
            let params = PromptParams::new(base_style)
                .with_influence(influence)
                .with_character(character)
                .with_scene(scene)
                .with_quality(Quality::parse(&quality));

            let image = SourceImage::from_path(&input)?;
            let client = connect()?;
            let mut session = EditSession::with_image(image);

            if remove_background {
                let state = session.remove_background(client.image()).await?;
                ensure_succeeded(state)?;
            }
            let state = session.transform(client.image(), &params).await?;
            ensure_succeeded(state)?;

            match session.result() {
                Some(result) => {
                    result.save(&output)?;
                    report_saved(&output, result.size(), result.duration_ms);
                    Ok(())
                }
                None => Err(RestyleError::NoImageInResponse),
            }
        }
        Command::RemoveBackground { input, output } => {
            let image = SourceImage::from_path(&input)?;
            let client = connect()?;
            let mut session = EditSession::with_image(image);

            let state = session.remove_background(client.image()).await?;
            ensure_succeeded(state)?;

            let current = session
                .current()
                .ok_or(RestyleError::NoImageInResponse)?;
            std::fs::write(&output, current.data())?;
            report_saved(&output, current.size(), 0);
            Ok(())
        }
        #[cfg(feature = "server")]
        Command::Serve { port } => {
            let mut config = Config::from_env();
            if let Some(port) = port {
                config = config.with_port(port);
            }
            logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            let client = GeminiClient::new(config.gemini.clone())?;
            restyle::server::run(client, config.port()).await?;
            Ok(())
        }
    }
}

/// Reads the configuration and builds the client. A missing API key stops here.
fn connect() -> restyle::Result<GeminiClient> {
    let config = Config::from_env();
    logger::log_config_info(&config);
    GeminiClient::new(config.gemini)
}

fn ensure_succeeded(state: &RequestState) -> restyle::Result<()> {
    match state {
        RequestState::Succeeded { .. } => Ok(()),
        RequestState::Failed { message, .. } => {
            Err(RestyleError::GenerationFailed(message.clone()))
        }
        other => Err(RestyleError::GenerationFailed(format!(
            "unexpected request state {:?}",
            other
        ))),
    }
}

fn report_saved(path: &Path, size: usize, duration_ms: u64) {
    if duration_ms > 0 {
        log::info!("💾 Saved {} bytes to {} ({}ms)", size, path.display(), duration_ms);
    } else {
        log::info!("💾 Saved {} bytes to {}", size, path.display());
    }
    println!("{}", path.display());
}
