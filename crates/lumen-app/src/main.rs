//! Lumen application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing (stderr, so it never interleaves with the chat)
//! 3. Resolve the API key from the environment
//! 4. Build the chat client, speech output and orchestrator
//! 5. Run the terminal REPL, or a single exchange with `--prompt`
//!
//! `--init-config` writes the effective configuration and exits before step 3.

mod cli;
mod repl;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;

use lumen_chat::{speech_from_config, ConversationOrchestrator, HttpChatClient, Persona};
use lumen_core::config::LumenConfig;
use lumen_core::error::LumenError;

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config_file = args.resolve_config_path();
    let (mut config, load_error) = match LumenConfig::load(&config_file) {
        Ok(config) => (config, None),
        Err(e) => (LumenConfig::default(), Some(e)),
    };
    args.apply_overrides(&mut config);

    // Tracing. RUST_LOG wins over the configured level.
    let log_level = args.resolve_log_level(&config);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    tracing::info!("Starting Lumen v{}", env!("CARGO_PKG_VERSION"));
    match load_error {
        None => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Some(LumenError::Io(ref e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %config_file.display(), "No configuration file, using defaults")
        }
        Some(e) => {
            tracing::warn!(path = %config_file.display(), error = %e, "Ignoring configuration file, using defaults")
        }
    }

    if args.init_config {
        if let Err(e) = config.write_initial(&config_file) {
            tracing::error!(path = %config_file.display(), error = %e, "Configuration not written");
            eprintln!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
        println!("Wrote {}", config_file.display());
        return Ok(ExitCode::SUCCESS);
    }

    let api_key = match config.chat.resolve_api_key() {
        Ok(key) => key,
        Err(e) => {
            tracing::error!(error = %e, "Cannot start without an API key");
            eprintln!("{}", e);
            eprintln!("Set it with: export {}=<your key>", config.chat.api_key_env);
            return Ok(ExitCode::FAILURE);
        }
    };

    let client = Arc::new(HttpChatClient::from_config(&config.chat, api_key)?);
    let speech = speech_from_config(&config.voice)?;
    tracing::info!(
        endpoint = %client.endpoint(),
        model = %config.chat.model,
        voice = config.voice.enabled,
        engine = %config.voice.engine,
        "Chat engine ready"
    );

    let persona = Persona::from_config(&config.chat, config.voice.language_tag.clone());
    let mut orchestrator = ConversationOrchestrator::new(persona, client, speech)
        .with_voice_enabled(config.voice.enabled);

    if let Some(ref prompt) = args.prompt {
        let ok = repl::run_once(&mut orchestrator, prompt, &mut std::io::stdout()).await?;
        return Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    let stdin = BufReader::new(tokio::io::stdin());
    repl::run_interactive(&mut orchestrator, stdin, &mut std::io::stdout()).await?;
    tracing::info!("Lumen stopped");
    Ok(ExitCode::SUCCESS)
}
