use clap::Parser;
use log::error;
use receipt_recipes::{
    load_config, render, ConsoleNotifier, FileAcquirer, ImageOrigin, ProviderFactory,
    ReceiptAnalyzer, ScreenController,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Extract purchased food items from a receipt photo and suggest recipes
#[derive(Parser, Debug)]
#[command(name = "receipt-recipes", version, about)]
struct Cli {
    /// Receipt image (PNG or JPEG)
    image: PathBuf,

    /// Inference provider to use (anthropic, openai, google)
    #[arg(long)]
    provider: Option<String>,

    /// Model identifier, overriding the configured one
    #[arg(long)]
    model: Option<String>,

    /// Configuration file (defaults to ./config.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the analysis result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(provider) = cli.provider {
        config.default_provider = provider;
    }
    if let Some(model) = cli.model {
        let provider_name = config.default_provider.clone();
        if let Some(mut provider_config) = config.provider_config(&provider_name) {
            provider_config.model = model;
            config.providers.insert(provider_name, provider_config);
        }
    }

    let analyzer = match ReceiptAnalyzer::from_config(&config) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!(
                "Available providers: {}",
                ProviderFactory::available_providers().join(", ")
            );
            return ExitCode::FAILURE;
        }
    };

    let mut controller = ScreenController::new(Arc::new(analyzer), Arc::new(ConsoleNotifier));
    let acquirer = FileAcquirer::new(cli.image);

    if !controller.acquire(&acquirer, ImageOrigin::Gallery).await {
        return ExitCode::FAILURE;
    }
    controller.start_analysis().await;

    let state = controller.state();
    if cli.json {
        match state
            .result
            .as_ref()
            .map(serde_json::to_string_pretty)
            .transpose()
        {
            Ok(Some(json)) => println!("{}", json),
            Ok(None) => {}
            Err(e) => {
                error!("Failed to serialize result: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", render(state));
    }

    match &state.result {
        Some(result) if !result.is_error() => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
