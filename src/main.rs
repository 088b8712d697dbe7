use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use futures::TryStreamExt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use actionhub::adapters::{ActionCatalog, MemoryActionRepository, RestApiExecutor};
use actionhub::application::{ActionService, CrudService, DefaultActionService, PluginRegistry};
use actionhub::config::Config;
use actionhub::domain::{Action, ExecuteActionDto, Param};
use actionhub::error::ActionError;

#[derive(Parser)]
#[command(name = "actionhub", about = "Run stored API actions", version)]
struct Cli {
    /// TOML catalogue of actions to load
    #[arg(long, short = 'a', env = "ACTIONHUB_ACTIONS_FILE")]
    actions: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List loaded actions
    List,

    /// Print one action as JSON
    Show {
        name: String,
    },

    /// Execute an action and print its result as JSON
    Run {
        name: String,

        /// Binding value as key=value (repeatable)
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<Param>,
    },
}

fn parse_param(raw: &str) -> Result<Param, String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok(Param::new(key.trim(), value)),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("actionhub={}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting actionhub v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {:?}", config);

    let plugins = PluginRegistry::new().with(Arc::new(RestApiExecutor::new()?));
    let service = DefaultActionService::new(
        Arc::new(MemoryActionRepository::new()),
        plugins,
        Duration::from_millis(config.execution_timeout_ms),
    );

    if let Some(path) = &cli.actions {
        let catalog = ActionCatalog::load(path)?;
        let loaded: Vec<Action> = service.save_all(catalog.actions).try_collect().await?;
        info!("Loaded {} actions from {}", loaded.len(), path.display());
    }

    match cli.command {
        Commands::List => {
            for action in service.get_all().await? {
                let state = if action.is_valid { "valid" } else { "invalid" };
                println!("{}\t{}\t{}", action.name, action.plugin_id, state);
            }
        }
        Commands::Show { name } => {
            let action = find(&service, &name).await?;
            println!("{}", serde_json::to_string_pretty(&action)?);
        }
        Commands::Run { name, params } => {
            let action = find(&service, &name).await?;
            let id = action.id.ok_or_else(|| ActionError::NotFound(name.clone()))?;
            let mut request = ExecuteActionDto::for_id(id);
            request.params = params;
            let result = service.execute_action(request).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);

            if !result.is_execution_success {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn find(service: &DefaultActionService, name: &str) -> Result<Action, ActionError> {
    service
        .find_by_name(name)
        .await?
        .ok_or_else(|| ActionError::NotFound(name.to_string()))
}
