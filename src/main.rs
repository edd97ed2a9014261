// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use bookshelf_mcp::mcp::{BookshelfMcp, http};
use bookshelf_mcp::preferences::{preferred_name, render_profile};
use bookshelf_mcp::utils::logging::{format_error, format_success, format_warning};
use bookshelf_mcp::{Config, Dispatcher, HealthStatus, UserIdentity, Validator, registry};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use rmcp::ServiceExt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "bookshelf_mcp")]
#[command(author = "cipher")]
#[command(version)]
#[command(about = "Reading-preference tools and book recommendations over MCP", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Transport {
    Stdio,
    Http,
}

/// Identity overrides for commands that act on a single user.
#[derive(clap::Args)]
struct UserArgs {
    /// User id (defaults to identity.user_id from the configuration)
    #[arg(short, long)]
    user: Option<String>,

    /// Display name for the session
    #[arg(short, long)]
    name: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the preference tools
    Serve {
        /// Overrides server.transport
        #[arg(long, value_enum)]
        transport: Option<Transport>,

        /// Overrides server.bind_addr (http only)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,

        #[command(flatten)]
        user: UserArgs,
    },

    /// Print a user's reading profile
    Profile {
        #[command(flatten)]
        user: UserArgs,
    },

    /// Ask the inference endpoint for recommendations
    Recommend {
        #[command(flatten)]
        user: UserArgs,
    },

    /// Clear a user's preferences, keeping their name
    Reset {
        #[command(flatten)]
        user: UserArgs,

        #[arg(long)]
        confirm: bool,
    },

    /// Delete a user's stored record entirely
    Purge {
        #[command(flatten)]
        user: UserArgs,

        #[arg(long)]
        confirm: bool,
    },

    /// List tool names, descriptions and input schemas
    Tools,

    /// Check storage and inference configuration
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    bookshelf_mcp::utils::logging::init_logger(cli.color, cli.verbose);

    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::default_config()
    };

    match cli.command {
        Commands::Serve {
            transport,
            bind,
            user,
        } => {
            cmd_serve(&config, transport, bind, &user).await?;
        }
        Commands::Profile { user } => {
            cmd_profile(&config, &user).await?;
        }
        Commands::Recommend { user } => {
            cmd_recommend(&config, &user).await?;
        }
        Commands::Reset { user, confirm } => {
            cmd_reset(&config, &user, confirm).await?;
        }
        Commands::Purge { user, confirm } => {
            cmd_purge(&config, &user, confirm).await?;
        }
        Commands::Tools => {
            cmd_tools()?;
        }
        Commands::Health => {
            cmd_health(&config).await?;
        }
    }

    Ok(())
}

fn resolve_identity(config: &Config, args: &UserArgs) -> Result<UserIdentity> {
    let user_id = args
        .user
        .clone()
        .unwrap_or_else(|| config.identity.user_id.clone());
    Validator::validate_user_id(&user_id).context("Invalid user id")?;

    let display_name = args
        .name
        .clone()
        .unwrap_or_else(|| config.identity.display_name.clone());

    Ok(UserIdentity::new(user_id.trim(), display_name.trim()))
}

async fn build_dispatcher(config: &Config) -> Result<Arc<Dispatcher>> {
    let dispatcher = Dispatcher::from_config(config)
        .await
        .context("Failed to initialize preference store")?;
    Ok(Arc::new(dispatcher))
}

async fn cmd_serve(
    config: &Config,
    transport: Option<Transport>,
    bind: Option<String>,
    user: &UserArgs,
) -> Result<()> {
    let transport = match transport {
        Some(t) => t,
        None => Transport::from_str(&config.server.transport, true)
            .map_err(|e| anyhow::anyhow!("Unsupported transport in config: {}", e))?,
    };

    let dispatcher = build_dispatcher(config).await?;

    match transport {
        Transport::Stdio => {
            let identity = resolve_identity(config, user)?;
            dispatcher.init_session(&identity).await;

            let server = BookshelfMcp::new(dispatcher, identity);
            info!("MCP server ready for {}. Available tools:", server.identity().user_id);
            for tool in server.get_tool_router().list_all() {
                info!(
                    "  - {}: {}",
                    tool.name,
                    tool.description.as_deref().unwrap_or("No description")
                );
            }

            info!("Starting stdio transport...");
            let service = server
                .serve(rmcp::transport::stdio())
                .await
                .context("Failed to start MCP stdio transport")?;
            service.waiting().await?;
        }
        Transport::Http => {
            if user.user.is_some() {
                warn!("--user is ignored over HTTP; identity comes from request headers");
            }

            let addr: SocketAddr = bind
                .unwrap_or_else(|| config.server.bind_addr.clone())
                .parse()
                .context("Invalid bind address")?;
            http::serve(dispatcher, addr).await?;
        }
    }

    Ok(())
}

async fn cmd_profile(config: &Config, user: &UserArgs) -> Result<()> {
    let identity = resolve_identity(config, user)?;
    let dispatcher = build_dispatcher(config).await?;

    let record = dispatcher.store().load(&identity.storage_key()).await;
    println!("{}", render_profile(&record, &identity));
    Ok(())
}

async fn cmd_recommend(config: &Config, user: &UserArgs) -> Result<()> {
    let identity = resolve_identity(config, user)?;
    let dispatcher = build_dispatcher(config).await?;

    let record = dispatcher.store().load(&identity.storage_key()).await;
    let name = preferred_name(&record, &identity).to_string();
    info!("Requesting recommendations from {}", dispatcher.recommender().model_name());

    println!("{}", dispatcher.recommender().recommend(&record, &name).await);
    Ok(())
}

async fn cmd_reset(config: &Config, user: &UserArgs, confirm: bool) -> Result<()> {
    let identity = resolve_identity(config, user)?;

    if !confirm {
        eprintln!(
            "{}",
            format_error(&format!(
                "This clears all preferences for {}. Use --confirm to proceed",
                identity.user_id
            ))
        );
        return Ok(());
    }

    let dispatcher = build_dispatcher(config).await?;
    let response = dispatcher
        .invoke(&identity, "clearPreferences", serde_json::Value::Null)
        .await
        .context("Failed to clear preferences")?;

    println!("{}", response.first_text());
    Ok(())
}

async fn cmd_purge(config: &Config, user: &UserArgs, confirm: bool) -> Result<()> {
    let identity = resolve_identity(config, user)?;

    if !confirm {
        eprintln!(
            "{}",
            format_error(&format!(
                "This deletes the stored record for {}, including their name. Use --confirm to proceed",
                identity.user_id
            ))
        );
        return Ok(());
    }

    warn!("Purging preference record for {}", identity.user_id);

    let dispatcher = build_dispatcher(config).await?;
    let existed = dispatcher
        .store()
        .purge(&identity.storage_key())
        .await
        .context("Failed to purge preference record")?;

    if existed {
        println!("{}", format_success(&format!("Purged record for {}", identity.user_id)));
    } else {
        println!(
            "{}",
            format_warning(&format!("No stored record for {}", identity.user_id))
        );
    }
    Ok(())
}

fn cmd_tools() -> Result<()> {
    for spec in registry() {
        let marker = if spec.mutates_state { "writes" } else { "reads" };
        println!("{} ({})\n  {}", spec.name, marker, spec.description);
        println!(
            "  schema: {}\n",
            serde_json::to_string(&spec.input_schema).context("Failed to render schema")?
        );
    }
    Ok(())
}

async fn cmd_health(config: &Config) -> Result<()> {
    let dispatcher = build_dispatcher(config).await?;
    let report = dispatcher.health().await;

    print!("{}", report.format());
    if report.overall_status == HealthStatus::Unhealthy {
        anyhow::bail!("Service is unhealthy");
    }
    Ok(())
}
