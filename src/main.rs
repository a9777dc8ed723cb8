use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use portside::api::settings::SERVER_URL_SETTING;
use portside::api::{ApiClient, NodeApi};
use portside::app::App;
use portside::config::{default_config_path, Config};
use portside::console::{
    forms, port_links, ActionDispatcher, ContainerAction, ContainerListSync, DispatchContext,
    FormOutcome, NodeHeadSync, Outcome, PendingSet,
};
use portside::core::format_size;

/// Portside - terminal console for remote container hosts
#[derive(Parser, Debug)]
#[command(name = "portside")]
#[command(about = "Manage containers on console server nodes from the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Console server URL
    #[arg(short, long, value_name = "URL", global = true)]
    server: Option<String>,

    /// Node to operate on
    #[arg(short, long, value_name = "ID", global = true)]
    node: Option<String>,

    /// Enable debug logging to file
    #[arg(short, long, global = true)]
    debug: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the terminal console (default)
    Tui,

    /// List and control the node's containers
    Containers {
        #[command(subcommand)]
        command: ContainerCommand,
    },

    /// List, remove and prune the node's images
    Images {
        #[command(subcommand)]
        command: ImageCommand,
    },

    /// List registered nodes
    Nodes,

    /// Show or change the node's container base URL
    BaseUrl {
        /// New base URL
        #[arg(long, value_name = "URL", conflicts_with = "clear")]
        set: Option<String>,

        /// Remove the override so ports use the console host
        #[arg(long)]
        clear: bool,
    },

    /// Show or change the SERVER_URL setting
    ServerUrl {
        /// New server URL
        #[arg(long, value_name = "URL")]
        set: Option<String>,
    },

    /// Manage the compose library
    Compose {
        #[command(subcommand)]
        command: ComposeCommand,
    },

    /// Manage environments
    Env {
        #[command(subcommand)]
        command: EnvCommand,
    },

    /// Write the effective configuration to the config file
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug)]
enum ContainerCommand {
    /// List containers with their port URLs
    List,
    /// Start an exited container
    Start { id: String },
    /// Stop a container
    Stop { id: String },
    /// Restart a running container
    Restart { id: String },
    /// Delete a container
    Rm { id: String },
}

#[derive(Subcommand, Debug)]
enum ComposeCommand {
    /// List stored projects
    List,
    /// Print a project's definition
    Show { name: String },
    /// Store a definition read from a file
    Save {
        name: String,
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
        /// Rename the project while saving
        #[arg(long, value_name = "NAME")]
        rename: Option<String>,
    },
    /// Delete a project
    Rm { name: String },
}

#[derive(Subcommand, Debug)]
enum ImageCommand {
    /// List images sorted by name
    List {
        /// Include intermediate images
        #[arg(long)]
        all: bool,
    },
    /// Remove an image
    Rm {
        id: String,
        /// Remove even if tagged in several repositories or used by a stopped container
        #[arg(long)]
        force: bool,
    },
    /// Remove dangling images
    Prune {
        /// Remove every image no container uses
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand, Debug)]
enum EnvCommand {
    /// Create an environment
    Add { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Version) = cli.command {
        print_version();
        return Ok(());
    }

    let initializing = matches!(cli.command, Some(Commands::Init { .. }));
    let config = match &cli.config {
        // init may target a file that does not exist yet
        Some(path) if initializing && !path.exists() => Config::default(),
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    let config = apply_cli_overrides(config, &cli)?;

    init_logging(&cli, &config);
    info!("Starting Portside v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        None | Some(Commands::Tui) => run_tui(&config, cli.node.as_deref()).await,
        Some(Commands::Containers { command }) => {
            let node_id = config.node_id(cli.node.as_deref())?;
            run_containers(&config, &node_id, command).await
        }
        Some(Commands::Images { command }) => {
            let node_id = config.node_id(cli.node.as_deref())?;
            run_images(&config, &node_id, command).await
        }
        Some(Commands::Nodes) => list_nodes(&config).await,
        Some(Commands::BaseUrl { set, clear }) => {
            let node_id = config.node_id(cli.node.as_deref())?;
            let update = if clear { Some(String::new()) } else { set };
            base_url(&config, &node_id, update).await
        }
        Some(Commands::ServerUrl { set }) => server_url(&config, set).await,
        Some(Commands::Compose { command }) => run_compose(&config, command).await,
        Some(Commands::Env { command }) => run_env(&config, command).await,
        Some(Commands::Init { force }) => init_config(&config, cli.config.as_deref(), force),
        Some(Commands::Version) => Ok(()),
    }
}

fn init_config(config: &Config, path: Option<&Path>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path().context("Cannot determine the configuration directory")?,
    };
    config.create(&path, force)?;
    println!("Configuration written to {}", path.display());
    Ok(())
}

fn print_version() {
    println!("portside {}", env!("CARGO_PKG_VERSION"));
    println!(
        "Platform: {} {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
}

fn apply_cli_overrides(mut config: Config, cli: &Cli) -> Result<Config> {
    if let Some(server) = &cli.server {
        config.server.url = server.clone();
    }
    if let Some(node) = &cli.node {
        config.console.default_node = Some(node.clone());
    }
    config.validate()?;
    Ok(config)
}

fn default_log_path() -> PathBuf {
    directories::ProjectDirs::from("com", "portside", "portside")
        .map(|dirs| dirs.data_dir().join("portside.log"))
        .unwrap_or_else(|| std::env::temp_dir().join("portside.log"))
}

/// Log to a file only; stdout belongs to the TUI and command output
fn init_logging(cli: &Cli, config: &Config) {
    let log_level = if cli.debug {
        "debug"
    } else {
        cli.log_level.as_deref().unwrap_or(&config.logging.level)
    };

    let path = config.logging.file.clone().unwrap_or_else(default_log_path);
    let log_file = open_log_file(&path).ok();

    if let Some(file) = log_file {
        tracing_subscriber::fmt()
            .with_env_filter(format!("portside={}", log_level))
            .with_writer(Arc::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter("off").init();
    }
}

fn open_log_file(path: &Path) -> std::io::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new().create(true).append(true).open(path)
}

fn connect(config: &Config) -> Result<Arc<ApiClient>> {
    let client = ApiClient::new(&config.api_root(), config.request_timeout())
        .with_context(|| format!("Cannot use API root {}", config.api_root()))?;
    Ok(Arc::new(client))
}

/// Print a form result; anything but a save is an error
fn finish(outcome: FormOutcome) -> Result<()> {
    match outcome {
        FormOutcome::Saved { message } => {
            println!("{}", message);
            Ok(())
        }
        FormOutcome::Invalid { message }
        | FormOutcome::Failed { message }
        | FormOutcome::Busy { message } => anyhow::bail!(message),
    }
}

async fn run_tui(config: &Config, node: Option<&str>) -> Result<()> {
    let node_id = config.node_id(node)?;
    let mut app = App::new(config.clone(), node_id)?;
    app.run().await?;

    info!("Portside shutting down gracefully");
    Ok(())
}

async fn run_containers(config: &Config, node_id: &str, command: ContainerCommand) -> Result<()> {
    let (action, container_id) = match command {
        ContainerCommand::List => return list_containers(config, node_id).await,
        ContainerCommand::Start { id } => (ContainerAction::Start, id),
        ContainerCommand::Stop { id } => (ContainerAction::Stop, id),
        ContainerCommand::Restart { id } => (ContainerAction::Restart, id),
        ContainerCommand::Rm { id } => (ContainerAction::Delete, id),
    };

    let api: Arc<dyn NodeApi> = connect(config)?;
    let dispatcher = ActionDispatcher::new(
        Arc::clone(&api),
        ContainerListSync::new(api),
        PendingSet::new(),
    );

    match dispatcher
        .dispatch(node_id, &container_id, action, DispatchContext::List)
        .await
    {
        Outcome::Success {
            message,
            resync_error,
            ..
        } => {
            println!("{}", message);
            if let Some(error) = resync_error {
                eprintln!("Warning: container list could not be refreshed: {}", error);
            }
            Ok(())
        }
        Outcome::Failure { message, .. } => anyhow::bail!(message),
    }
}

async fn list_containers(config: &Config, node_id: &str) -> Result<()> {
    let client = connect(config)?;
    let origin = config.console_origin()?;

    let head = match client.get_node_head(node_id).await {
        Ok(head) => Some(head),
        Err(e) => {
            warn!("Could not load node {}: {}", node_id, e);
            None
        }
    };
    let containers = client.list_containers(node_id).await?;

    if containers.is_empty() {
        println!("No data to display");
        return Ok(());
    }

    println!("{:<12}  {:<24}  {:<10}  PORTS", "ID", "NAME", "STATE");
    for container in &containers.items {
        let ports = port_links(&container.ports, head.as_ref(), &origin)
            .into_iter()
            .map(|link| match link.url {
                Some(url) => format!("{} ({})", link.text, url),
                None => link.text,
            })
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<12}  {:<24}  {:<10}  {}",
            container.short_id(),
            container.name,
            container.state.as_str(),
            ports
        );
    }
    Ok(())
}

async fn run_images(config: &Config, node_id: &str, command: ImageCommand) -> Result<()> {
    let client = connect(config)?;

    match command {
        ImageCommand::List { all } => {
            let images = client.list_images(node_id, all).await?;
            if images.is_empty() {
                println!("No data to display");
                return Ok(());
            }

            println!("{:<12}  {:<32}  {:<16}  {:>10}  CREATED", "ID", "NAME", "TAG", "SIZE");
            for image in &images.items {
                let created = image
                    .created_at()
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!(
                    "{:<12}  {:<32}  {:<16}  {:>10}  {}",
                    image.short_id(),
                    image.name,
                    image.tag,
                    format_size(image.size),
                    created
                );
            }
            Ok(())
        }
        ImageCommand::Rm { id, force } => {
            client
                .remove_image(node_id, &id, force)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("Image removed.");
            Ok(())
        }
        ImageCommand::Prune { all } => {
            let report = client
                .prune_images(node_id, all)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            for item in &report.images_deleted {
                if !item.untagged.is_empty() {
                    println!("Untagged: {}", item.untagged);
                }
                if !item.deleted.is_empty() {
                    println!("Deleted: {}", item.deleted);
                }
            }
            println!(
                "Total reclaimed space: {}",
                format_size(i64::try_from(report.space_reclaimed).unwrap_or(i64::MAX))
            );
            Ok(())
        }
    }
}

async fn list_nodes(config: &Config) -> Result<()> {
    let nodes = connect(config)?.list_nodes().await?;
    if nodes.items.is_empty() {
        println!("No data to display");
        return Ok(());
    }

    println!("{:<6}  {:<24}  {:<8}  CONTAINER BASE URL", "ID", "NAME", "ONLINE");
    for node in &nodes.items {
        println!(
            "{:<6}  {:<24}  {:<8}  {}",
            node.id,
            node.name,
            if node.online { "yes" } else { "no" },
            node.container_base_url.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

async fn base_url(config: &Config, node_id: &str, update: Option<String>) -> Result<()> {
    let client = connect(config)?;

    match update {
        Some(url) => {
            let heads = NodeHeadSync::new(client);
            finish(forms::save_container_base_url(&heads, node_id, &url).await)
        }
        None => {
            let head = client.get_node_head(node_id).await?;
            match head.base_url_override() {
                Some(url) => println!("{}", url),
                None => println!(
                    "Not set; ports use {}",
                    config.console_origin()?.prefix()
                ),
            }
            Ok(())
        }
    }
}

async fn server_url(config: &Config, update: Option<String>) -> Result<()> {
    let client = connect(config)?;

    match update {
        Some(url) => finish(forms::save_server_url(&client, &url).await),
        None => {
            let setting = client.get_setting(SERVER_URL_SETTING).await?;
            if setting.value.is_empty() {
                println!(
                    "Not set; suggested: {}",
                    config.suggested_server_url().unwrap_or_default()
                );
            } else {
                println!("{}", setting.value);
            }
            Ok(())
        }
    }
}

async fn run_compose(config: &Config, command: ComposeCommand) -> Result<()> {
    let client = connect(config)?;
    let pending = PendingSet::new();

    match command {
        ComposeCommand::List => {
            let projects = client.list_compose_projects().await?;
            if projects.items.is_empty() {
                println!("No data to display");
            }
            for project in &projects.items {
                println!("{}", project.project_name);
            }
            Ok(())
        }
        ComposeCommand::Show { name } => {
            let project = client.get_compose_project(&name).await?;
            print!("{}", project.definition);
            Ok(())
        }
        ComposeCommand::Save { name, file, rename } => {
            let definition = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read definition: {}", file.display()))?;
            let new_name = rename.unwrap_or_else(|| name.clone());
            finish(forms::save_compose_project(&client, &pending, &name, &new_name, definition).await)
        }
        ComposeCommand::Rm { name } => {
            finish(forms::delete_compose_project(&client, &pending, &name).await)
        }
    }
}

async fn run_env(config: &Config, command: EnvCommand) -> Result<()> {
    let client = connect(config)?;
    match command {
        EnvCommand::Add { name } => {
            finish(forms::add_environment(&client, &PendingSet::new(), &name).await)
        }
    }
}
