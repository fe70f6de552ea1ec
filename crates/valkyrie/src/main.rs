mod commands;
mod progress;
mod prompt;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "valkyrie")]
#[command(about = "Serverless APIs on AWS Lambda and API Gateway, one command away.", long_about = None)]
struct Cli {
    /// AWS profile from the shared credentials file
    #[arg(long, global = true, env = "AWS_PROFILE")]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an environment: role, policy, function and API
    Create {
        /// Project name (defaults to the directory name)
        #[arg(short, long)]
        name: Option<String>,
        /// Environment to create
        #[arg(short, long, env = "VALKYRIE_ENV", default_value = valkyrie_config::CreateDefaults::ENVIRONMENT)]
        env: String,
        /// AWS region (defaults to the project's or eu-west-1)
        #[arg(short, long, env = "AWS_REGION")]
        region: Option<String>,
        /// Function description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Function memory in MB
        #[arg(long, default_value_t = valkyrie_config::CreateDefaults::MEMORY_SIZE)]
        memory_size: i32,
        /// Function timeout in seconds
        #[arg(long, default_value_t = valkyrie_config::CreateDefaults::TIMEOUT)]
        timeout: i32,
        /// Function runtime
        #[arg(long, default_value = valkyrie_config::CreateDefaults::RUNTIME)]
        runtime: String,
        /// Function entry point
        #[arg(long, default_value = valkyrie_config::CreateDefaults::HANDLER)]
        handler: String,
        /// Project directory to deploy
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
        /// Keep partially created resources when a step fails
        #[arg(long)]
        no_revert: bool,
    },
    /// Push new code and/or configuration to a function
    Update {
        /// Update the staging environment
        #[arg(long, conflicts_with = "production")]
        staging: bool,
        /// Update the production environment
        #[arg(long)]
        production: bool,
        /// Update another environment by name
        #[arg(short, long, env = "VALKYRIE_ENV")]
        env: Option<String>,
        /// Update the function code (default)
        #[arg(long)]
        code: bool,
        /// Update the function configuration
        #[arg(long)]
        config: bool,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Delete every resource of the project
    Delete {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the progress output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match cli.command {
        Commands::Version => {
            println!("valkyrie {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Create {
            name,
            env,
            region,
            description,
            memory_size,
            timeout,
            runtime,
            handler,
            path,
            no_revert,
        } => {
            commands::create::handle(commands::create::CreateArgs {
                name,
                environment: env,
                region,
                description,
                memory_size,
                timeout,
                runtime,
                handler,
                path,
                revert: !no_revert,
                profile: cli.profile,
            })
            .await?;
        }
        Commands::Update {
            staging,
            production,
            env,
            code,
            config,
            yes,
        } => {
            let environment = if staging {
                Some("staging".to_string())
            } else if production {
                Some("production".to_string())
            } else {
                env
            };
            commands::update::handle(environment, code, config, yes, cli.profile).await?;
        }
        Commands::Delete { yes } => {
            commands::delete::handle(yes, cli.profile).await?;
        }
    }

    Ok(())
}
