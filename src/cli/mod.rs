pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "recipe-api")]
#[command(about = "Recipe API - HTTP server and maintenance commands")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Print the route table for documentation tooling")]
    Routes {
        #[arg(long, value_enum, default_value_t = RouteFormat::Json, help = "Output format")]
        format: RouteFormat,
    },

    #[command(about = "Hash a password for seeding users")]
    HashPassword {
        #[arg(help = "Plain-text password")]
        password: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RouteFormat {
    Json,
    Yaml,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve::handle(AppConfig::from_env()).await,
        Commands::Migrate => commands::migrate::handle(AppConfig::from_env()).await,
        Commands::Routes { format } => commands::routes::handle(format),
        Commands::HashPassword { password } => commands::password::handle(&password),
    }
}
