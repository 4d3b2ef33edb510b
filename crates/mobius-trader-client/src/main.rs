//! mt7: command line client for the MobiusTrader API.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use serde_json::Value;

use mobius_trader::parse_expr;
use mobius_trader_client::cli::SearchArgs;
use mobius_trader_client::{resolve_config, ConfigOverrides, MobiusTrader};

#[derive(Parser)]
#[command(
    name = "mt7",
    about = "Command line client for the MobiusTrader brokerage API",
    version
)]
struct Cli {
    /// Server host. Also reads MT7_HOST.
    #[arg(long)]
    host: Option<String>,

    /// Server port. Also reads MT7_PORT.
    #[arg(long)]
    port: Option<u16>,

    /// Broker id used for authentication. Also reads MT7_BROKER_ID.
    #[arg(long)]
    broker_id: Option<u64>,

    /// Broker password. Also reads MT7_PASSWORD.
    #[arg(long)]
    password: Option<String>,

    /// Path to a JSON config file. Also reads MT7_CONFIG.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a computed-column expression and print its tree.
    Expr {
        /// Expression, e.g. "(Profit-Swap)*2".
        expression: String,
    },

    /// Build a search document and print it without contacting the server.
    Compile(SearchArgs),

    /// Run a search and print the rows.
    Search(SearchArgs),

    /// Call an API method with raw JSON parameters.
    Call {
        /// Method name, e.g. AccountGet.
        method: String,

        /// Parameters as a JSON object.
        #[arg(default_value = "{}")]
        params: String,
    },

    /// Print the broker's symbol table.
    Symbols,

    /// Print the broker's currency table.
    Currencies,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   mt7 completions bash > ~/.local/share/bash-completion/completions/mt7
    ///   mt7 completions zsh > ~/.zfunc/_mt7
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            host: self.host.clone(),
            port: self.port,
            broker_id: self.broker_id,
            password: self.password.clone(),
            terminal_url: None,
        }
    }

    async fn connect(&self) -> anyhow::Result<MobiusTrader> {
        let config = resolve_config(self.overrides())?;
        Ok(MobiusTrader::connect(config).await?)
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Expr { expression } => {
            print_json(&parse_expr(expression)?)?;
        }

        Commands::Compile(args) => {
            let query = args.to_builder()?.compile()?;
            print_json(&query)?;
        }

        Commands::Search(args) => {
            let builder = args.to_builder()?;
            let client = cli.connect().await?;
            let rows = builder.execute(&client).await?;
            tracing::info!("{} row(s)", rows.len());
            print_json(&rows.into_raw())?;
        }

        Commands::Call { method, params } => {
            let params: Value = serde_json::from_str(params)?;
            let client = cli.connect().await?;
            print_json(&client.call(method, params).await?)?;
        }

        Commands::Symbols => {
            let client = cli.connect().await?;
            print_json(&client.symbols())?;
        }

        Commands::Currencies => {
            let client = cli.connect().await?;
            print_json(&client.currencies())?;
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "mt7", &mut std::io::stdout());
        }
    }

    Ok(())
}
