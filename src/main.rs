use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use vppsh::{config::DEFAULT_CONFIG_PATH, CommandTable, Config, Context, Error, Params, SessionKey};

/// Runs one router-style command against VPP
#[derive(Parser, Debug)]
#[command(name = "vppsh")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Session token; defaults to the parent process id
    #[arg(long)]
    session: Option<String>,

    /// VPP CLI socket, overrides the configuration file
    #[arg(long)]
    socket: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// List the available commands and exit
    #[arg(long)]
    list: bool,

    /// Command to run, e.g. show_interfaces
    #[arg(required_unless_present = "list")]
    command: Option<String>,

    /// Command parameters, as key=value
    params: Vec<String>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

async fn run(cli: Cli, table: &CommandTable) -> vppsh::Result<String> {
    let mut config = Config::load(&cli.config)?;
    if let Some(socket) = cli.socket {
        config.socket = socket;
    }
    let session = match cli.session {
        Some(ref token) => SessionKey::new(token)?,
        None => SessionKey::from_parent_process(),
    };
    let params = Params::parse_args(&cli.params)?;
    let ctx = Context::new(config, session);
    let command = cli.command.unwrap_or_default();
    table.dispatch(&command, &ctx, &params).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let table = CommandTable::new();
    if cli.list {
        for name in table.names() {
            println!("{}", name);
        }
        return ExitCode::SUCCESS;
    }

    match run(cli, &table).await {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        // engine replies already read like error messages
        Err(err @ Error::EngineError(_)) => {
            println!("{}", err);
            ExitCode::FAILURE
        }
        Err(err) => {
            println!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
