use clap::Parser;
use healthwatch::cli::{
    handle_config_init, run_check, run_history, run_watch, Cli, Commands, ConfigCommands,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check(args) => run_check(&args).await,
        Commands::Watch(args) => run_watch(&args).await,
        Commands::History(args) => run_history(&args).await,
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
