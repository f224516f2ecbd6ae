use assignd::cli::{
    assign, handle_completions, handle_config_init, handle_config_validate, health, rank, Cli,
    Commands, ConfigCommands,
};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Assign(args) => match assign::handle_assign(&args).await {
            Ok((output, outcome)) => {
                println!("{}", output);
                let code = assign::exit_code(&outcome);
                if code != 0 {
                    std::process::exit(code);
                }
                Ok(())
            }
            Err(e) => Err(e),
        },
        Commands::Rank(args) => rank::handle_rank(&args).await.map(|output| {
            println!("{}", output);
        }),
        Commands::Health(args) => health::handle_health(&args).await.map(|output| {
            println!("{}", output);
        }),
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
            ConfigCommands::Validate(args) => handle_config_validate(&args).map(|msg| {
                println!("{}", msg);
            }),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
