//! savetool - Inspect and migrate savegame/scenario files from the command
//! line.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use save::{
    load_savegame, load_scenario, read_savegame_info, write_savegame, write_scenario,
    SAVE_GAME_CURRENT_VERSION,
};

#[derive(Parser, Debug)]
#[command(name = "savetool")]
#[command(author, version, about = "Savegame and scenario inspection tool", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the summary a file picker would show for a savegame
    Info {
        /// Savegame file
        file: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load a savegame of any supported version and rewrite it in the
    /// current format
    Resave {
        /// Input savegame
        input: PathBuf,

        /// Output path (defaults to rewriting the input)
        output: Option<PathBuf>,
    },

    /// Load a scenario of any supported version and rewrite it in the
    /// current format
    ResaveScenario {
        /// Input scenario
        input: PathBuf,

        /// Output path (defaults to rewriting the input)
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), String> {
    match args.command {
        Commands::Info { file, json } => {
            let info = read_savegame_info(&file).map_err(|e| e.to_string())?;
            if json {
                let rendered =
                    serde_json::to_string_pretty(&info).map_err(|e| e.to_string())?;
                println!("{rendered}");
            } else {
                println!("file:        {}", file.display());
                println!("version:     {:#x}", info.version);
                println!("mission:     {}", info.campaign_mission);
                println!("description: {}", info.description);
                println!("population:  {}", info.population);
                println!("treasury:    {}", info.treasury);
                println!("year:        {}", info.game_year);
            }
            Ok(())
        }
        Commands::Resave { input, output } => {
            let save = load_savegame(&input).map_err(|e| e.to_string())?;
            let target = output.unwrap_or(input);
            write_savegame(&save, &target).map_err(|e| e.to_string())?;
            println!(
                "wrote {} at version {:#x}",
                target.display(),
                SAVE_GAME_CURRENT_VERSION.0
            );
            Ok(())
        }
        Commands::ResaveScenario { input, output } => {
            let scenario = load_scenario(&input).map_err(|e| e.to_string())?;
            let target = output.unwrap_or(input);
            write_scenario(&scenario, &target).map_err(|e| e.to_string())?;
            println!("wrote {}", target.display());
            Ok(())
        }
    }
}
