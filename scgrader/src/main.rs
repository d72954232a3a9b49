use clap::{Parser, Subcommand};
use log::{error, info};
use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use scene_grader::{
    Config, SubmissionOutcome, Submitter, admin, input::ConsoleInput, interchange, logger,
    report, store,
};

#[derive(Parser, Debug)]
#[command(
    name = "scgrader",
    version,
    about = "Submit, grade and administer scene simulation assignments.",
    long_about = "Submit, grade and administer scene simulation assignments.\n\nSettings are read from GRADER_* environment variables and from a .env file."
)]
struct Cli {
    /// Database file, overrides GRADER_DATABASE
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// off, error, warn, info, debug or trace; overrides GRADER_LOG_LEVEL
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grade the submission in FOLDER for student UNI and record it once confirmed
    Submit { folder: PathBuf, uni: String },

    /// Define the three deliverables of a theme/milestone, or a single assignment
    Define {
        #[arg(long)]
        theme: Option<i32>,
        #[arg(long)]
        milestone: Option<i32>,
        /// Define one assignment field by field
        #[arg(long, conflicts_with_all = ["theme", "milestone"])]
        single: bool,
    },

    /// List every assignment with its scene directories
    List,

    /// Show the latest grade of UNI on every assignment
    Grades { uni: String },

    /// Create or update assignments from a JSON file
    Import { file: PathBuf },

    /// Write every assignment to a JSON file
    Export { file: PathBuf },
}

async fn run(command: Command, config: &Config) -> scene_grader::Result<ExitCode> {
    let db = store::connect(&config.database_path).await?;
    let mut out = io::stdout();
    let mut input = ConsoleInput;

    match command {
        Command::Submit { folder, uni } => {
            let outcome = Submitter::new(&db, config, &mut input, &mut out)
                .process(&uni, &folder)
                .await?;
            if let SubmissionOutcome::Committed(model) = outcome {
                info!("submission {} stored", model.id);
            }
        }
        Command::Define { single: true, .. } => {
            let new = admin::ask_assignment(&mut input, &mut out)?;
            let model = admin::define_assignment(&db, config, new).await?;
            writeln!(out, "Defined {model}")?;
        }
        Command::Define {
            theme, milestone, ..
        } => {
            let bundle = admin::ask_bundle(&mut input, &mut out, config, theme, milestone)?;
            for model in admin::define_assignments(&db, config, bundle).await? {
                writeln!(out, "Defined {model}")?;
            }
        }
        Command::List => admin::list_assignments(&db, &mut out).await?,
        Command::Grades { uni } => admin::print_grades(&db, &uni, &mut out).await?,
        Command::Import { file } => {
            let imported = interchange::import_assignments(&db, config, &file).await?;
            writeln!(out, "Imported {} assignment(s).", imported.len())?;
        }
        Command::Export { file } => {
            let n = interchange::export_assignments(&db, &file).await?;
            writeln!(out, "Exported {n} assignment(s) to {}.", file.display())?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Err(err) = logger::init_logger(&config.log_level, config.log_file.as_deref()) {
        eprintln!("could not set up logging: {err}");
    }

    match run(cli.command, &config).await {
        Ok(code) => code,
        Err(err) => {
            error!("{err:?}");
            let message = if err.is_fatal_environment() {
                err.to_string()
            } else {
                format!("Internal error ({err}).")
            };
            println!("{}", report::fatal_message(&message));
            ExitCode::FAILURE
        }
    }
}
