use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use quill_core::{ErrorTrace, Level, LevelRegistry, Quill, QuillConfig, QuillResult};
use quill_utils::init_diagnostics;

/// A leveled logging facade with console, file and date-rotated file sinks.
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(version)]
#[command(about = "A leveled logging facade with console, file and date-rotated file sinks", long_about = None)]
struct Cli
{
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Render one log line and send it to the configured sinks
    Emit
    {
        /// Level to log at (custom names are accepted)
        #[arg(short, long, default_value = "info")]
        level: String,
        /// Name segment; repeat for a nested logger (--name server --name http)
        #[arg(short, long = "name")]
        names: Vec<String>,
        /// Error trace to merge into the line (first line like `Error: message`)
        #[arg(short, long)]
        error: Option<String>,
        /// Also append to this file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Also append to a date-rotated file in this directory
        #[arg(long)]
        rotate_dir: Option<PathBuf>,
        /// Disable console colors
        #[arg(long, default_value_t = false)]
        no_color: bool,
        /// Least severe level that is still emitted
        #[arg(short, long)]
        threshold: Option<String>,
        /// Message words, joined with spaces
        #[arg(required = true, trailing_var_arg = true)]
        message: Vec<String>,
    },
    /// List the default levels and their priorities
    Levels,
}

fn main()
{
    // Diagnostics go to stderr and are quiet unless RUST_LOG asks for more
    if let Err(e) = init_diagnostics() {
        eprintln!("Failed to initialize diagnostics: {}", e);
        process::exit(1);
    }

    let cli = Cli::parse();

    if let Err(e) = run_command(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_command(cli: Cli) -> QuillResult<()>
{
    match cli.command {
        Commands::Emit {
            level,
            names,
            error,
            file,
            rotate_dir,
            no_color,
            threshold,
            message,
        } => {
            // Environment first, flags override it
            let mut config = QuillConfig::from_env()?;
            if file.is_some() {
                config.file = file;
            }
            if rotate_dir.is_some() {
                config.rotate_dir = rotate_dir;
            }
            if no_color {
                config.colorize_console = false;
            }
            if let Some(threshold) = threshold {
                config.threshold = Level::from(threshold);
            }

            let quill = Quill::from_config(config)?;
            let logger = quill.get_logger(names);
            let message = message.join(" ");
            match error {
                Some(trace) => logger.log_with(level, message, ErrorTrace::new(trace)),
                None => logger.log(level, message),
            }

            // Drain file workers before exiting
            quill.shutdown();
            Ok(())
        }
        Commands::Levels => {
            print_levels(&LevelRegistry::default());
            Ok(())
        }
    }
}

fn print_levels(levels: &LevelRegistry)
{
    println!("\nLevels (most severe first):");
    for (level, priority) in levels.levels() {
        println!("  {:<8} {}", level.tag(), priority);
    }
}
