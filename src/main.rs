use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

use circlecheck::SchemaValidator;
use circlecheck::schema::{REQUIRED_FILENAME, section_rules};
use circlecheck::validation::FileReport;

#[derive(Parser)]
#[command(
    name = "circlecheck",
    about = "A CLI tool that validates circle.yml files before they are pushed to CircleCI",
    version,
    author,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format for validation results
    #[arg(
        short,
        long,
        value_enum,
        default_value = "human",
        env = "CIRCLECHECK_FORMAT",
        global = true
    )]
    format: OutputFormat,

    /// Enable verbose output (use -vv for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one or more circle.yml files (default command)
    Validate {
        /// Files to validate
        #[arg(default_value = REQUIRED_FILENAME)]
        paths: Vec<PathBuf>,
    },

    /// Print the sections and subsections circle.yml may contain
    Sections,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Validate { paths }) => {
            validate_command(&paths, cli.format)?;
        }
        Some(Commands::Sections) => {
            sections_command();
        }
        None => {
            // Default to validating ./circle.yml
            validate_command(&[PathBuf::from(REQUIRED_FILENAME)], cli.format)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbose {
        0 => EnvFilter::new("circlecheck=warn"), // Default: warnings and errors only
        1 => EnvFilter::new("circlecheck=info"), // -v: info messages
        _ => EnvFilter::new("circlecheck=debug"), // -vv or more: full debug
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn validate_command(paths: &[PathBuf], format: OutputFormat) -> Result<()> {
    let validator = SchemaValidator::new();
    let mut reports: Vec<FileReport> = Vec::with_capacity(paths.len());

    for path in paths {
        let inspection = validator.inspect(path);

        if format == OutputFormat::Human {
            if inspection.report.valid {
                println!("{} {}", "✓".green(), path.display());
            } else {
                println!("{} {}", "✗".red(), path.display());
                if let Some(diagnostic) = &inspection.diagnostic {
                    eprintln!("{diagnostic:?}");
                }
            }
        }

        reports.push(inspection.report);
    }

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    let failed = reports.iter().filter(|report| !report.valid).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} file(s) failed validation", reports.len());
    }

    if format == OutputFormat::Human {
        println!("\n✅ All validations passed!");
    }
    Ok(())
}

fn sections_command() {
    for rule in section_rules() {
        print!("{rule}");
    }
}
