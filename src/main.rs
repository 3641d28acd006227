use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use db_schema_viz::label::LabelRenderer;
use db_schema_viz::logging::init_logging;
use db_schema_viz::sql::{Dialect, parse_sql};
use db_schema_viz::{Schema, format_datatype};
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "db-schema-viz", version, about = "Database schema to ER diagram text")]
struct Cli {
    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format (compact|pretty|json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pretty-print a datatype descriptor
    Format {
        datatype: String,
    },
    /// Load a schema (.json, or a SQL dump) and print it
    Inspect {
        input: PathBuf,

        /// SQL dialect: auto, generic, postgres, mysql, duckdb
        #[arg(short, long, default_value = "auto")]
        dialect: Dialect,

        #[arg(long, value_enum, default_value_t = Output::Labels)]
        output: Output,

        /// Output file (default: stdout)
        #[arg(short = 'o', long = "out")]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Output {
    Json,
    Labels,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_level.as_deref(), cli.log_format.as_deref()) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(command: Command) -> db_schema_viz::Result<()> {
    match command {
        Command::Format { datatype } => {
            debug!(input_len = datatype.len(), "formatting datatype");
            println!("{}", format_datatype(&datatype));
            Ok(())
        }
        Command::Inspect {
            input,
            dialect,
            output,
            out,
        } => {
            let schema = load_schema(&input, dialect)?;
            info!(path = %input.display(), entities = schema.len(), "loaded schema");
            for reference in schema.dangling_references() {
                warn!(%reference, "foreign key target not in schema");
            }

            let mut text = match output {
                Output::Json => schema.to_json()?,
                Output::Labels => LabelRenderer::default().schema_labels(&schema),
            };
            text.push('\n');

            match out {
                Some(path) => fs::write(path, text)?,
                None => print!("{}", text),
            }
            Ok(())
        }
    }
}

fn load_schema(path: &Path, dialect: Dialect) -> db_schema_viz::Result<Schema> {
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Schema::from_json(&content)
    } else {
        parse_sql(&content, dialect)
    }
}
