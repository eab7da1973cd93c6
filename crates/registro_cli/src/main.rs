//! `registro` command-line front end.
//!
//! # Responsibility
//! - Stand in for the registry's presentation layer: search box, metrics,
//!   chart, add/edit/delete forms and export buttons.
//! - Keep all semantics in `registro_core`; this binary only parses input
//!   and renders results.
//!
//! # Usage
//!
//! ```bash
//! registro --data registro2.csv list --query espera
//! registro add --set fecha_de_ingreso=2024-03-15 --set estado=ESPERA
//! registro edit 4 --query espera --set estado=AUTORIZADO
//! registro export xlsx --query autorizado
//! ```

mod render;

use clap::{Parser, Subcommand, ValueEnum};
use log::error;
use registro_core::export::{CSV_FILE_NAME, XLSX_FILE_NAME};
use registro_core::service::form::field_kind;
use registro_core::{
    default_log_level, init_logging, CsvTableRepository, FormValue, FormValues, RecordService,
    DEFAULT_DATA_PATH,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "registro",
    version,
    about = "Registro de Comercio Ambulatorio: search, edit and export the registry file"
)]
struct Cli {
    /// Registry file (`;`-delimited, UTF-8).
    #[arg(long, global = true, default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when omitted.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the records matching a search.
    List {
        /// Case-insensitive text searched across all columns.
        #[arg(long, short, default_value = "")]
        query: String,
        /// Print JSON instead of a text table.
        #[arg(long)]
        json: bool,
    },
    /// Show totals and the distribution by status.
    Stats {
        #[arg(long, short, default_value = "")]
        query: String,
        #[arg(long)]
        json: bool,
    },
    /// List the inputs of the add form.
    Fields,
    /// Register a new record.
    Add {
        /// Field value as `column=value`; repeat per field.
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    /// Show the edit form of a visible record.
    Show {
        index: usize,
        #[arg(long, short, default_value = "")]
        query: String,
    },
    /// Update a visible record.
    Edit {
        index: usize,
        #[arg(long, short, default_value = "")]
        query: String,
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    /// Delete a visible record.
    Delete {
        index: usize,
        #[arg(long, short, default_value = "")]
        query: String,
    },
    /// Export the records matching a search.
    Export {
        format: ExportFormat,
        #[arg(long, short, default_value = "")]
        query: String,
        /// Output path; defaults to `registros.csv` / `registros.xlsx`.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Xlsx,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let service = RecordService::new(CsvTableRepository::new(&cli.data));

    match cli.command {
        Commands::List { query, json } => {
            let view = service.view(&query)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view.filtered)?);
            } else {
                print!("{}", render::records(&view.filtered));
            }
        }
        Commands::Stats { query, json } => {
            let view = service.view(&query)?;
            let metrics = view.metrics();
            let distribution = view.status_distribution();
            if json {
                let payload = serde_json::json!({
                    "metrics": metrics,
                    "status_distribution": distribution,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                print!("{}", render::metrics(&metrics));
                if let Some(bars) = distribution {
                    print!("{}", render::bar_chart(&bars));
                }
            }
        }
        Commands::Fields => {
            print!("{}", render::fields(&service.add_form()?));
        }
        Commands::Add { set } => {
            let index = service.add_record(&form_values(set))?;
            println!("Registro guardado (índice {index}).");
        }
        Commands::Show { index, query } => {
            print!("{}", render::edit_form(&service.edit_form(&query, index)?));
        }
        Commands::Edit { index, query, set } => {
            service.edit_record(&query, index, &form_values(set))?;
            println!("Registro actualizado (índice {index}).");
        }
        Commands::Delete { index, query } => {
            service.delete_record(&query, index)?;
            println!("Registro eliminado (índice {index}).");
        }
        Commands::Export { format, query, out } => {
            let (bytes, default_name) = match format {
                ExportFormat::Csv => (service.export_csv(&query)?, CSV_FILE_NAME),
                ExportFormat::Xlsx => (service.export_xlsx(&query)?, XLSX_FILE_NAME),
            };
            let out = out.unwrap_or_else(|| PathBuf::from(default_name));
            std::fs::write(&out, bytes)?;
            println!("Exportado a {}.", out.display());
        }
    }

    Ok(())
}

/// Converts `--set` pairs into typed form values using each column's kind.
fn form_values(assignments: Vec<(String, String)>) -> FormValues {
    assignments
        .into_iter()
        .map(|(column, raw)| {
            let value = FormValue::parse_for(field_kind(&column), &raw);
            (column, value)
        })
        .collect()
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected column=value, got `{raw}`"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in `{raw}`"));
    }
    Ok((column.to_string(), value.to_string()))
}
