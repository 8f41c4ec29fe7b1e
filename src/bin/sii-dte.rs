//! Command-line reader for SII DTE XML files.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use glob::glob;
use tracing::{Level, debug, warn};
use tracing_subscriber::FmtSubscriber;

use sii_dte::core::RecordTable;
use sii_dte::export::{self, ExportConfigBuilder};
use sii_dte::sii::{self, SourceFile};

/// Read SII electronic tax documents (EnvioDTE / RespuestaDTE) into a table
#[derive(Parser)]
#[command(name = "sii-dte")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input XML files or glob patterns, processed in the given order
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Output file (defaults to facturas_sii.xlsx for xlsx, stdout otherwise)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Worksheet name for xlsx output
    #[arg(long, default_value = "Sheet1")]
    sheet_name: String,

    /// Field delimiter for csv output
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Omit the header row in csv/xlsx output
    #[arg(long)]
    no_header: bool,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Aligned text grid on stdout
    Table,
    /// Excel workbook
    Xlsx,
    /// Comma-separated values
    Csv,
    /// JSON array of records
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let paths = expand_inputs(&cli.inputs)?;
    let mut sources = Vec::with_capacity(paths.len());
    for path in &paths {
        match SourceFile::read(path) {
            Ok(file) => sources.push(file),
            Err(e) => warn!("skipping {}: {}", path.display(), e),
        }
    }

    let extraction = sii::extract_sources(&sources);
    let table = extraction.table();
    eprintln!("{}", table.summary());

    let mut builder = ExportConfigBuilder::new()
        .sheet_name(cli.sheet_name.as_str())
        .csv_delimiter(cli.delimiter)
        .include_header(!cli.no_header);
    if let Some(name) = cli
        .output
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
    {
        builder = builder.file_name(name);
    }
    let config = builder.build()?;

    match cli.format {
        OutputFormat::Table => print!("{}", render_grid(&table)),
        OutputFormat::Xlsx => {
            let xlsx = export::to_xlsx(&table, &config)?;
            let path = cli
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(&xlsx.file_name));
            fs::write(&path, &xlsx.bytes)?;
            debug!("wrote {} ({})", path.display(), xlsx.mime_type);
        }
        OutputFormat::Csv => {
            let csv = export::to_csv(&table, &config)?;
            write_text(cli.output.as_ref(), &csv)?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&table)?;
            write_text(cli.output.as_ref(), &json)?;
        }
    }

    if extraction.error_count() > 0 {
        warn!(
            "{} of {} files could not be extracted",
            extraction.error_count(),
            extraction.files_read()
        );
    }
    Ok(())
}

/// Expand glob patterns, keeping plain paths that match nothing so the read
/// error surfaces for them.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        let before = paths.len();
        for entry in glob(input)? {
            match entry {
                Ok(path) if path.is_file() => paths.push(path),
                Ok(_) => {}
                Err(e) => warn!("unreadable path: {}", e),
            }
        }
        if paths.len() == before {
            paths.push(PathBuf::from(input));
        }
    }
    Ok(paths)
}

fn write_text(output: Option<&PathBuf>, text: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => fs::write(path, text)?,
        None => print!("{text}"),
    }
    Ok(())
}

/// Plain text grid: header, separator, one line per record.
fn render_grid(table: &RecordTable) -> String {
    let headers: Vec<&str> = table.columns().iter().map(|c| c.label()).collect();
    let grid: Vec<Vec<&str>> = table.grid().collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &grid {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_grid_line(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let rule: Vec<&str> = rule.iter().map(String::as_str).collect();
    push_grid_line(&mut out, &rule, &widths);
    for row in &grid {
        push_grid_line(&mut out, row, &widths);
    }
    out
}

fn push_grid_line(out: &mut String, cells: &[&str], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{cell:<w$}", w = *w))
        .collect();
    out.push_str(line.join(" | ").trim_end());
    out.push('\n');
}
