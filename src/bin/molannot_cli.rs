use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use mol_annotator::{
    about,
    config::{AnnotatorConfig, CliArgs},
    logging,
    molecule_render::{DefaultRenderer, MoleculeRenderer},
    persister::RecordEdit,
    session::Session,
};
use serde::Serialize;
use std::{path::PathBuf, process::ExitCode};

#[derive(Parser, Debug)]
#[command(
    name = "molannot_cli",
    about = "Headless access to molecule annotation datasets"
)]
struct Cli {
    /// Print version and build information
    #[arg(long, short = 'V')]
    version: bool,

    #[command(flatten)]
    args: CliArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Benchmark name, record count and rationale sections
    Summary,
    /// Resolved fields of one record
    Show { index: usize },
    /// Apply an edit to one record and write its output file
    Save {
        index: usize,
        #[arg(long)]
        total: Option<i64>,
        #[arg(long)]
        error: Option<i64>,
        /// Section value as NAME=TEXT; may be repeated
        #[arg(long = "section", value_parser = parse_section)]
        sections: Vec<(String, String)>,
    },
    /// Render one structure string to a PNG file
    Render { structure: String, output: PathBuf },
}

#[derive(Serialize)]
struct DatasetSummary {
    data_path: String,
    benchmark_name: String,
    record_count: usize,
    sections: Vec<String>,
    output_dir: String,
}

#[derive(Debug, Serialize)]
struct SaveSummary {
    index: usize,
    output_path: String,
    rewrote_input: bool,
    message: String,
}

fn parse_section(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(name, text)| (name.trim().to_string(), text.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected NAME=TEXT, got '{value}'"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Could not serialize JSON output")?;
    println!("{text}");
    Ok(())
}

fn apply_edit(
    session: &mut Session,
    index: usize,
    total: Option<i64>,
    error: Option<i64>,
    sections: Vec<(String, String)>,
) -> Result<SaveSummary> {
    let current = session.peek(index)?;
    let mut edit = RecordEdit {
        total_entity: total.unwrap_or(current.total_entity),
        error_entity: error.unwrap_or(current.error_entity),
        section_values: current.section_values,
    };
    for (name, text) in sections {
        let slot = current
            .sections
            .iter()
            .position(|s| *s == name)
            .ok_or_else(|| {
                anyhow!(
                    "Unknown section '{name}', expected one of: {}",
                    current.sections.join(", ")
                )
            })?;
        edit.section_values[slot] = text;
    }

    let report = session.save(index, &edit)?;
    Ok(SaveSummary {
        index: report.index,
        output_path: report.output_path.display().to_string(),
        rewrote_input: report.rewrote_input,
        message: report.message,
    })
}

fn run(cli: Cli) -> Result<()> {
    if cli.version {
        println!("{}", about::version_cli_text());
        return Ok(());
    }
    let Some(command) = cli.command else {
        bail!("Missing command, see --help");
    };

    let config = AnnotatorConfig::from(cli.args);
    match command {
        Command::Render { structure, output } => {
            let image = DefaultRenderer::default().render(&structure)?;
            image.save_png(&output)?;
            println!("Wrote depiction of '{structure}' to '{}'", output.display());
            Ok(())
        }
        Command::Summary => {
            let session = Session::open(&config)?;
            print_json(&DatasetSummary {
                data_path: config.data_path.display().to_string(),
                benchmark_name: session.persister().benchmark_name().to_string(),
                record_count: session.len(),
                sections: session.schema().sections().to_vec(),
                output_dir: config.output_dir.display().to_string(),
            })
        }
        Command::Show { index } => {
            let session = Session::open(&config)?;
            print_json(&session.peek(index)?)
        }
        Command::Save {
            index,
            total,
            error,
            sections,
        } => {
            let mut session = Session::open(&config)?;
            print_json(&apply_edit(&mut session, index, total, error, sections)?)
        }
    }
}

fn main() -> ExitCode {
    logging::init();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
