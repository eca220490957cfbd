use clap::Parser;
use eframe::{NativeOptions, egui};
use mol_annotator::{
    about, app,
    config::{AnnotatorConfig, CliArgs},
    logging,
    session::Session,
};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "molannot", about = "Review molecule transformation records")]
struct Cli {
    /// Print version and build information
    #[arg(long, short = 'V')]
    version: bool,

    #[command(flatten)]
    args: CliArgs,
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();
    if cli.version {
        println!("{}", about::version_cli_text());
        return ExitCode::SUCCESS;
    }

    let config = AnnotatorConfig::from(cli.args);
    let session = match Session::open(&config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 800.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Molecule Annotator",
        options,
        Box::new(move |_cc| Ok(Box::new(app::AnnotatorApp::new(config, session)))),
    );
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
