/*!
 * Command-line interface for promptgen
 */

use std::io;
use std::process;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};

use promptgen::config::{Args, Config};
use promptgen::report::{ReportFormat, Reporter};
use promptgen::{tui, ArtifactWriter, KeyMap, Result, Session};

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "promptgen", &mut io::stdout());
        return;
    }

    setup_logging(args.quiet, args.verbose);

    let exit_code = match run(args) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run(args: Args) -> Result<()> {
    // Create and validate configuration
    let config = Config::from_args(args)?;
    config.validate()?;

    if config.is_one_shot() {
        run_one_shot(&config)
    } else {
        run_interactive(&config)
    }
}

fn run_one_shot(config: &Config) -> Result<()> {
    let selection = config.one_shot_selection();

    let progress = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%) Elapsed: {elapsed_precise}")
    {
        progress.set_style(style);
    }
    progress.set_prefix("Generating");

    let writer = ArtifactWriter::new(config).with_progress(progress.clone());
    let result = writer.write(&selection);
    progress.finish_and_clear();

    println!("{}", ArtifactWriter::status_line(&result));
    let report = result?;
    Reporter::new(ReportFormat::ConsoleTable).print_report(&report);
    Ok(())
}

fn run_interactive(config: &Config) -> Result<()> {
    let keymap = match &config.keybinds_file {
        Some(path) => KeyMap::load_or_create(path),
        None => KeyMap::default(),
    };

    let initial = config.base_dir.join(&config.initial_path);
    let mut session = Session::new(&initial, ArtifactWriter::new(config));
    tui::run(&mut session, &keymap)?;

    println!(
        "Exited browser. If output was generated, it is in '{}'.",
        config.output_file.display()
    );
    Ok(())
}
