use anyhow::{Context, Result};
use clap::Parser;
use ctkargs::cli::Args;
use ctkargs::definition::ParserDefinition;
use ctkargs::{CommandLineParser, JsonSettings};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        println!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Build the parser described by the definition file and the tool options
fn build_parser(args: &Args) -> Result<CommandLineParser> {
    let definition = ParserDefinition::from_path(&args.definition)?;
    let mut parser = definition
        .build_parser()
        .with_context(|| format!("Invalid argument definition: {}", args.definition.display()))?;

    if args.strict {
        parser.set_strict_mode(true);
    }

    if let Some(path) = &args.settings {
        let store = JsonSettings::open(path)?;
        parser.set_settings(Box::new(store));
        parser.enable_settings(args.disable_settings_arg.as_deref());
        parser.merge_settings(!args.no_merge);
    }

    Ok(parser)
}

fn run(args: &Args) -> Result<()> {
    let mut parser = build_parser(args)?;

    if args.help_text {
        print!("{}", parser.help_text());
        return Ok(());
    }

    // Stage 1: Parse
    let parsed = parser.parse_arguments(&args.tokens)?;

    // Stage 2: Persist
    if args.save {
        let written = parser
            .store_parsed(&parsed)
            .context("Failed to save settings")?;
        tracing::info!(written, "parsed values stored");
    }

    // Stage 3: Report
    ctkargs::print_report(&parsed, parser.unparsed_arguments())?;

    Ok(())
}
