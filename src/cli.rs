use crate::observable::check_file_extension;
use crate::prelude::*;
use crate::report::write_report;
use clap::{ArgAction, Parser};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "heredity",
          version,
          about = "Finds probabilities of inheriting a trait for every person in a family",
          long_about = None,
          )]
pub struct Cli {
    #[clap(help = "Pedigree file with name, mother, father and trait columns")]
    #[clap(value_name = "CSV")]
    #[arg(value_parser = check_pedigree_file)]
    pub input: PathBuf,

    #[clap(long = "founder-prior")]
    #[clap(value_name = "P0,P1,P2")]
    #[clap(help = "Gene distribution for founders with unknown trait (default: no probability mass)")]
    #[arg(value_parser = parse_distribution)]
    pub founder_prior: Option<GeneDistribution>,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (-v info, -vv debug, -vvv per-individual trace)")]
    pub verbosity: u8,
}

/// Log level for the number of `-v` flags given.
pub fn verbosity_filter(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init_verbose(args: &Cli) {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match level {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} {} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                env!("CARGO_PKG_NAME"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(verbosity_filter(args.verbosity))
        .init();
}

/// Loads the pedigree, resolves it and writes the report to `writer`.
pub fn run<W: Write>(args: &Cli, writer: &mut W) -> Result<()> {
    let pedigree = load_pedigree(&args.input)?;

    let mut propagator = Propagator::new();
    if let Some(prior) = args.founder_prior {
        propagator.founder_prior(prior);
    }
    let results = propagator.resolve(&pedigree)?;
    log::info!(
        "Expected number of individuals expressing the trait: {:.4}",
        results.expected_affected()
    );

    write_report(&pedigree, &results, writer)?;
    writer.flush()?;
    Ok(())
}

pub fn handle_error_and_exit(err: Error) -> ! {
    log::error!("{}", err);
    std::process::exit(1);
}

fn check_pedigree_file(s: &str) -> std::result::Result<PathBuf, String> {
    let path = Path::new(s);
    if !path.exists() {
        return Err(format!("File does not exist: {}", path.display()));
    }
    check_file_extension(path, "csv")
        .map(Path::to_path_buf)
        .map_err(|e| e.to_string())
}

fn parse_distribution(s: &str) -> std::result::Result<GeneDistribution, String> {
    let values = s
        .split(',')
        .map(|x| x.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("Invalid probability in '{}': {}", s, e))?;
    if values.len() != 3 {
        return Err(format!("Expected three probabilities for 0, 1 and 2 copies, got {}", values.len()));
    }
    let gene = GeneDistribution::new(values[0], values[1], values[2]);
    if !gene.is_normalized(1e-9) {
        return Err(format!("Probabilities must be non-negative and sum to 1: {}", s));
    }
    Ok(gene)
}
