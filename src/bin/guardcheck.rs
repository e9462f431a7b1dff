use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use guard_equiv::batch::{parse_pair, verify_batch};
use guard_equiv::config::Config;
use guard_equiv::factory::VarTable;
use guard_equiv::infer::infer_types;
use guard_equiv::io::{load_pairs, write_json_report, write_report};
use guard_equiv::names::NameMap;
use guard_equiv::oracle::{check_equivalence, Verdict};
use guard_equiv::parser::parse_expr_bounded;

#[derive(Parser)]
#[command(author, version, about = "Equivalence checker for guard expressions")]
struct Cli {
    /// Configuration file (JSON); flags below override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Width of integer variables in bits (default: chosen per pair)
    #[arg(long, value_name = "INT")]
    int_bits: Option<u32>,

    /// BDD node budget of one query
    #[arg(long, value_name = "INT")]
    max_nodes: Option<usize>,

    /// Time limit of one query in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Deepest expression nesting accepted
    #[arg(long, value_name = "INT")]
    max_depth: Option<usize>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a single pair of expressions
    Check { original: String, simplified: String },

    /// Check every pair of a CSV file with `original` and `simplified` columns
    Batch {
        input: PathBuf,

        /// Write the text report to FILE
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Write the JSON report to FILE
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,

        /// Reverse name mapping used to print counterexamples
        #[arg(long, value_name = "FILE")]
        names: Option<PathBuf>,

        /// Number of worker threads
        #[arg(short, long, value_name = "INT")]
        jobs: Option<usize>,
    },

    /// Show inferred types and the parsed tree of an expression
    Parse { expr: String },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => simplelog::LevelFilter::Warn,
        (false, 0) => simplelog::LevelFilter::Info,
        (false, 1) => simplelog::LevelFilter::Debug,
        (false, _) => simplelog::LevelFilter::Trace,
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let mut config = match &cli.config {
        Some(path) => {
            log::info!("Loading configuration from {:?}", path);
            Config::from_json(&std::fs::read_to_string(path)?)?
        }
        None => Config::default(),
    };
    if let Some(bits) = cli.int_bits {
        config = config.with_int_bits(bits);
    }
    if let Some(max_nodes) = cli.max_nodes {
        config = config.with_max_nodes(max_nodes);
    }
    if let Some(ms) = cli.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }
    if let Some(depth) = cli.max_depth {
        config = config.with_max_depth(depth);
    }

    let time_total = std::time::Instant::now();

    match cli.command {
        Commands::Check { original, simplified } => {
            let (table, a, b) = parse_pair(&original, &simplified, &config).map_err(|e| eyre!(e))?;
            println!("original   = {}", a.display(&table));
            println!("simplified = {}", b.display(&table));
            match check_equivalence(&table, &a, &b, &config) {
                Verdict::Equivalent => println!("Equivalent"),
                Verdict::NotEquivalent(cex) => {
                    println!("Not equivalent");
                    println!("Counterexample:");
                    for (name, value) in cex.iter() {
                        println!("  {} = {}", name, value);
                    }
                }
                Verdict::Error(e) => return Err(eyre!(e)),
            }
        }

        Commands::Batch {
            input,
            output,
            json,
            names,
            jobs,
        } => {
            if let Some(jobs) = jobs {
                config = config.with_jobs(jobs);
            }
            log::info!("Loading pairs from {:?}", input);
            let pairs = load_pairs(&input)?;
            let names = match names {
                Some(path) => NameMap::load(path)?,
                None => NameMap::default(),
            };

            let report = verify_batch(&pairs, &config);
            print!("{}", report.display(&names));

            if let Some(path) = output {
                write_report(&path, &report, &names)?;
                log::info!("Results saved to {:?}", path);
            }
            if let Some(path) = json {
                write_json_report(&path, &report)?;
                log::info!("JSON results saved to {:?}", path);
            }
        }

        Commands::Parse { expr } => {
            let types = infer_types(&expr, &config);
            for (name, inferred) in types.iter() {
                let kind = if inferred.constant { " (constant)" } else { "" };
                println!("{}: {}{}", name, inferred.ty, kind);
            }
            let mut table = VarTable::new(types);
            let tree = parse_expr_bounded(&expr, &mut table, config.max_depth).map_err(|e| eyre!(e))?;
            println!("{}", tree.display(&table));
        }
    }

    let time_total = time_total.elapsed();
    log::info!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
