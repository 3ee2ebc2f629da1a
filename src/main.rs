use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use clang_format_discover::{
    collect, config, discover, find_seed_file, load_seed, should_use_colors, ClangFormat, Colors,
    ConsoleReporter, SearchOptions, Seed, SourceCorpus, DEFAULT_MAX_PASSES,
};

const FILE_LIST_PRINT_MAX: usize = 10;
const SUPPORTED_VERSION_PREFIX: &str = "clang-format version 13.";

#[derive(Parser)]
#[command(name = "clang-format-discover")]
#[command(version, about = "Infer a .clang-format configuration from existing sources")]
struct Cli {
    /// Source files or directories to measure against
    #[arg(default_value = ".")]
    paths: Vec<String>,

    /// Seed configuration file (overrides the upward search for .clang-format)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Where to write the discovered configuration
    #[arg(short, long, value_name = "PATH", default_value = ".clang-format")]
    output: PathBuf,

    /// Print the discovered configuration to stdout instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Maximum number of search passes over the option set
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_PASSES)]
    max_passes: usize,

    /// Number of parallel formatter invocations (default: one per core)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Per-invocation formatter timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    timeout: u64,

    /// clang-format executable to invoke
    #[arg(long, value_name = "EXE", default_value = "clang-format")]
    clang_format: PathBuf,

    /// Suppress per-decision output and the progress bar
    #[arg(short, long)]
    quiet: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let colors = Colors::new(should_use_colors(cli.no_color));

    if let Some(jobs) = cli.jobs {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
        {
            eprintln!("{} {e}", colors.warning("Warning:"));
        }
    }

    let formatter = ClangFormat::new()
        .with_program(&cli.clang_format)
        .with_timeout(Duration::from_secs(cli.timeout));
    if !verify_formatter(&formatter, &colors) {
        return ExitCode::from(1);
    }

    let seed = match load_seed_file(&cli, &colors) {
        Ok(seed) => seed,
        Err(code) => return code,
    };
    for warning in &seed.warnings {
        eprintln!("{} {warning}", colors.warning("Warning:"));
    }

    let corpus = match collect(&cli.paths) {
        Ok(corpus) => corpus,
        Err(e) => {
            eprintln!("{} {e}", colors.error("Error:"));
            return ExitCode::from(1);
        }
    };
    print_corpus(&corpus, &colors, cli.quiet);

    let options = SearchOptions {
        max_passes: cli.max_passes,
        ..Default::default()
    };
    install_interrupt_handler(&options, &colors);

    let reporter = ConsoleReporter::new(colors, cli.quiet, !cli.quiet);
    let started = Instant::now();
    let discovery = discover(&corpus, &formatter, &seed, &options, &reporter);
    if !cli.quiet {
        eprintln!("Processing time: {:.1}s", started.elapsed().as_secs_f64());
    }

    if discovery.cancelled {
        eprintln!(
            "{} interrupted, emitting the best configuration found so far",
            colors.warning("Warning:")
        );
    } else if !discovery.converged {
        eprintln!(
            "{} no fixed point within {} passes, emitting the best configuration found",
            colors.warning("Warning:"),
            discovery.passes
        );
    }
    if !discovery.undetermined.is_empty() {
        eprintln!(
            "{} clang-format rejected every candidate for: {} (left at defaults)",
            colors.warning("Warning:"),
            discovery.undetermined.join(", ")
        );
    }

    if cli.dry_run {
        match config::render(&seed, &discovery.config) {
            Ok(document) => {
                print!("{document}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{} {e}", colors.error("Error:"));
                ExitCode::from(1)
            }
        }
    } else {
        match config::write(&cli.output, &seed, &discovery.config) {
            Ok(()) => {
                if !cli.quiet {
                    eprintln!(
                        "Saving best configuration to {}",
                        cli.output.display()
                    );
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{} {e}", colors.error("Error:"));
                ExitCode::from(1)
            }
        }
    }
}

/// The catalog was extracted from the clang-format 13 documentation; any
/// other version still works, it just may reject or ignore some options.
fn verify_formatter(formatter: &ClangFormat, colors: &Colors) -> bool {
    match formatter.version() {
        Ok(version) => {
            if !version.starts_with(SUPPORTED_VERSION_PREFIX) {
                eprintln!(
                    "{} tuned for clang-format 13, found '{version}'",
                    colors.warning("Warning:")
                );
            }
            true
        }
        Err(e) => {
            eprintln!("{} clang-format not found: {e}", colors.error("Error:"));
            false
        }
    }
}

fn load_seed_file(cli: &Cli, colors: &Colors) -> Result<Seed, ExitCode> {
    let seed_path = cli.config.clone().or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|dir| find_seed_file(&dir))
    });
    let Some(path) = seed_path else {
        return Ok(Seed::empty());
    };

    match load_seed(&path) {
        Ok(seed) => {
            if !cli.quiet {
                eprintln!("Using seed config: {}", path.display());
            }
            Ok(seed)
        }
        Err(e) => {
            eprintln!("{} {}: {e}", colors.error("Error:"), path.display());
            Err(ExitCode::from(1))
        }
    }
}

fn print_corpus(corpus: &SourceCorpus, colors: &Colors, quiet: bool) {
    if quiet {
        return;
    }
    if corpus.is_empty() {
        eprintln!(
            "{} no source files found, every option will keep its default",
            colors.warning("Warning:")
        );
        return;
    }
    let names: Vec<String> = corpus
        .files()
        .iter()
        .take(FILE_LIST_PRINT_MAX)
        .map(|f| f.path.display().to_string())
        .collect();
    let suffix = if corpus.len() > FILE_LIST_PRINT_MAX {
        " (...)"
    } else {
        ""
    };
    eprintln!(
        "{} {}{suffix}",
        colors.info(&format!("Source files ({}):", corpus.len())),
        names.join(" ")
    );
}

fn install_interrupt_handler(options: &SearchOptions, colors: &Colors) {
    let cancel = options.cancel.clone();
    let warning = colors.warning("Interrupted,");
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("\n{warning} finishing the current option...");
        cancel.cancel();
    }) {
        eprintln!("{} {e}", colors.warning("Warning:"));
    }
}
