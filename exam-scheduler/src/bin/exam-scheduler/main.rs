mod result;

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use exam_scheduler::builder::HintPolicy;
use exam_scheduler::io::read_input;
use exam_scheduler::io::write_failure_log;
use exam_scheduler::io::write_output;
use exam_scheduler::run::schedule;
use exam_scheduler::run::RunOptions;
use exam_scheduler::run::RunState;
use exam_scheduler::RunLog;
use exam_scheduler::SchedulerError;
use exam_scheduler::Stopwatch;
use log::error;
use log::info;
use log::warn;
use log::LevelFilter;
use result::CliError;
use result::CliResult;
use scheduler_oracle::statistics::configure_statistic_logging;
use scheduler_oracle::PumpkinOracle;
use scheduler_oracle::SearchOptions;
use scheduler_oracle::SolveLimits;

#[derive(Debug, Parser)]
#[command(
    help_template = "\
{before-help}{name} {version}
Authors: {author}
About: {about}

{usage-heading}\n{tab}{usage}

{all-args}{after-help}
",
    author,
    version,
    about,
    arg_required_else_help = true
)]
struct Args {
    /// The directory holding the input tables:
    ///  - 'exams.tsv' (name, demand),
    ///  - 'dates.tsv' (label, capacity),
    ///  - 'gaps.tsv' (pattern 1, pattern 2, minimal days, ideal days, weight),
    ///  - 'precedences.tsv' (pattern 1, pattern 2),
    ///  - 'pins.tsv' (pattern, date label), optional,
    ///  - 'schedule.tsv' (exam, date label), only read with "--warm-start".
    #[clap(verbatim_doc_comment)]
    input_dir: PathBuf,

    /// The directory to which 'schedule.tsv', 'violations.tsv' and 'log.txt' are written.
    ///
    /// Defaults to the input directory, in which case the schedule of an earlier run is replaced.
    #[arg(long = "output-dir", verbatim_doc_comment)]
    output_dir: Option<PathBuf>,

    /// The time budget for the solver, given in seconds; 0 means no limit.
    ///
    /// Possible values: u64 (Optional)
    #[arg(short = 't', long = "time-limit", verbatim_doc_comment)]
    time_limit: Option<u64>,

    /// Stop as soon as the best schedule is proven to be at most this far from the optimum.
    ///
    /// Possible values: i64 (Optional)
    #[arg(long = "gap-limit", verbatim_doc_comment)]
    gap_limit: Option<i64>,

    /// Uses the schedule of an earlier run ('schedule.tsv' in the input directory) as hints for
    /// the solver.
    ///
    /// Possible values: bool
    #[arg(short = 'w', long = "warm-start", verbatim_doc_comment)]
    warm_start: bool,

    /// The probability with which each hint is passed on to the solver.
    ///
    /// Possible values: f64 in [0, 1]
    #[arg(
        long = "hint-probability",
        default_value_t = 1.0,
        value_parser = parse_probability,
        verbatim_doc_comment
    )]
    hint_probability: f64,

    /// The seed which decides which hints are passed on when the hint probability is below 1.
    ///
    /// Possible values: u64
    #[arg(long = "random-seed", default_value_t = 42, verbatim_doc_comment)]
    random_seed: u64,

    /// Exams whose name starts with this prefix are scheduled, but left out of the output.
    ///
    /// An empty prefix disables placeholders.
    #[arg(long = "placeholder-prefix", default_value = "_", verbatim_doc_comment)]
    placeholder_prefix: String,

    /// Enables debug messages.
    ///
    /// Possible values: bool
    #[arg(short = 'v', long = "verbose", verbatim_doc_comment)]
    verbose: bool,

    /// Enables logging of statistics from the solver.
    ///
    /// Possible values: bool
    #[arg(short = 's', long = "log-statistics", verbatim_doc_comment)]
    log_statistics: bool,

    #[command(flatten)]
    search: SearchOptions,
}

fn parse_probability(value: &str) -> Result<f64, String> {
    let probability = value
        .parse::<f64>()
        .map_err(|e| format!("'{value}' is not a number: {e}"))?;
    if (0.0..=1.0).contains(&probability) {
        Ok(probability)
    } else {
        Err(format!("{probability} is not in [0, 1]"))
    }
}

fn configure_logging(verbose: bool, log_statistics: bool) {
    if log_statistics {
        configure_statistic_logging("%% stat:", None, None, None);
    }
    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .format(move |buf, record| writeln!(buf, "{}", record.args()))
        .filter_level(level_filter)
        .target(env_logger::Target::Stdout)
        .init();
}

fn main() {
    match run() {
        Ok(state) if state.has_solution() => {}
        Ok(_) => std::process::exit(2),
        Err(e) => {
            error!("Execution failed, error: {e}");
            std::process::exit(1);
        }
    }
}

fn run() -> CliResult<RunState> {
    let args = Args::parse();
    configure_logging(args.verbose, args.log_statistics);

    if !args.input_dir.is_dir() {
        return Err(CliError::MissingInputDirectory(
            args.input_dir.display().to_string(),
        ));
    }

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| args.input_dir.clone());
    std::fs::create_dir_all(&output_dir)?;

    let mut log = RunLog::new(Stopwatch::starting_now());
    let input = match read_input(&args.input_dir, &args.placeholder_prefix, args.warm_start) {
        Ok(input) => input,
        Err(error) => return Err(record_failure(&output_dir, &log, error)),
    };

    let options = RunOptions {
        limits: SolveLimits {
            time_limit: args
                .time_limit
                .filter(|&seconds| seconds > 0)
                .map(Duration::from_secs),
            absolute_gap_limit: args.gap_limit,
        },
        hints: HintPolicy {
            enabled: args.warm_start,
            probability: args.hint_probability,
            seed: args.random_seed,
        },
    };

    let mut oracle = PumpkinOracle::new(args.search);
    let finished = match schedule(
        &input.registry,
        &input.rules,
        &options,
        &mut oracle,
        &mut log,
    ) {
        Ok(finished) => finished,
        Err(error) => return Err(record_failure(&output_dir, &log, error)),
    };
    if args.log_statistics {
        oracle.log_statistics();
    }

    let interpretation = finished.interpret();
    write_output(&output_dir, interpretation.as_ref(), &log)?;

    let state = finished.state();
    if let Some(objective_value) = finished.objective_value() {
        info!("Finished with {state}, objective value = {objective_value}");
    } else {
        info!("Finished with {state}, no schedule was written");
    }
    Ok(state)
}

/// Writes the log of a run which stopped with a fatal error to where the outputs would have gone.
fn record_failure(output_dir: &Path, log: &RunLog, error: SchedulerError) -> CliError {
    if let Err(write_error) = write_failure_log(output_dir, log, &error) {
        warn!("Could not write the log of the failed run: {write_error}");
    }
    error.into()
}
