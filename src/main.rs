use anyhow::{Context, Result};
use log::debug;

use totient_range::bench;
use totient_range::config::TotientConfig;
use totient_range::engine::{Engine, Strategy, process};
use totient_range::options::{Mode, Options};
use totient_range::range::SubRange;
use totient_range::report::{self, Report};

fn main() {
    if std::env::var("TOTIENT_LOG").is_ok() {
        let e = env_logger::Env::new()
            .filter("TOTIENT_LOG")
            .write_style("TOTIENT_LOG_STYLE");
        env_logger::init_from_env(e);
    }

    let mut args = match std::env::var("TOTIENT_FLAGS") {
        Ok(flags) => shellwords::split(&flags).unwrap_or_else(|err| {
            eprintln!("error: cannot split TOTIENT_FLAGS: {err}");
            std::process::exit(2);
        }),
        Err(_) => Vec::new(),
    };
    for (i, arg) in std::env::args_os().enumerate().skip(1) {
        match arg.into_string() {
            Ok(arg) => args.push(arg),
            Err(arg) => {
                eprintln!("error: argument {i} is not valid Unicode: {arg:?}");
                std::process::exit(2);
            }
        }
    }

    let options = Options::parse_from_args(&args).unwrap_or_else(|err| err.exit());
    debug!("totient-range options: {:?}", options);

    if let Err(err) = run(options) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(options: Options) -> Result<()> {
    let config = TotientConfig::load_from_file(&options.config)?;
    let strategy = options.strategy.unwrap_or(config.strategy);
    let policy = options.partition.unwrap_or(config.partition);

    let mut engine = Engine::new(strategy)
        .with_partition(policy)
        .with_op_count(options.count_ops || config.count_ops);
    if strategy == Strategy::Process {
        let program = match &config.worker_program {
            Some(program) => program.clone(),
            None => std::env::current_exe().context("cannot locate the totient-range executable")?,
        };
        engine = engine.with_worker_program(program);
    }

    match options.mode {
        Mode::Sum {
            lower,
            upper,
            workers,
            json,
            output,
        } => {
            let workers = workers.unwrap_or_else(|| config.default_workers());
            let summary = engine.run(lower, upper, workers)?;
            let report = Report::from(&summary);
            if json {
                println!("{}", report.to_json()?);
            } else {
                println!("{}", report);
            }
            if let Some(path) = output {
                report
                    .save_to_file(&path)
                    .with_context(|| format!("Failed to write report: {:?}", path))?;
            }
        }
        Mode::Bench { start, stop, step } => {
            let samples = bench::time_totients(
                start.unwrap_or(config.bench.start),
                stop.unwrap_or(config.bench.stop),
                step.unwrap_or(config.bench.step),
            )?;
            println!("{}", report::render_totient_samples(&samples));
        }
        Mode::Scale {
            lower,
            upper,
            max_workers,
        } => {
            let max_workers = max_workers.unwrap_or_else(|| config.default_workers());
            let samples = bench::scaling(&engine, lower, upper, max_workers)?;
            println!("Scaling over [{lower}..{upper}] ({strategy}, {policy})");
            println!("{}", report::render_scaling(&samples));
        }
        Mode::Worker {
            index,
            lower,
            upper,
        } => {
            // Only the coordinator's flag decides whether a worker counts.
            let line = process::worker_reply(SubRange::new(index, lower, upper), options.count_ops)?;
            println!("{line}");
        }
    }
    Ok(())
}
