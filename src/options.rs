//! Parsing Options.
//! `totient-range [OPTIONS] <LOWER> <UPPER> [WORKERS]`, plus the `bench`,
//! `scale` and (hidden) `worker` subcommands.

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::error::Error;
use std::path::PathBuf;
use std::str::FromStr;

use crate::engine::Strategy;
use crate::range::PartitionPolicy;

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Sum {
        lower: i64,
        upper: i64,
        workers: Option<usize>,
        json: bool,
        output: Option<String>,
    },
    Bench {
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    },
    Scale {
        lower: i64,
        upper: i64,
        max_workers: Option<usize>,
    },
    /// Child side of the process strategy.
    Worker { index: usize, lower: i64, upper: i64 },
}

fn bound_arg(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .required(true)
        .help(help)
        .value_parser(value_parser!(i64))
        .allow_negative_numbers(true)
}

fn make_options_parser() -> clap::Command {
    let parser = Command::new("totient-range")
        .no_binary_name(true)
        .version("v0.1.0")
        .about("Sum of Euler totients over [LOWER, UPPER], split across workers")
        .subcommand_negates_reqs(true)
        .arg(bound_arg("lower", "First totient argument"))
        .arg(bound_arg("upper", "Last totient argument (inclusive)"))
        .arg(
            Arg::new("workers")
                .help("Number of workers [default: config, then available parallelism]")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("strategy")
                .short('s')
                .long("strategy")
                .global(true)
                .help("How workers run and how partial sums are merged")
                .value_parser(Strategy::ALL.map(|s| s.name())),
        )
        .arg(
            Arg::new("partition")
                .short('p')
                .long("partition")
                .global(true)
                .help("How the range is cut into sub-ranges")
                .value_parser(PartitionPolicy::ALL.map(|p| p.name())),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .global(true)
                .value_name("FILE")
                .help("TOML configuration file")
                .default_value("totient.toml"),
        )
        .arg(
            Arg::new("count-ops")
                .long("count-ops")
                .global(true)
                .help("Count arithmetic operations per worker")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the report as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Also save the JSON report to FILE"),
        )
        .subcommand(
            Command::new("bench")
                .about("Time totient(n) over fixed steps")
                .arg(
                    Arg::new("start")
                        .long("start")
                        .value_parser(value_parser!(i64))
                        .allow_negative_numbers(true),
                )
                .arg(Arg::new("stop").long("stop").value_parser(value_parser!(i64)))
                .arg(Arg::new("step").long("step").value_parser(value_parser!(i64))),
        )
        .subcommand(
            Command::new("scale")
                .about("Run the sum with 1..=K workers and report the speedup")
                .arg(bound_arg("lower", "First totient argument"))
                .arg(bound_arg("upper", "Last totient argument (inclusive)"))
                .arg(
                    Arg::new("max-workers")
                        .short('k')
                        .long("max-workers")
                        .value_parser(value_parser!(usize)),
                ),
        )
        .subcommand(
            Command::new("worker")
                .hide(true)
                .arg(
                    Arg::new("index")
                        .required(true)
                        .value_parser(value_parser!(usize)),
                )
                .arg(bound_arg("lower", "First totient argument"))
                .arg(bound_arg("upper", "Last totient argument (inclusive)")),
        );
    parser
}

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub mode: Mode,
    pub config: PathBuf,
    pub strategy: Option<Strategy>,
    pub partition: Option<PartitionPolicy>,
    pub count_ops: bool,
}

impl Options {
    pub fn parse_from_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let flags = shellwords::split(s)?;
        Ok(Self::parse_from_args(&flags)?)
    }

    pub fn parse_from_args(flags: &[String]) -> Result<Self, clap::Error> {
        let app = make_options_parser();
        let matches = app.try_get_matches_from(flags.iter())?;

        let mode = match matches.subcommand() {
            Some(("bench", sub)) => Mode::Bench {
                start: sub.get_one::<i64>("start").copied(),
                stop: sub.get_one::<i64>("stop").copied(),
                step: sub.get_one::<i64>("step").copied(),
            },
            Some(("scale", sub)) => Mode::Scale {
                lower: required(sub, "lower")?,
                upper: required(sub, "upper")?,
                max_workers: sub.get_one::<usize>("max-workers").copied(),
            },
            Some(("worker", sub)) => Mode::Worker {
                index: required(sub, "index")?,
                lower: required(sub, "lower")?,
                upper: required(sub, "upper")?,
            },
            _ => Mode::Sum {
                lower: required(&matches, "lower")?,
                upper: required(&matches, "upper")?,
                workers: matches.get_one::<usize>("workers").copied(),
                json: matches.get_flag("json"),
                output: matches.get_one::<String>("output").cloned(),
            },
        };

        // Global flags are visible on the subcommand's matches as well.
        let scoped = matches.subcommand().map(|(_, sub)| sub).unwrap_or(&matches);
        let config = scoped
            .get_one::<String>("config")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("totient.toml"));

        Ok(Options {
            mode,
            config,
            strategy: choice(scoped, "strategy")?,
            partition: choice(scoped, "partition")?,
            count_ops: scoped.get_flag("count-ops"),
        })
    }
}

fn required<T: Clone + Send + Sync + 'static>(
    matches: &ArgMatches,
    id: &str,
) -> Result<T, clap::Error> {
    matches.get_one::<T>(id).cloned().ok_or_else(|| {
        clap::Error::raw(
            ErrorKind::MissingRequiredArgument,
            format!("missing required argument <{}>\n", id.to_uppercase()),
        )
    })
}

fn choice<T: FromStr<Err = String>>(matches: &ArgMatches, id: &str) -> Result<Option<T>, clap::Error> {
    matches
        .get_one::<String>(id)
        .map(|s| s.parse::<T>())
        .transpose()
        .map_err(|e| clap::Error::raw(ErrorKind::InvalidValue, format!("{e}\n")))
}
