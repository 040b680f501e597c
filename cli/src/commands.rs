use clap::{Arg, ArgAction, ArgMatches, Command};
use decomposer::DecomposeConfig;

fn verbose() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .help("Debug mode")
}

fn threads() -> Arg {
    Arg::new("threads")
        .short('t')
        .long("threads")
        .value_name("THREADS")
        .default_value("1")
        .help("number of threads")
}

fn trim_args() -> [Arg; 2] {
    [
        Arg::new("trim_left")
            .long("trim_left")
            .value_name("LEN")
            .help("Ignore the first LEN called positions [0]"),
        Arg::new("trim_right")
            .long("trim_right")
            .value_name("LEN")
            .help("Ignore the last LEN called positions [0]"),
    ]
}

fn window_args() -> [Arg; 2] {
    [
        Arg::new("window")
            .long("window")
            .value_name("LEN")
            .help("Width of the sliding window to find the breakpoint [25]"),
        Arg::new("min_diff")
            .long("min_diff")
            .value_name("DIFF")
            .help("Minimum contrast between the windows to call a breakpoint [0.25]"),
    ]
}

fn subcommand_profile() -> Command {
    Command::new("profile")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Write the signal profile of each sample into TSV. It passes through the stdin to the stdout")
        .arg(verbose())
        .args(trim_args())
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("PATH")
                .required(true)
                .help("Profiles are written into PATH.<sample name>.tsv"),
        )
        .arg(
            Arg::new("reverse")
                .long("reverse")
                .action(ArgAction::SetTrue)
                .help("Write the reverse complement of the profile"),
        )
        .arg(
            Arg::new("reference")
                .long("reference")
                .action(ArgAction::SetTrue)
                .help("Write the profile of the reference instead of the trace"),
        )
}

fn subcommand_breakpoint() -> Command {
    Command::new("breakpoint")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Detect the breakpoint of each sample. `decompose` reuses the breakpoints stored here.")
        .arg(verbose())
        .arg(threads())
        .args(trim_args())
        .args(window_args())
}

fn subcommand_decompose() -> Command {
    Command::new("decompose")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Decompose the alleles of each sample and rewrite the base calls.")
        .arg(verbose())
        .arg(threads())
        .args(trim_args())
        .args(window_args())
        .arg(
            Arg::new("max_indel")
                .long("max_indel")
                .value_name("LEN")
                .help("Maximum length of the indel [1000]"),
        )
        .arg(
            Arg::new("madc")
                .long("madc")
                .value_name("FLOAT")
                .help("Multiplier of the median absolute deviation of the scores [5]"),
        )
        .arg(
            Arg::new("threshold_floor")
                .long("threshold_floor")
                .value_name("INT")
                .help("Minimum of the mismatch threshold [10]"),
        )
        .arg(
            Arg::new("table_width")
                .long("table_width")
                .value_name("LEN")
                .help("# of shifts written into the decomposition table [15]"),
        )
        .arg(
            Arg::new("table_width_unresolved")
                .long("table_width_unresolved")
                .value_name("LEN")
                .help("# of shifts written when nothing was resolved [50]"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("PATH")
                .help("Decomposition tables are written into PATH.<sample name>.decomp"),
        )
}

fn subcommand_pipeline() -> Command {
    Command::new("pipeline")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Run pipeline based on the given TOML file.")
        .arg(
            Arg::new("profile")
                .short('p')
                .required(true)
                .help("TOML configuration file. See example.toml for an example."),
        )
}

pub fn indelshift_parser() -> Command {
    Command::new("indelshift")
        .version("0.1")
        .author("Bansho Masutani <ban-m@g.ecc.u-tokyo.ac.jp>")
        .about("Indel shift decomposition of Sanger traces")
        .arg_required_else_help(true)
        .subcommand(subcommand_profile())
        .subcommand(subcommand_breakpoint())
        .subcommand(subcommand_decompose())
        .subcommand(subcommand_pipeline())
}

// Arguments the subcommand does not define fall back to `default`.
fn parse_value<T: std::str::FromStr>(matches: &ArgMatches, id: &str, default: T) -> std::io::Result<T> {
    match matches.try_get_one::<String>(id) {
        Ok(Some(value)) => value.parse().map_err(|_| {
            let msg = format!("{} can not be parsed: {}", id, value);
            std::io::Error::new(std::io::ErrorKind::InvalidInput, msg)
        }),
        _ => Ok(default),
    }
}

/// The configuration of the decomposition given by the arguments of a subcommand.
pub fn decompose_config(matches: &ArgMatches) -> std::io::Result<DecomposeConfig> {
    let default = DecomposeConfig::default();
    let config = DecomposeConfig {
        trim_left: parse_value(matches, "trim_left", default.trim_left)?,
        trim_right: parse_value(matches, "trim_right", default.trim_right)?,
        max_indel: parse_value(matches, "max_indel", default.max_indel)?,
        madc: parse_value(matches, "madc", default.madc)?,
        window: parse_value(matches, "window", default.window)?,
        min_diff: parse_value(matches, "min_diff", default.min_diff)?,
        threshold_floor: parse_value(matches, "threshold_floor", default.threshold_floor)?,
        table_width: parse_value(matches, "table_width", default.table_width)?,
        table_width_unresolved: parse_value(
            matches,
            "table_width_unresolved",
            default.table_width_unresolved,
        )?,
    };
    config.validate()?;
    Ok(config)
}
