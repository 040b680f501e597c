use decomposer::decompose::Decompose;
use definitions::*;
use indelshift_cli::commands::decompose_config;
use std::io::{BufReader, BufWriter};
#[macro_use]
extern crate log;

fn main() -> std::io::Result<()> {
    let matches = indelshift_cli::commands::indelshift_parser().get_matches();
    if let Some(("pipeline", sub_m)) = matches.subcommand() {
        let path = required(sub_m, "profile")?;
        let config = indelshift_cli::pipeline::read_config(path)?;
        return indelshift_cli::pipeline::run_pipeline(&config);
    }
    if let Some((_, sub_m)) = matches.subcommand() {
        let level = match sub_m.get_count("verbose") {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    }
    let mut ds = get_input_file()?;
    let ds = &mut ds;
    match matches.subcommand() {
        Some(("profile", sub_m)) => profile(sub_m, ds)?,
        Some(("breakpoint", sub_m)) => breakpoint(sub_m, ds)?,
        Some(("decompose", sub_m)) => decompose(sub_m, ds)?,
        _ => unreachable!(),
    };
    flush_file(ds)
}

fn required<'a>(matches: &'a clap::ArgMatches, id: &str) -> std::io::Result<&'a String> {
    matches.get_one::<String>(id).ok_or_else(|| {
        let msg = format!("{} is required", id);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, msg)
    })
}

fn profile(matches: &clap::ArgMatches, dataset: &mut DataSet) -> std::io::Result<()> {
    use decomposer::profile::{reference_profile, Profile};
    debug!("START\tProfile");
    let config = decompose_config(matches)?;
    let output = required(matches, "output")?;
    let (reverse, of_reference) = (matches.get_flag("reverse"), matches.get_flag("reference"));
    for sample in dataset.samples.iter() {
        let profile = if of_reference {
            reference_profile(&sample.reference, || {
                sample.reference_trace.clone().ok_or_else(|| {
                    let msg = format!("no reference trace for {}", sample.name);
                    std::io::Error::new(std::io::ErrorKind::NotFound, msg)
                })
            })?
        } else if sample.is_consistent() {
            let (trace, bc) = (&sample.trace, &sample.basecalls);
            Profile::from_trace_trimmed(trace, bc, config.trim_left, config.trim_right)
        } else {
            warn!("INCONSISTENT\t{}", sample.name);
            continue;
        };
        let profile = match reverse {
            true => profile.reverse_complement(),
            false => profile,
        };
        let path = format!("{}.{}.tsv", output, sample.name);
        let wtr = std::fs::File::create(&path).map(BufWriter::new)?;
        profile.write_tsv(wtr)?;
        debug!("PROFILE\t{}\t{}", sample.name, path);
    }
    Ok(())
}

fn breakpoint(matches: &clap::ArgMatches, dataset: &mut DataSet) -> std::io::Result<()> {
    debug!("START\tBreakpoint");
    set_threads(matches);
    let config = decompose_config(matches)?;
    let failed = dataset.detect_breakpoints(&config);
    if 0 < failed {
        warn!("{} samples failed.", failed);
    }
    Ok(())
}

fn decompose(matches: &clap::ArgMatches, dataset: &mut DataSet) -> std::io::Result<()> {
    debug!("START\tDecompose");
    set_threads(matches);
    let config = decompose_config(matches)?;
    debug!("CONFIG\t{:?}", config);
    let failed = dataset.decompose_indels(&config);
    if 0 < failed {
        warn!("{} samples failed.", failed);
    }
    if let Some(output) = matches.get_one::<String>("output") {
        indelshift_cli::pipeline::write_tables(dataset, output)?;
    }
    Ok(())
}

fn get_input_file() -> std::io::Result<DataSet> {
    let stdin = std::io::stdin();
    let reader = BufReader::new(stdin.lock());
    match serde_json::de::from_reader(reader) {
        Err(why) => {
            error!("{:?}", why);
            error!("Invalid Input from STDIN.");
            Err(std::io::Error::from(std::io::ErrorKind::InvalidData))
        }
        Ok(res) => Ok(res),
    }
}

fn flush_file(dataset: &DataSet) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut wtr = BufWriter::new(stdout.lock());
    if let Err(why) = serde_json::ser::to_writer(&mut wtr, dataset) {
        error!("{:?}", why);
        error!("Invalid output to the STDOUT.");
        return Err(why.into());
    }
    Ok(())
}

fn set_threads(matches: &clap::ArgMatches) {
    if let Some(threads) = matches
        .get_one("threads")
        .and_then(|num: &String| num.parse().ok())
    {
        debug!("Set Threads\t{}", threads);
        if let Err(why) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            debug!("{:?}", why);
        }
    }
}
