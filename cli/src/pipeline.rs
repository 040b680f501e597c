//! Pipelines -- decompose every sample in a data set.
//!
//! The input is the JSON file of a [DataSet](definitions::DataSet) and every parameter is read from a TOML file.
use decomposer::decompose::{decomposition_path, write_decomposition, Decompose};
use decomposer::DecomposeConfig;
use definitions::DataSet;
use serde::{Deserialize, Serialize};
extern crate log;
use log::*;
use std::io::{BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

/// The configuration of the pipeline.
/// Parameters of the decomposition are in the `[decompose]` table.
/// Missing parameters take the default values.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PipelineConfig {
    /// The path to the input JSON file.
    pub input_file: PathBuf,
    /// The path to the output directory.
    pub out_dir: PathBuf,
    pub prefix: String,
    #[serde(default)]
    pub verbose: usize,
    #[serde(default = "default_threads")]
    pub threads: usize,
    #[serde(default)]
    pub decompose: DecomposeConfig,
}

fn default_threads() -> usize {
    1
}

pub fn read_config<P: AsRef<Path>>(path: P) -> std::io::Result<PipelineConfig> {
    let mut rdr = std::fs::File::open(path).map(BufReader::new)?;
    let mut file = String::new();
    rdr.read_to_string(&mut file)?;
    let config: PipelineConfig = toml::from_str(&file)
        .map_err(|why| std::io::Error::new(std::io::ErrorKind::InvalidData, why))?;
    config.decompose.validate()?;
    Ok(config)
}

pub fn run_pipeline(config: &PipelineConfig) -> std::io::Result<()> {
    let PipelineConfig {
        input_file,
        out_dir,
        prefix,
        verbose,
        threads,
        decompose,
    } = config.clone();
    decompose.validate()?;
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env = env_logger::Env::default().default_filter_or(level);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        debug!("Logger has already been initialized.");
    }
    if let Err(why) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        debug!("{:?}", why);
    }
    std::fs::create_dir_all(&out_dir)?;
    let file_stem = out_dir.join(prefix);
    let mut ds = parse_json(&input_file)?;
    for name in ds.sanity_check() {
        warn!("INCONSISTENT\t{}", name);
    }
    debug!("START\tDecompose");
    let failed = ds.decompose_indels(&decompose);
    info!("FAILED\t{}/{}", failed, ds.samples.len());
    write_tables(&ds, &file_stem)?;
    log(&ds, &file_stem.with_extension("json"))
}

/// Write the decomposition table of each sample into `<stem>.<sample name>.decomp`.
/// Samples without tables are skipped. Return the paths written.
pub fn write_tables<P: AsRef<Path>>(ds: &DataSet, stem: P) -> std::io::Result<Vec<PathBuf>> {
    let mut written = vec![];
    for sample in ds.samples.iter().filter(|s| !s.table.is_empty()) {
        let mut path = stem.as_ref().as_os_str().to_owned();
        path.push(".");
        path.push(&sample.name);
        let path = decomposition_path(path);
        let wtr = std::fs::File::create(&path).map(BufWriter::new)?;
        write_decomposition(&sample.table, wtr)?;
        debug!("TABLE\t{}\t{:?}", sample.name, path);
        written.push(path);
    }
    Ok(written)
}

fn parse_json(filename: &Path) -> std::io::Result<DataSet> {
    debug!("Opening {:?}", filename);
    let rdr = std::fs::File::open(filename).map(BufReader::new)?;
    Ok(serde_json::de::from_reader(rdr)?)
}

fn log(ds: &DataSet, path: &Path) -> std::io::Result<()> {
    let mut wtr = std::fs::File::create(path).map(BufWriter::new)?;
    serde_json::ser::to_writer(&mut wtr, ds)?;
    Ok(())
}
