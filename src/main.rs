extern crate env_logger;
#[macro_use]
extern crate log;
use std::{
    fs::File,
    io::{prelude::*, stdout, BufWriter},
    path::Path,
};

use anyhow::{bail, Context, Result};
use clap::Parser;

mod cache;
mod cli;
mod config;
mod entrez;
mod error;
mod fetch;
mod parse;
mod pipeline;
mod record;
mod render;
mod resolve;
#[cfg(test)]
mod testing;

use cache::RedisCache;
use cli::{Cli, Commands};
use entrez::EntrezClient;
use pipeline::Pipeline;

/// Creates a `BufWriter` for the given output option. This allows for an output file to be passed
/// or otherwise will default to using standard output.
fn get_writer(output: &Option<String>) -> Result<impl Write> {
    // get output as a BufWriter - equal to stdout if None
    let writer = BufWriter::new(match output {
        Some(ref x) => {
            let file = File::create(Path::new(x))
                .with_context(|| format!("Unable to create file {x}"))?;
            Box::new(file) as Box<dyn Write + Send>
        }
        None => Box::new(stdout()) as Box<dyn Write + Send>,
    });
    Ok(writer)
}

/// Reads identifiers from a file, one per line. Blank lines are skipped.
fn read_ids(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read identifiers from {}", path.display()))?;

    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn try_main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse();

    info!("gbcache v{}", cli::VERSION);

    let cache_config = cli.cache.config();

    match &cli.command {
        Commands::Run { search, output } => {
            let config = search.pipeline_config(Some(output.clone()), cache_config)?;

            let source = EntrezClient::new(&config.entrez)?;
            let cache = RedisCache::connect(&config.cache)?;

            let mut pipeline = Pipeline::new(config, source, cache);
            let report = pipeline.run()?;
            if report.is_empty() {
                warn!("The search matched no records; the report is empty.");
            }
            info!("Pipeline {} with {} records.", pipeline.stage(), report.len());
        }
        Commands::Fetch { search, ids_out } => {
            let config = search.pipeline_config(None, cache_config)?;

            let source = EntrezClient::new(&config.entrez)?;
            let cache = RedisCache::connect(&config.cache)?;

            let records = Pipeline::new(config, source, cache).acquire()?;

            let mut writer = get_writer(ids_out)?;
            for record in &records {
                writeln!(writer, "{}", record.id)?;
            }
            writer.flush()?;

            info!("Cached {} records.", records.len());
        }
        Commands::Render {
            ids,
            ids_file,
            output,
        } => {
            let mut ids = ids.clone();
            if let Some(path) = ids_file {
                ids.extend(read_ids(path)?);
            }
            if ids.is_empty() {
                bail!("No identifiers to render: pass them as arguments or with --ids-file");
            }

            let mut cache = RedisCache::connect(&cache_config)?;
            let report = render::render(&mut cache, &ids)?;
            report.write_to(output)?;

            info!("Completed successfully.")
        }
    };
    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        error!("{}", err);

        // report any errors that are produced
        err.chain()
            .skip(1)
            .for_each(|cause| error!("  because: {}", cause));

        std::process::exit(1);
    }
}
