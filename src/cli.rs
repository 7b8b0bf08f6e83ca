use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::builder::styling::AnsiColor;
use clap::builder::Styles;
use clap::{Args, Parser, Subcommand};

use crate::config::{
    CacheConfig, EntrezConfig, FetchOptions, PipelineConfig, DEFAULT_BASE_URL, DEFAULT_OUTPUT,
};
use crate::error::ResolveError;
use crate::parse::RecordFormat;
use crate::resolve::{Query, DEFAULT_MAX_RESULTS};

const fn extra_build_info() -> &'static str {
    match option_env!("CARGO_BUILD_DESC") {
        Some(e) => e,
        None => env!("CARGO_PKG_VERSION"),
    }
}
pub const VERSION: &str = extra_build_info();
const INFO_STRING: &str = "
🧬 gbcache version ";
const AFTER_STRING: &str = "
   ──────────────────────────────────
   fetch NCBI records into a key-value cache and render them as a report";

// colouring of the help
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().bold())
    .usage(AnsiColor::BrightMagenta.on_default().bold())
    .literal(AnsiColor::BrightMagenta.on_default())
    .placeholder(AnsiColor::White.on_default());

#[derive(Parser)]
#[command(
    version = VERSION,
    about = format!("{}{}{}", INFO_STRING, VERSION, AFTER_STRING),
    arg_required_else_help = true,
    flatten_help = true,
    styles = STYLES
)]
pub struct Cli {
    #[command(flatten)]
    pub cache: CacheArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the record cache lives. Fetching and rendering must agree on all three.
#[derive(Args)]
pub struct CacheArgs {
    /// cache host
    #[arg(long, global = true, default_value = "127.0.0.1")]
    pub host: String,

    /// cache port
    #[arg(long, global = true, default_value_t = 6379)]
    pub port: u16,

    /// logical database index within the cache
    #[arg(long, global = true, default_value_t = 0)]
    pub db: i64,
}

impl CacheArgs {
    pub fn config(&self) -> CacheConfig {
        CacheConfig {
            host: self.host.clone(),
            port: self.port,
            db: self.db,
        }
    }
}

#[derive(Args)]
pub struct SearchArgs {
    /// the search term, e.g. "Arabidopsis thaliana AND AT5G10140"
    pub term: String,

    /// the maximum number of identifiers to fetch
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_RESULTS)]
    pub max_results: usize,

    /// contact email sent to NCBI with every request
    #[arg(long, env = "NCBI_EMAIL", default_value = "Random@example.com")]
    pub email: String,

    /// NCBI API key, which raises the request rate limit
    #[arg(long, env = "NCBI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// the Entrez database to search
    #[arg(long, default_value = "protein")]
    pub database: String,

    /// the format records are downloaded in
    #[arg(long, value_enum, default_value = "gb")]
    pub format: RecordFormat,

    /// split the fetch into requests of at most this many identifiers.
    /// by default all identifiers are fetched in a single request.
    #[arg(long, verbatim_doc_comment)]
    pub batch_size: Option<NonZeroUsize>,

    /// E-utilities base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// HTTP timeout, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

impl SearchArgs {
    pub fn query(&self) -> Result<Query, ResolveError> {
        Query::new(self.term.clone(), self.max_results)
    }

    pub fn entrez_config(&self) -> EntrezConfig {
        EntrezConfig {
            base_url: self.base_url.clone(),
            database: self.database.clone(),
            email: self.email.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.timeout),
            ..EntrezConfig::default()
        }
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            format: self.format,
            batch_size: self.batch_size,
        }
    }

    pub fn pipeline_config(
        &self,
        output: Option<PathBuf>,
        cache: CacheConfig,
    ) -> Result<PipelineConfig, ResolveError> {
        Ok(PipelineConfig {
            query: self.query()?,
            output,
            cache,
            entrez: self.entrez_config(),
            fetch: self.fetch_options(),
        })
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search, fetch, cache and render records in one go
    #[command(arg_required_else_help = true)]
    Run {
        #[command(flatten)]
        search: SearchArgs,

        /// the output report
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },

    /// Search, fetch and cache records without rendering them. The cached identifiers are
    /// printed one per line, ready to be passed to `render --ids-file`.
    #[command(arg_required_else_help = true)]
    Fetch {
        #[command(flatten)]
        search: SearchArgs,

        /// write the cached identifiers to this file instead of standard output
        #[arg(long)]
        ids_out: Option<String>,
    },

    /// Render a report from records already in the cache
    #[command(arg_required_else_help = true)]
    Render {
        /// identifiers to render, in order
        ids: Vec<String>,

        /// a file with one identifier per line, rendered after any given on the command line
        #[arg(long)]
        ids_file: Option<PathBuf>,

        /// the output report
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },
}
