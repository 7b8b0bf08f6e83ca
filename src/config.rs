use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use crate::parse::RecordFormat;
use crate::resolve::Query;

pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
pub const DEFAULT_OUTPUT: &str = "output_files/records.txt";

/// Location of the key-value cache. The database index selects the logical namespace and must be
/// the same for the run that writes the records and the run that renders them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    pub host: String,
    pub port: u16,
    pub db: i64,
}

impl CacheConfig {
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            host: "127.0.0.1".to_string(),
            port: 6379,
            db: 0,
        }
    }
}

/// Settings for the E-utilities client.
#[derive(Clone, Debug)]
pub struct EntrezConfig {
    pub base_url: String,
    /// Entrez database to search and fetch from, e.g. `protein` or `nuccore`
    pub database: String,
    /// Contact address sent with every request, as NCBI asks of all clients
    pub email: String,
    pub api_key: Option<String>,
    pub tool: String,
    pub timeout: Duration,
}

impl Default for EntrezConfig {
    fn default() -> Self {
        EntrezConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            database: "protein".to_string(),
            email: "Random@example.com".to_string(),
            api_key: None,
            tool: env!("CARGO_PKG_NAME").to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// How identifiers are turned into remote fetch requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub format: RecordFormat,
    /// Maximum number of identifiers per remote request. `None` sends the whole list at once.
    pub batch_size: Option<NonZeroUsize>,
}

/// Everything one pipeline run needs, handed to `Pipeline::new`.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub query: Query,
    /// Where `Pipeline::run` writes the report. `None` keeps the report in memory only.
    pub output: Option<PathBuf>,
    pub cache: CacheConfig,
    pub entrez: EntrezConfig,
    pub fetch: FetchOptions,
}
