use redis::{Client, Connection, RedisError};

use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::record::Record;

/// A string-keyed store. Values are overwritten on `set`; there is no expiry or deletion.
///
/// `get` hands back the stored bytes as they are, so that a value which is not valid UTF-8 is
/// reported by the reader as a corrupt entry rather than as a backend failure.
pub trait CacheBackend {
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), CacheError>;
}

impl<T: CacheBackend + ?Sized> CacheBackend for &mut T {
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        (**self).set(key, value)
    }
}

/// A single synchronous connection to a Redis server, bound to one logical database.
pub struct RedisCache {
    conn: Connection,
    url: String,
}

impl RedisCache {
    /// Opens the connection described by `config`.
    ///
    /// # Errors
    ///
    /// `CacheError::Unavailable` if the server cannot be reached or refuses the database index.
    pub fn connect(config: &CacheConfig) -> Result<Self, CacheError> {
        let url = config.url();

        let conn = Client::open(url.as_str())
            .and_then(|client| client.get_connection())
            .map_err(|e| CacheError::Unavailable {
                backend: url.clone(),
                key: None,
                source: Box::new(e),
            })?;

        debug!("Connected to cache backend {url}");
        Ok(RedisCache { conn, url })
    }
}

/// Sorts a Redis error into "the server went away" and "the server said no".
fn classify(url: &str, key: &str, e: RedisError) -> CacheError {
    if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() || e.is_timeout() {
        CacheError::Unavailable {
            backend: url.to_string(),
            key: Some(key.to_string()),
            source: Box::new(e),
        }
    } else {
        CacheError::Backend {
            key: key.to_string(),
            source: Box::new(e),
        }
    }
}

impl CacheBackend for RedisCache {
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let value: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key)
            .query(&mut self.conn)
            .map_err(|e| classify(&self.url, key, e))?;

        if value.is_some() {
            debug!("cache hit {key}");
        } else {
            debug!("cache miss {key}");
        }
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query::<()>(&mut self.conn)
            .map_err(|e| classify(&self.url, key, e))?;

        debug!("cache set {key}");
        Ok(())
    }
}

/// Writes each record into the cache under its identifier, in order.
///
/// Writes are independent: when one fails, the records before it stay cached and the records
/// after it are not attempted. Storing the same records again overwrites them with the same
/// values, so re-running is the way to recover from a partial batch.
///
/// # Errors
///
/// * `CacheError::EmptyKey` if a record has no identifier
/// * `CacheError::Unavailable` / `CacheError::Backend` from the first failing write
pub fn store(cache: &mut impl CacheBackend, records: &[Record]) -> Result<(), CacheError> {
    info!("Storing {} records", records.len());

    for (position, record) in records.iter().enumerate() {
        if record.id.is_empty() {
            return Err(CacheError::EmptyKey { position });
        }

        let value = record
            .to_cache_value()
            .map_err(|source| CacheError::Serialize {
                key: record.id.clone(),
                source,
            })?;

        debug!("storing entry {}", record.id);
        cache.set(&record.id, &value)?;
    }

    info!("Finished storing {} records", records.len());
    Ok(())
}
