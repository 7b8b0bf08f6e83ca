use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::cache::CacheBackend;
use crate::error::RenderError;
use crate::record::Record;

/// The rendered text of a set of records, one block per requested identifier.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    text: String,
    blocks: usize,
}

impl Report {
    fn push(&mut self, record: &Record) {
        // writing into a String cannot fail
        let _ = record.write_block(&mut self.text);
        self.blocks += 1;
    }

    pub fn len(&self) -> usize {
        self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks == 0
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Writes the report to `path`, creating missing parent directories.
    ///
    /// The text is first written to a temporary file next to `path` and then moved into place,
    /// so `path` either holds the complete report or is left untouched.
    pub fn write_to(&self, path: &Path) -> Result<(), RenderError> {
        let output_err = |source: std::io::Error| RenderError::Output {
            path: path.display().to_string(),
            source,
        };

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(output_err)?;

        let mut temp = NamedTempFile::new_in(dir).map_err(output_err)?;
        temp.write_all(self.as_str().as_bytes()).map_err(output_err)?;
        temp.persist(path).map_err(|e| output_err(e.error))?;

        info!("Wrote {} records to {}", self.blocks, path.display());
        Ok(())
    }
}

/// Reads each identifier back from the cache, in order, and renders it.
///
/// Nothing here assumes the cache was filled by the current process. Rendering stops at the
/// first identifier that is missing, undecodable or unreadable, and no report is produced.
///
/// # Errors
///
/// * `RenderError::Miss` naming the first identifier with no cache entry
/// * `RenderError::Corrupt` naming the first identifier whose value is not a valid record
/// * `RenderError::Cache` if the backend fails
pub fn render(cache: &mut impl CacheBackend, ids: &[String]) -> Result<Report, RenderError> {
    info!("Rendering {} records from the cache", ids.len());

    let mut report = Report::default();

    for id in ids {
        let value = cache
            .get(id)?
            .ok_or_else(|| RenderError::Miss { id: id.clone() })?;

        let record = Record::from_cache_value(&value).map_err(|source| RenderError::Corrupt {
            id: id.clone(),
            source,
        })?;

        report.push(&record);
    }

    Ok(report)
}
