use std::io::Cursor;

use needletail::parse_fastx_reader;

use crate::error::FetchError;
use crate::record::Record;

/// Parses a FASTA payload. The id is the first token of the header, the name repeats the id and
/// the description is the complete header line.
pub fn parse_fasta(payload: &str) -> Result<Vec<Record>, FetchError> {
    // needletail refuses an empty input outright; an empty batch is decided by the caller
    if payload.trim().is_empty() {
        return Ok(Vec::new());
    }

    let malformed = |record: usize, reason: String| FetchError::Malformed { record, reason };

    let mut reader = parse_fastx_reader(Cursor::new(payload.as_bytes().to_vec()))
        .map_err(|e| malformed(1, e.to_string()))?;

    let mut records = Vec::new();

    while let Some(rec) = reader.next() {
        let position = records.len() + 1;
        let rec = rec.map_err(|e| malformed(position, e.to_string()))?;

        let header = String::from_utf8(rec.id().to_vec())
            .map_err(|_| malformed(position, "header is not valid UTF-8".to_string()))?;
        let sequence = String::from_utf8(rec.seq().to_vec())
            .map_err(|_| malformed(position, "sequence is not valid UTF-8".to_string()))?;

        let id = header.split_whitespace().next().unwrap_or_default().to_string();
        if id.is_empty() {
            return Err(malformed(position, "header has no identifier".to_string()));
        }

        records.push(Record {
            name: id.clone(),
            id,
            description: header.trim_end().to_string(),
            sequence,
        });
    }

    Ok(records)
}
