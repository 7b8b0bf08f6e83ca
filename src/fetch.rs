use itertools::Itertools;

use crate::config::FetchOptions;
use crate::entrez::RecordSource;
use crate::error::FetchError;
use crate::parse::parse_records;
use crate::record::Record;

/// Fetches the full record for every identifier, in the order of `ids`.
///
/// All identifiers go out in a single comma-joined request, unless `options.batch_size` splits
/// them into several consecutive requests. An empty `ids` makes no request at all.
///
/// # Errors
///
/// There is no partial success: the first failing request, unparseable payload, or a payload
/// with a different number of records than identifiers asked for aborts the whole fetch.
pub fn fetch(
    source: &impl RecordSource,
    ids: &[String],
    options: &FetchOptions,
) -> Result<Vec<Record>, FetchError> {
    if ids.is_empty() {
        info!("No identifiers to fetch");
        return Ok(Vec::new());
    }

    let chunk_size = options.batch_size.map_or(ids.len(), |n| n.get());
    info!(
        "Getting {} records in {} request(s)",
        ids.len(),
        ids.len().div_ceil(chunk_size)
    );

    let mut records = Vec::with_capacity(ids.len());

    for chunk in ids.chunks(chunk_size) {
        let joined = chunk.iter().join(",");

        let payload = source
            .fetch_batch(&joined, options.format)
            .map_err(|source| FetchError::Request {
                count: chunk.len(),
                source,
            })?;

        let parsed = parse_records(&payload, options.format)?;
        if parsed.len() != chunk.len() {
            return Err(FetchError::Incomplete {
                expected: chunk.len(),
                parsed: parsed.len(),
            });
        }

        records.extend(parsed);
    }

    debug!("Fetched records: {}", records.iter().map(|r| &r.id).join(", "));
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::testing::{record, StubSource};

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_list_makes_no_request() {
        let source = StubSource::new();
        let records = fetch(&source, &[], &FetchOptions::default()).unwrap();

        assert!(records.is_empty());
        assert!(source.fetches().is_empty());
    }

    #[test]
    fn single_request_in_order() {
        let source =
            StubSource::new().with_records(vec![record("ID1", "geneA"), record("ID2", "geneB")]);

        let records = fetch(&source, &ids(&["ID2", "ID1"]), &FetchOptions::default()).unwrap();

        assert_eq!(source.fetches(), vec!["ID2,ID1"]);
        assert_eq!(records, vec![record("ID2", "geneB"), record("ID1", "geneA")]);
    }

    #[test]
    fn duplicates_yield_duplicate_records() {
        let second = crate::record::Record {
            name: "geneA2".to_string(),
            ..record("ID1", "geneA")
        };
        let source = StubSource::new().with_records(vec![record("ID1", "geneA"), second.clone()]);

        let records = fetch(&source, &ids(&["ID1", "ID1"]), &FetchOptions::default()).unwrap();

        assert_eq!(records, vec![record("ID1", "geneA"), second]);
    }

    #[test]
    fn batch_size_splits_requests() {
        let source = StubSource::new().with_records(vec![
            record("ID1", "a"),
            record("ID2", "b"),
            record("ID3", "c"),
        ]);
        let options = FetchOptions {
            batch_size: NonZeroUsize::new(2),
            ..FetchOptions::default()
        };

        let records = fetch(&source, &ids(&["ID1", "ID2", "ID3"]), &options).unwrap();

        assert_eq!(source.fetches(), vec!["ID1,ID2", "ID3"]);
        assert_eq!(
            records.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["ID1", "ID2", "ID3"]
        );
    }

    #[test]
    fn missing_record_is_incomplete() {
        let source = StubSource::new().with_records(vec![record("ID1", "a")]);

        let err = fetch(&source, &ids(&["ID1", "ID9"]), &FetchOptions::default()).unwrap_err();
        assert!(matches!(err, FetchError::Incomplete { expected: 2, parsed: 1 }));
    }

    #[test]
    fn malformed_payload() {
        let source = StubSource::new().with_raw_payload("<html>Service Unavailable</html>\n");

        let err = fetch(&source, &ids(&["ID1"]), &FetchOptions::default()).unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
    }

    #[test]
    fn remote_failure() {
        let source = StubSource::new().failing_fetch();

        let err = fetch(&source, &ids(&["ID1", "ID2"]), &FetchOptions::default()).unwrap_err();
        assert!(matches!(err, FetchError::Request { count: 2, .. }));
    }
}
