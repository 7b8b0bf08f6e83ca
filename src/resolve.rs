use crate::entrez::RecordSource;
use crate::error::ResolveError;
use crate::record::IdentifierList;

pub const DEFAULT_MAX_RESULTS: usize = 30;

/// Largest `retmax` the search service accepts.
pub const MAX_RESULTS_LIMIT: usize = 10_000;

/// A validated search: a non-empty term and a result bound in `1..=MAX_RESULTS_LIMIT`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    term: String,
    max_results: usize,
}

impl Query {
    /// Out-of-range bounds are rejected, not clamped.
    pub fn new(term: impl Into<String>, max_results: usize) -> Result<Self, ResolveError> {
        let term = term.into();

        if term.trim().is_empty() {
            return Err(ResolveError::EmptyQuery);
        }
        if max_results == 0 || max_results > MAX_RESULTS_LIMIT {
            return Err(ResolveError::InvalidMaxResults {
                value: max_results,
                limit: MAX_RESULTS_LIMIT,
            });
        }

        Ok(Query { term, max_results })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }
}

/// Resolves `query` to an ordered list of identifiers with a single search request.
///
/// The list is passed on as returned (duplicates included), only truncated to the query's bound
/// in case the service returns more than it was asked for.
pub fn resolve(source: &impl RecordSource, query: &Query) -> Result<IdentifierList, ResolveError> {
    info!("Getting identifiers for the search {}", query.term());

    let mut ids = source
        .search(query.term(), query.max_results())
        .map_err(|source| ResolveError::Search {
            term: query.term().to_string(),
            source,
        })?;

    ids.truncate(query.max_results());

    info!("Search returned {} identifiers", ids.len());
    Ok(ids)
}
