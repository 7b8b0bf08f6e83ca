use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::EntrezConfig;
use crate::error::RemoteError;
use crate::parse::RecordFormat;
use crate::record::IdentifierList;

/// The remote service records are discovered and downloaded from.
pub trait RecordSource {
    /// Returns the identifiers matching `term`, at most `max_results` of them, in the order the
    /// service ranks them.
    fn search(&self, term: &str, max_results: usize) -> Result<IdentifierList, RemoteError>;

    /// Downloads the full records for a comma-separated list of identifiers as one raw payload.
    fn fetch_batch(&self, ids: &str, format: RecordFormat) -> Result<String, RemoteError>;
}

impl<T: RecordSource + ?Sized> RecordSource for &T {
    fn search(&self, term: &str, max_results: usize) -> Result<IdentifierList, RemoteError> {
        (**self).search(term, max_results)
    }

    fn fetch_batch(&self, ids: &str, format: RecordFormat) -> Result<String, RemoteError> {
        (**self).fetch_batch(ids, format)
    }
}

#[derive(Deserialize)]
struct SearchEnvelope {
    esearchresult: SearchResult,
}

#[derive(Deserialize)]
struct SearchResult {
    #[serde(default)]
    idlist: Vec<String>,
    #[serde(rename = "ERROR")]
    error: Option<String>,
}

/// Blocking client for NCBI E-utilities (`esearch.fcgi` and `efetch.fcgi`).
pub struct EntrezClient {
    client: Client,
    config: EntrezConfig,
}

impl EntrezClient {
    pub fn new(config: &EntrezConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(EntrezClient {
            client,
            config: config.clone(),
        })
    }

    fn endpoint(&self, utility: &str) -> String {
        format!("{}/{utility}.fcgi", self.config.base_url.trim_end_matches('/'))
    }

    /// Query parameters sent with every request.
    fn common_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("db", self.config.database.clone()),
            ("tool", self.config.tool.clone()),
            ("email", self.config.email.clone()),
        ];
        if let Some(key) = &self.config.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }
}

impl RecordSource for EntrezClient {
    fn search(&self, term: &str, max_results: usize) -> Result<IdentifierList, RemoteError> {
        let url = self.endpoint("esearch");
        debug!("GET {url} term={term:?} retmax={max_results}");

        let mut params = self.common_params();
        params.push(("term", term.to_string()));
        params.push(("retmax", max_results.to_string()));
        params.push(("retmode", "json".to_string()));

        let envelope: SearchEnvelope = self
            .client
            .get(url)
            .query(&params)
            .send()?
            .error_for_status()?
            .json()?;

        match envelope.esearchresult.error {
            Some(e) => Err(RemoteError::Response(e)),
            None => Ok(envelope.esearchresult.idlist),
        }
    }

    fn fetch_batch(&self, ids: &str, format: RecordFormat) -> Result<String, RemoteError> {
        let url = self.endpoint("efetch");
        debug!("GET {url} id={ids} rettype={}", format.rettype());

        let mut params = self.common_params();
        params.push(("id", ids.to_string()));
        params.push(("rettype", format.rettype().to_string()));
        params.push(("retmode", "text".to_string()));

        let payload = self
            .client
            .get(url)
            .query(&params)
            .send()?
            .error_for_status()?
            .text()?;

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let config = EntrezConfig {
            base_url: "http://localhost:8080/eutils/".to_string(),
            ..EntrezConfig::default()
        };
        let client = EntrezClient::new(&config).unwrap();
        assert_eq!(client.endpoint("esearch"), "http://localhost:8080/eutils/esearch.fcgi");
    }

    #[test]
    fn api_key_is_only_sent_when_configured() {
        let client = EntrezClient::new(&EntrezConfig::default()).unwrap();
        assert!(!client.common_params().iter().any(|(k, _)| *k == "api_key"));

        let config = EntrezConfig {
            api_key: Some("secret".to_string()),
            ..EntrezConfig::default()
        };
        let client = EntrezClient::new(&config).unwrap();
        assert!(client.common_params().contains(&("api_key", "secret".to_string())));
    }

    #[test]
    fn search_response_decoding() {
        let body = r#"{"header": {}, "esearchresult": {"count": "2", "idlist": ["15225587", "42569394"]}}"#;
        let envelope: SearchEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.esearchresult.idlist, vec!["15225587", "42569394"]);
        assert!(envelope.esearchresult.error.is_none());

        let body = r#"{"esearchresult": {"ERROR": "Invalid query"}}"#;
        let envelope: SearchEnvelope = serde_json::from_str(body).unwrap();
        assert!(envelope.esearchresult.idlist.is_empty());
        assert_eq!(envelope.esearchresult.error.as_deref(), Some("Invalid query"));
    }
}
