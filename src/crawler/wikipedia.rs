use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log2::debug;
use reqwest::Client;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use url::Url;

use super::config::REQUEST_TIMEOUT_SEC;
use super::source::{Document, DocumentSource, FetchOutcome};

pub const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";
pub const DEFAULT_USER_AGENT: &str = "WikipediaWordFreqProject";

/// Body of a MediaWiki `action=query` response (`formatversion=2`)
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(rename = "continue")]
    continuation: Option<BTreeMap<String, String>>,
    query: Option<QueryBody>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    extract: Option<String>,
    #[serde(default)]
    links: Vec<PageLink>,
}

#[derive(Debug, Deserialize)]
struct PageLink {
    title: String,
}

impl QueryResponse {
    fn into_pages(self) -> Vec<Page> {
        self.query.map(|query| query.pages).unwrap_or_default()
    }
}

/// Wikipedia articles served by the MediaWiki action API
pub struct WikipediaSource {
    client: Client,
    api_url: Url,
    request_timeout_sec: u64,
}

impl WikipediaSource {
    pub fn new(api_url: Url, user_agent: &str) -> Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            api_url,
            request_timeout_sec: REQUEST_TIMEOUT_SEC,
        })
    }

    pub fn with_request_timeout(mut self, request_timeout_sec: u64) -> Self {
        self.request_timeout_sec = request_timeout_sec;
        self
    }

    async fn query(&self, params: &[(String, String)]) -> Result<QueryResponse> {
        let mut url = self.api_url.clone();
        url.query_pairs_mut()
            .append_pair("action", "query")
            .append_pair("format", "json")
            .append_pair("formatversion", "2")
            .append_pair("redirects", "1")
            .extend_pairs(params);

        debug!("Querying {}", url);
        let response = self
            .client
            .get(url.clone())
            .timeout(Duration::from_secs(self.request_timeout_sec))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("Failed to query {}: {}", url, response.status()));
        }

        Ok(response.json::<QueryResponse>().await?)
    }

    /// All article-namespace links of `title`, following continuations.
    async fn fetch_links(&self, title: &str) -> Result<BTreeSet<String>> {
        let mut links = BTreeSet::new();
        let mut continuation: BTreeMap<String, String> = BTreeMap::new();

        loop {
            let mut params = vec![
                ("prop".to_string(), "links".to_string()),
                ("pllimit".to_string(), "max".to_string()),
                ("plnamespace".to_string(), "0".to_string()),
                ("titles".to_string(), title.to_string()),
            ];
            params.extend(std::mem::take(&mut continuation));

            let response = self.query(&params).await?;
            let next = response.continuation.clone();
            for page in response.into_pages() {
                links.extend(page.links.into_iter().map(|link| link.title));
            }

            match next {
                Some(next) => continuation = next,
                None => break,
            }
        }

        Ok(links)
    }
}

#[async_trait]
impl DocumentSource for WikipediaSource {
    async fn fetch(&self, identifier: &str) -> Result<FetchOutcome> {
        let params = [
            ("prop".to_string(), "extracts".to_string()),
            ("explaintext".to_string(), "1".to_string()),
            ("titles".to_string(), identifier.to_string()),
        ];
        let response = self.query(&params).await?;

        let page = response
            .into_pages()
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No page returned for '{}'", identifier))?;

        if page.missing || page.invalid {
            debug!("'{}' is missing or invalid", identifier);
            return Ok(FetchOutcome::NotFound);
        }

        let links = self.fetch_links(&page.title).await?;
        debug!("Found {} links on page '{}'", links.len(), page.title);

        Ok(FetchOutcome::Found(Document {
            identifier: page.title,
            text: page.extract.unwrap_or_default(),
            links,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source_for(server: &MockServer) -> Result<WikipediaSource, Box<dyn std::error::Error>> {
        let api_url = Url::parse(&format!("{}/w/api.php", server.uri()))?;
        Ok(WikipediaSource::new(api_url, DEFAULT_USER_AGENT)?.with_request_timeout(2))
    }

    #[tokio::test]
    async fn test_fetch_existing_page() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("prop", "extracts"))
            .and(query_param("titles", "Matter"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "batchcomplete": true,
                "query": {"pages": [{"pageid": 1, "ns": 0, "title": "Matter", "extract": "Matter is stuff."}]}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("prop", "links"))
            .and(query_param("titles", "Matter"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "batchcomplete": true,
                "query": {"pages": [{"pageid": 1, "ns": 0, "title": "Matter", "links": [
                    {"ns": 0, "title": "Physics"},
                    {"ns": 0, "title": "Chemistry"}
                ]}]}
            })))
            .mount(&server)
            .await;

        let source = source_for(&server)?;
        let outcome = source.fetch("Matter").await?;

        let expected = Document {
            identifier: "Matter".to_string(),
            text: "Matter is stuff.".to_string(),
            links: BTreeSet::from(["Chemistry".to_string(), "Physics".to_string()]),
        };
        assert_eq!(outcome, FetchOutcome::Found(expected));
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_missing_page() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;

        Mock::given(query_param("prop", "extracts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "batchcomplete": true,
                "query": {"pages": [{"ns": 0, "title": "No such article", "missing": true}]}
            })))
            .mount(&server)
            .await;

        // links must not be requested for a missing page
        Mock::given(query_param("prop", "links"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let source = source_for(&server)?;
        assert_eq!(source.fetch("No such article").await?, FetchOutcome::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_invalid_title() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;

        Mock::given(query_param("prop", "extracts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "batchcomplete": true,
                "query": {"pages": [{"title": "a|b", "invalidreason": "bad char", "invalid": true}]}
            })))
            .mount(&server)
            .await;

        let source = source_for(&server)?;
        assert_eq!(source.fetch("a|b").await?, FetchOutcome::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_err() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;

        Mock::given(path("/w/api.php"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = source_for(&server)?;
        assert!(source.fetch("Matter").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_malformed_body_is_err() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;

        Mock::given(path("/w/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let source = source_for(&server)?;
        assert!(source.fetch("Matter").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_err() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;

        Mock::given(path("/w/api.php"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let source = source_for(&server)?.with_request_timeout(1);
        assert!(source.fetch("Matter").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_links_follow_continuation() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;

        Mock::given(query_param("prop", "extracts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"pages": [{"ns": 0, "title": "Matter", "extract": "text"}]}
            })))
            .mount(&server)
            .await;

        Mock::given(query_param("prop", "links"))
            .and(query_param_is_missing("plcontinue"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "continue": {"plcontinue": "1|0|Mass", "continue": "||"},
                "query": {"pages": [{"ns": 0, "title": "Matter", "links": [{"ns": 0, "title": "Atom"}]}]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(query_param("prop", "links"))
            .and(query_param("plcontinue", "1|0|Mass"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "batchcomplete": true,
                "query": {"pages": [{"ns": 0, "title": "Matter", "links": [{"ns": 0, "title": "Mass"}]}]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let source = source_for(&server)?;
        let FetchOutcome::Found(document) = source.fetch("Matter").await? else {
            panic!("expected Matter to be found");
        };
        assert_eq!(document.links, BTreeSet::from(["Atom".to_string(), "Mass".to_string()]));
        Ok(())
    }

    #[tokio::test]
    async fn test_redirect_uses_canonical_title() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;

        Mock::given(query_param("prop", "extracts"))
            .and(query_param("titles", "UK"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {
                    "redirects": [{"from": "UK", "to": "United Kingdom"}],
                    "pages": [{"ns": 0, "title": "United Kingdom", "extract": "A country."}]
                }
            })))
            .mount(&server)
            .await;

        Mock::given(query_param("prop", "links"))
            .and(query_param("titles", "United Kingdom"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"pages": [{"ns": 0, "title": "United Kingdom"}]}
            })))
            .mount(&server)
            .await;

        let source = source_for(&server)?;
        let FetchOutcome::Found(document) = source.fetch("UK").await? else {
            panic!("expected UK to resolve");
        };
        assert_eq!(document.identifier, "United Kingdom");
        assert!(document.links.is_empty());
        Ok(())
    }
}
