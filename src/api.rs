//! NewsAPI access behind a small async trait.
//!
//! # Architecture
//!
//! - [`NewsSource`]: Core trait for fetching one category's raw articles
//! - [`NewsApiClient`]: `reqwest`-backed implementation against NewsAPI v2
//! - [`FetchError`]: Everything that can go wrong in one fetch
//!
//! The store only ever talks to a [`NewsSource`], so tests substitute a
//! scripted source and never touch the network.
//!
//! # Endpoints
//!
//! | Category | Request |
//! |----------|---------|
//! | `headlines` | `GET <base>/v2/everything?q=<topic>&apiKey=<key>` |
//! | anything else | `GET <base>/v2/top-headlines?category=<id>&apiKey=<key>` |
//!
//! No retries are attempted here. A failed fetch is reported once and the
//! user retries by refreshing.

use crate::models::{ArticlesResponse, Category, RawArticle, UpstreamErrorBody};
use crate::utils::{looks_truncated, truncate_for_log};
use reqwest::{Client, StatusCode};
use std::error::Error;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Failure of a single fetch. Converted to a banner message by the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure: DNS, refused connection, reset, timeout.
    #[error("network error: {0}")]
    Network(String),
    /// The provider answered with a non-200 status.
    #[error("request failed with status code {status}: {message}")]
    Upstream { status: u16, message: String },
    /// 200 OK, but the body is not an object with an `articles` array.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Classify a transport error. The URL is stripped so the API key never
    /// ends up in a message or a log line; the cause chain is kept so the
    /// message says what actually failed.
    fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return FetchError::Network("request timed out".to_string());
        }
        let e = e.without_url();
        let mut message = e.to_string();
        let mut cause = e.source();
        while let Some(inner) = cause {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            cause = inner.source();
        }
        FetchError::Network(message)
    }

    /// Build an upstream error, preferring the provider's own message.
    fn upstream(status: StatusCode, body: &str) -> Self {
        let parsed = serde_json::from_str::<UpstreamErrorBody>(body).unwrap_or_default();
        let message = parsed
            .message
            .or(parsed.code)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "unknown error".to_string());
        FetchError::Upstream {
            status: status.as_u16(),
            message,
        }
    }
}

/// Trait for fetching one category's articles from a news provider.
pub trait NewsSource {
    /// Fetch the current article list for `category`, in provider order.
    async fn fetch(&self, category: &'static Category) -> Result<Vec<RawArticle>, FetchError>;
}

/// Connection settings for [`NewsApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Provider root, e.g. `https://newsapi.org`.
    pub base_url: Url,
    pub api_key: String,
    /// Search term for the headlines category.
    pub topic: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// NewsAPI v2 client.
pub struct NewsApiClient {
    http: Client,
    base_url: Url,
    api_key: String,
    topic: String,
}

impl std::fmt::Debug for NewsApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("topic", &self.topic)
            .finish()
    }
}

impl NewsApiClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is blank or the HTTP client cannot be
    /// built (e.g. TLS backend initialisation fails).
    pub fn new(config: ClientConfig) -> Result<Self, Box<dyn Error>> {
        if config.api_key.trim().is_empty() {
            return Err("API key must not be empty".into());
        }

        // NewsAPI rejects requests without a User-Agent.
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: with_trailing_slash(config.base_url),
            api_key: config.api_key,
            topic: config.topic,
        })
    }

    /// Request URL for `category`, including the API key.
    pub fn endpoint(&self, category: &Category) -> Url {
        let (path, key, value) = if category.is_headlines() {
            ("v2/everything", "q", self.topic.as_str())
        } else {
            ("v2/top-headlines", "category", category.id)
        };

        let mut url = self
            .base_url
            .join(path)
            .unwrap_or_else(|_| self.base_url.clone());
        url.query_pairs_mut()
            .append_pair(key, value)
            .append_pair("apiKey", &self.api_key);
        url
    }
}

impl NewsSource for NewsApiClient {
    #[instrument(level = "info", skip_all, fields(category = %category.id))]
    async fn fetch(&self, category: &'static Category) -> Result<Vec<RawArticle>, FetchError> {
        let url = self.endpoint(category);
        info!(endpoint = %redacted(&url), "Fetching");

        let t0 = Instant::now();
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_transport)?;
        let status = response.status();
        let body = response.text().await.map_err(FetchError::from_transport)?;
        let elapsed_ms = t0.elapsed().as_millis();

        if status != StatusCode::OK {
            warn!(
                status = status.as_u16(),
                elapsed_ms,
                body_preview = %truncate_for_log(&body, 300),
                "Upstream returned an error status"
            );
            return Err(FetchError::upstream(status, &body));
        }

        let articles = parse_articles(&body)?;
        info!(count = articles.len(), elapsed_ms, "Fetched articles");
        Ok(articles)
    }
}

/// Parse a 200 OK body into its article list.
pub fn parse_articles(body: &str) -> Result<Vec<RawArticle>, FetchError> {
    match serde_json::from_str::<ArticlesResponse>(body) {
        Ok(response) => Ok(response.articles),
        Err(e) => {
            debug!(error = %e, body_preview = %truncate_for_log(body, 300), "Unparseable body");
            if looks_truncated(&e) {
                Err(FetchError::Malformed(format!("response body was cut off ({e})")))
            } else {
                Err(FetchError::Malformed(e.to_string()))
            }
        }
    }
}

/// Render `url` for logging with the `apiKey` value masked.
pub fn redacted(url: &Url) -> String {
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "apiKey" { "REDACTED".into() } else { v };
            (k.into_owned(), v.into_owned())
        })
        .collect();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}

/// `Url::join` replaces the last path segment unless the base ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    fn client(base: &str) -> NewsApiClient {
        NewsApiClient::new(ClientConfig {
            base_url: Url::parse(base).unwrap(),
            api_key: "secret-key".to_string(),
            topic: "india".to_string(),
            timeout: None,
        })
        .unwrap()
    }

    fn query(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    /// Client for a loopback server. Proxies from the environment are
    /// ignored so the request really reaches 127.0.0.1.
    fn local_client(base: Url, timeout: Option<Duration>) -> NewsApiClient {
        let mut builder = Client::builder().user_agent(USER_AGENT).no_proxy();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        NewsApiClient {
            http: builder.build().unwrap(),
            base_url: with_trailing_slash(base),
            api_key: "secret-key".to_string(),
            topic: "india".to_string(),
        }
    }

    /// Accept one connection, hand back its request head, and answer with
    /// `status_line` and `body`.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (Url, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let _ = tx.send(String::from_utf8_lossy(&head).into_owned());

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        (Url::parse(&format!("http://{addr}")).unwrap(), rx)
    }

    fn sports() -> &'static Category {
        Category::lookup("sports").unwrap()
    }

    #[test]
    fn test_headlines_endpoint_uses_everything_search() {
        let client = client("https://newsapi.org");
        let url = client.endpoint(Category::lookup("headlines").unwrap());

        assert_eq!(url.path(), "/v2/everything");
        let q = query(&url);
        assert_eq!(q.get("q").map(String::as_str), Some("india"));
        assert_eq!(q.get("apiKey").map(String::as_str), Some("secret-key"));
        assert!(!q.contains_key("category"));
    }

    #[test]
    fn test_category_endpoint_uses_top_headlines() {
        let client = client("https://newsapi.org");
        let url = client.endpoint(Category::lookup("sports").unwrap());

        assert_eq!(url.host_str(), Some("newsapi.org"));
        assert_eq!(url.path(), "/v2/top-headlines");
        let q = query(&url);
        assert_eq!(q.get("category").map(String::as_str), Some("sports"));
        assert_eq!(q.get("apiKey").map(String::as_str), Some("secret-key"));
        assert!(!q.contains_key("q"));
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let client = client("http://localhost:8080/proxy");
        let url = client.endpoint(Category::lookup("health").unwrap());
        assert_eq!(url.path(), "/proxy/v2/top-headlines");
    }

    #[test]
    fn test_topic_is_percent_encoded() {
        let client = NewsApiClient::new(ClientConfig {
            base_url: Url::parse("https://newsapi.org").unwrap(),
            api_key: "k".to_string(),
            topic: "new delhi & mumbai".to_string(),
            timeout: None,
        })
        .unwrap();
        let url = client.endpoint(Category::default_category());
        assert_eq!(
            query(&url).get("q").map(String::as_str),
            Some("new delhi & mumbai")
        );
        assert!(!url.as_str().contains(' '));
    }

    #[test]
    fn test_blank_api_key_rejected() {
        let result = NewsApiClient::new(ClientConfig {
            base_url: Url::parse("https://newsapi.org").unwrap(),
            api_key: "   ".to_string(),
            topic: "india".to_string(),
            timeout: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_redacted_hides_key() {
        let client = client("https://newsapi.org");
        let url = client.endpoint(Category::lookup("business").unwrap());
        let shown = redacted(&url);
        assert!(!shown.contains("secret-key"));
        assert!(shown.contains("apiKey=REDACTED"));
        assert!(shown.contains("category=business"));
    }

    #[test]
    fn test_debug_output_hides_key() {
        let client = client("https://newsapi.org");
        assert!(!format!("{client:?}").contains("secret-key"));
    }

    #[test]
    fn test_parse_articles_ok() {
        let body = r#"{"status":"ok","totalResults":1,"articles":[{"title":"One"}]}"#;
        let articles = parse_articles(body).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title.as_deref(), Some("One"));
    }

    #[test]
    fn test_parse_articles_empty_list() {
        let articles = parse_articles(r#"{"articles":[]}"#).unwrap();
        assert!(articles.is_empty());
    }

    #[test]
    fn test_parse_articles_malformed() {
        for body in ["", "[]", r#"{"status":"ok"}"#, r#"{"articles":"nope"}"#, "<html>"] {
            match parse_articles(body) {
                Err(FetchError::Malformed(msg)) => assert!(!msg.is_empty()),
                other => panic!("expected Malformed for {body:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_articles_rejects_non_object_elements() {
        for body in [r#"{"articles":[null]}"#, r#"{"articles":[{"title":"ok"},42]}"#] {
            match parse_articles(body) {
                Err(FetchError::Malformed(msg)) => assert!(!msg.is_empty()),
                other => panic!("expected Malformed for {body:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_articles_truncated_body() {
        match parse_articles(r#"{"articles":[{"title":"cut"#) {
            Err(FetchError::Malformed(msg)) => assert!(msg.contains("cut off")),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_upstream_error_prefers_provider_message() {
        let err = FetchError::upstream(
            StatusCode::UNAUTHORIZED,
            r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#,
        );
        assert_eq!(
            err,
            FetchError::Upstream {
                status: 401,
                message: "Your API key is invalid.".to_string()
            }
        );
    }

    #[test]
    fn test_upstream_error_falls_back_to_reason() {
        let err = FetchError::upstream(StatusCode::INTERNAL_SERVER_ERROR, "oops");
        assert_eq!(
            err.to_string(),
            "request failed with status code 500: Internal Server Error"
        );
    }

    #[tokio::test]
    async fn test_fetch_ok_over_http() {
        let (base, request) =
            serve_once("200 OK", r#"{"articles":[{"title":"A"},{"title":null}]}"#).await;
        let client = local_client(base, None);

        let articles = client.fetch(sports()).await.unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title.as_deref(), Some("A"));
        assert_eq!(articles[1].title, None);

        let head = request.await.unwrap();
        assert!(
            head.starts_with("GET /v2/top-headlines?category=sports&apiKey=secret-key HTTP/1.1")
        );
        assert!(head.to_ascii_lowercase().contains(&format!("user-agent: {USER_AGENT}")));
    }

    #[tokio::test]
    async fn test_fetch_error_status_over_http() {
        let (base, _request) = serve_once("500 Internal Server Error", "oops").await;
        let client = local_client(base, None);

        let err = client.fetch(sports()).await.unwrap_err();

        assert_eq!(
            err,
            FetchError::Upstream {
                status: 500,
                message: "Internal Server Error".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_non_json_body_over_http() {
        let (base, _request) = serve_once("200 OK", "<html>maintenance</html>").await;
        let client = local_client(base, None);

        match client.fetch(sports()).await {
            Err(FetchError::Malformed(msg)) => assert!(!msg.is_empty()),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_reports_cause() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = local_client(Url::parse(&format!("http://{addr}")).unwrap(), None);

        match client.fetch(sports()).await {
            Err(FetchError::Network(msg)) => {
                // The top-level reqwest text alone ("error sending request")
                // does not say what went wrong; the cause has to follow it.
                assert!(msg.contains(": "), "no cause in {msg:?}");
                assert!(!msg.contains("secret-key"));
            }
            other => panic!("expected Network, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_a_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });
        let client = local_client(
            Url::parse(&format!("http://{addr}")).unwrap(),
            Some(Duration::from_millis(200)),
        );

        let err = client.fetch(sports()).await.unwrap_err();

        assert_eq!(err, FetchError::Network("request timed out".to_string()));
    }
}
