use crate::models::responses::BookResult;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org";
pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Open Library responded with {0}")]
    Status(u16),
}

#[derive(Debug, Default, Deserialize)]
struct SearchDocs {
    #[serde(default)]
    docs: Vec<OpenLibraryDoc>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenLibraryDoc {
    title: Option<String>,
    author_name: Option<AuthorName>,
    first_publish_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AuthorName {
    Many(Vec<String>),
    One(String),
}

pub struct OpenLibraryClient {
    client: Client,
    base_url: String,
    limit: usize,
    timeout: Duration,
}

impl OpenLibraryClient {
    pub fn new(base_url: &str, limit: usize, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            limit,
            timeout,
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<BookResult>, CatalogError> {
        let url = format!("{}/search.json", self.base_url);
        let limit = self.limit.to_string();

        info!("Searching Open Library for {:?}", query);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("limit", limit.as_str())])
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status().as_u16()));
        }

        let data: SearchDocs = response.json().await?;

        Ok(data.docs.into_iter().take(self.limit).map(to_book).collect())
    }
}

fn to_book(doc: OpenLibraryDoc) -> BookResult {
    let title = doc
        .title
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| "Untitled".to_string());

    let author = match doc.author_name {
        Some(AuthorName::Many(names)) => names.into_iter().next(),
        Some(AuthorName::One(name)) => Some(name),
        None => None,
    }
    .filter(|name| !name.is_empty())
    .unwrap_or_else(|| "Unknown".to_string());

    BookResult {
        title,
        author,
        year: doc.first_publish_year.filter(|year| *year != 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn doc(raw: serde_json::Value) -> OpenLibraryDoc {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_to_book_takes_first_author() {
        let book = to_book(doc(json!({
            "title": "Good Omens",
            "author_name": ["Terry Pratchett", "Neil Gaiman"],
            "first_publish_year": 1990
        })));

        assert_eq!(
            book,
            BookResult {
                title: "Good Omens".to_string(),
                author: "Terry Pratchett".to_string(),
                year: Some(1990),
            }
        );
    }

    #[test]
    fn test_to_book_single_author_string() {
        let book = to_book(doc(json!({"title": "Emma", "author_name": "Jane Austen"})));

        assert_eq!(book.author, "Jane Austen");
        assert_eq!(book.year, None);
    }

    #[test]
    fn test_to_book_defaults() {
        let book = to_book(doc(json!({"title": "", "author_name": [], "first_publish_year": 0})));

        assert_eq!(book.title, "Untitled");
        assert_eq!(book.author, "Unknown");
        assert_eq!(book.year, None);

        assert_eq!(to_book(OpenLibraryDoc::default()).title, "Untitled");
    }

    #[tokio::test]
    async fn test_search_maps_and_caps_docs() {
        let mock_server = MockServer::start().await;
        let docs: Vec<_> = (0..15)
            .map(|i| json!({"title": format!("War and Peace vol {}", i), "author_name": ["Leo Tolstoy"]}))
            .collect();

        Mock::given(method("GET"))
            .and(path("/search.json"))
            .and(query_param("q", "tolstoy"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"numFound": 15, "docs": docs})))
            .mount(&mock_server)
            .await;

        let client = OpenLibraryClient::new(&mock_server.uri(), DEFAULT_LIMIT, DEFAULT_TIMEOUT);
        let books = client.search("tolstoy").await.unwrap();

        assert_eq!(books.len(), 10);
        assert_eq!(books[0].title, "War and Peace vol 0");
        assert_eq!(books[0].author, "Leo Tolstoy");
    }

    #[tokio::test]
    async fn test_search_reports_upstream_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let client = OpenLibraryClient::new(&mock_server.uri(), DEFAULT_LIMIT, DEFAULT_TIMEOUT);
        let err = client.search("tolstoy").await.unwrap_err();

        assert!(matches!(err, CatalogError::Status(502)));
    }
}
