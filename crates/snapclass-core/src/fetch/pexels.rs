//! Pexels search source. Walks result pages one photo at a time.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use serde::Deserialize;

use super::{network_error, ImageSource, Lookup};
use crate::error::FetchError;
use crate::types::Provider;

pub struct PexelsSource {
    access_key: String,
    endpoint: String,
    query: String,
    /// Next page to request. Advances only after a photo was found.
    page: AtomicU32,
}

impl PexelsSource {
    pub fn new(access_key: &str, endpoint: &str, query: &str) -> Self {
        Self {
            access_key: access_key.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            query: query.to_string(),
            page: AtomicU32::new(1),
        }
    }

    pub fn page(&self) -> u32 {
        self.page.load(Ordering::Relaxed)
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Deserialize)]
struct Photo {
    src: PhotoSrc,
}

#[derive(Deserialize)]
struct PhotoSrc {
    original: String,
}

#[async_trait]
impl ImageSource for PexelsSource {
    fn provider(&self) -> Provider {
        Provider::Pexels
    }

    async fn next_image(&self, client: &reqwest::Client) -> Result<Lookup, FetchError> {
        let page = self.page();
        let page_param = page.to_string();
        let resp = client
            .get(format!("{}/search", self.endpoint))
            .header("Authorization", &self.access_key)
            .query(&[
                ("query", self.query.as_str()),
                ("per_page", "1"),
                ("page", page_param.as_str()),
            ])
            .send()
            .await
            .map_err(|e| network_error(Provider::Pexels, e))?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Ok(Lookup::Skip(format!(
                "Failed to fetch image from Pexels (HTTP {})",
                status.as_u16()
            )));
        }

        let search: SearchResponse = resp.json().await.map_err(|e| FetchError::Malformed {
            provider: Provider::Pexels.to_string(),
            message: e.to_string(),
        })?;

        match search.photos.into_iter().next() {
            Some(photo) => {
                self.page.fetch_add(1, Ordering::Relaxed);
                Ok(Lookup::Found(photo.src.original))
            }
            None => Ok(Lookup::Skip(format!("No Pexels photos on page {page}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn photo_page(url: &str) -> serde_json::Value {
        serde_json::json!({
            "page": 1,
            "per_page": 1,
            "photos": [{ "id": 7, "src": { "original": url, "large": "l.jpg" } }]
        })
    }

    #[tokio::test]
    async fn test_search_params_and_page_advance() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(header("Authorization", "key123"))
            .and(query_param("query", "nature"))
            .and(query_param("per_page", "1"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(photo_page("https://p/1.jpeg")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(photo_page("https://p/2.jpeg")))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let source = PexelsSource::new("key123", &server.uri(), "nature");
        assert_eq!(
            source.next_image(&client).await.unwrap(),
            Lookup::Found("https://p/1.jpeg".to_string())
        );
        assert_eq!(
            source.next_image(&client).await.unwrap(),
            Lookup::Found("https://p/2.jpeg".to_string())
        );
        assert_eq!(source.page(), 3);
    }

    #[tokio::test]
    async fn test_empty_results_skip_without_advancing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"photos": []})))
            .mount(&server)
            .await;

        let source = PexelsSource::new("k", &server.uri(), "nature");
        let lookup = source.next_image(&reqwest::Client::new()).await.unwrap();
        assert!(matches!(lookup, Lookup::Skip(_)));
        assert_eq!(source.page(), 1);
    }

    #[tokio::test]
    async fn test_non_200_skips() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let source = PexelsSource::new("k", &server.uri(), "nature");
        let lookup = source.next_image(&reqwest::Client::new()).await.unwrap();
        match lookup {
            Lookup::Skip(reason) => assert!(reason.contains("429")),
            other => panic!("expected skip, got {other:?}"),
        }
    }
}
