//! Unsplash random-photo source.

use async_trait::async_trait;
use serde::Deserialize;

use super::{network_error, ImageSource, Lookup};
use crate::error::FetchError;
use crate::types::Provider;

pub struct UnsplashSource {
    access_key: String,
    endpoint: String,
}

impl UnsplashSource {
    pub fn new(access_key: &str, endpoint: &str) -> Self {
        Self {
            access_key: access_key.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Deserialize)]
struct RandomPhoto {
    urls: PhotoUrls,
}

#[derive(Deserialize)]
struct PhotoUrls {
    full: String,
}

#[async_trait]
impl ImageSource for UnsplashSource {
    fn provider(&self) -> Provider {
        Provider::Unsplash
    }

    async fn next_image(&self, client: &reqwest::Client) -> Result<Lookup, FetchError> {
        let resp = client
            .get(format!("{}/photos/random", self.endpoint))
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .send()
            .await
            .map_err(|e| network_error(Provider::Unsplash, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                provider: Provider::Unsplash.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let photo: RandomPhoto = resp.json().await.map_err(|e| FetchError::Malformed {
            provider: Provider::Unsplash.to_string(),
            message: e.to_string(),
        })?;

        Ok(Lookup::Found(photo.urls.full))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_random_photo_uses_client_id_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/random"))
            .and(header("Authorization", "Client-ID abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "x1",
                "urls": { "full": "https://images.example/full.jpg", "small": "s.jpg" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let source = UnsplashSource::new("abc", &server.uri());
        let lookup = source.next_image(&reqwest::Client::new()).await.unwrap();
        assert_eq!(lookup, Lookup::Found("https://images.example/full.jpg".to_string()));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/random"))
            .respond_with(ResponseTemplate::new(401).set_body_string("OAuth error"))
            .mount(&server)
            .await;

        let source = UnsplashSource::new("bad", &server.uri());
        let err = source.next_image(&reqwest::Client::new()).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_missing_urls_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "x1"})))
            .mount(&server)
            .await;

        let source = UnsplashSource::new("abc", &server.uri());
        let err = source.next_image(&reqwest::Client::new()).await.unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
    }
}
