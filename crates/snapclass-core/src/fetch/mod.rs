//! Provider fetch loop: quota check, lookup, download, store, classify.
//!
//! Each iteration consumes one unit of the provider's quota before any
//! request is made. A refused quota ends the run with the images collected
//! so far. Classified images are handed to a [`FetchObserver`] one at a time,
//! so callers can render and persist them while the loop continues.

mod pexels;
mod unsplash;

pub use pexels::PexelsSource;
pub use unsplash::UnsplashSource;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::classify::{ImageClassifier, ModelKind};
use crate::config::Config;
use crate::error::{ClassifyError, FetchError, SnapclassError};
use crate::keys::load_access_key;
use crate::pipeline::{decode_bytes, is_image_payload};
use crate::quota::UsageCounter;
use crate::storage;
use crate::types::{ClassificationResult, FetchedImage, Provider, SiteSelection};

/// Result of asking a provider for its next image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Direct URL of the image to download
    Found(String),
    /// Nothing usable this time; the loop moves on
    Skip(String),
}

/// A provider API that yields image URLs.
#[async_trait]
pub trait ImageSource: Send + Sync {
    fn provider(&self) -> Provider;

    async fn next_image(&self, client: &reqwest::Client) -> Result<Lookup, FetchError>;
}

pub(crate) fn network_error(provider: Provider, e: reqwest::Error) -> FetchError {
    FetchError::Network {
        provider: provider.to_string(),
        message: e.to_string(),
    }
}

/// Why a fetch run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// All requested iterations ran
    Completed,
    /// The usage counter refused another call
    QuotaExhausted,
    /// No access key configured for the provider
    MissingKey,
    /// An unrecoverable error; the message is already logged
    Aborted(String),
}

/// Paths of stored images plus the reason the run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub paths: Vec<PathBuf>,
    pub stop: StopReason,
}

impl FetchOutcome {
    fn new(paths: Vec<PathBuf>, stop: StopReason) -> Self {
        Self { paths, stop }
    }
}

/// Receives each image as soon as it is classified.
pub trait FetchObserver: Send {
    fn on_classified(&mut self, image: &FetchedImage, result: &ClassificationResult);

    /// Called after every iteration with `(done, total)`.
    fn on_progress(&mut self, _done: usize, _total: usize) {}

    fn on_skipped(&mut self, _provider: Provider, _reason: &str) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl FetchObserver for NoopObserver {
    fn on_classified(&mut self, _image: &FetchedImage, _result: &ClassificationResult) {}
}

enum Step {
    Stored(PathBuf),
    Skipped,
    Stop(StopReason),
}

/// Fetches images from Unsplash and Pexels and classifies them.
pub struct Fetcher {
    client: reqwest::Client,
    counter: UsageCounter,
    classifier: Arc<dyn ImageClassifier>,
    sources: HashMap<Provider, Box<dyn ImageSource>>,
    dirs: HashMap<Provider, PathBuf>,
}

impl Fetcher {
    /// Build a fetcher from config. Providers without an access key are left
    /// out and report `StopReason::MissingKey` when asked for images.
    pub fn new(
        config: &Config,
        counter: UsageCounter,
        classifier: Arc<dyn ImageClassifier>,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.fetch.timeout_ms))
            .build()
            .map_err(|e| FetchError::Network {
                provider: "HTTP client".to_string(),
                message: e.to_string(),
            })?;

        let keys_path = config.keys_path();
        let mut sources: HashMap<Provider, Box<dyn ImageSource>> = HashMap::new();

        if let Some(key) = load_access_key(&keys_path, Provider::Unsplash) {
            sources.insert(
                Provider::Unsplash,
                Box::new(UnsplashSource::new(&key, &config.fetch.unsplash_endpoint)),
            );
        }
        if let Some(key) = load_access_key(&keys_path, Provider::Pexels) {
            sources.insert(
                Provider::Pexels,
                Box::new(PexelsSource::new(
                    &key,
                    &config.fetch.pexels_endpoint,
                    &config.fetch.pexels_query,
                )),
            );
        }

        let dirs = Provider::ALL
            .iter()
            .map(|&p| (p, config.provider_dir(p)))
            .collect();

        Ok(Self {
            client,
            counter,
            classifier,
            sources,
            dirs,
        })
    }

    pub fn counter(&self) -> &UsageCounter {
        &self.counter
    }

    /// Whether an access key was found for `provider`.
    pub fn has_source(&self, provider: Provider) -> bool {
        self.sources.contains_key(&provider)
    }

    /// Dispatch on a site selection.
    pub async fn fetch(
        &self,
        site: SiteSelection,
        count: usize,
        model: ModelKind,
        observer: &mut dyn FetchObserver,
    ) -> FetchOutcome {
        match site {
            SiteSelection::Single(provider) => {
                self.fetch_and_classify(count, provider, model, observer).await
            }
            SiteSelection::Both => self.fetch_alternating(count, model, observer).await,
        }
    }

    /// Fetch up to `count` images from one provider, classifying each.
    pub async fn fetch_and_classify(
        &self,
        count: usize,
        provider: Provider,
        model: ModelKind,
        observer: &mut dyn FetchObserver,
    ) -> FetchOutcome {
        if !self.has_source(provider) {
            tracing::error!("Failed to load {provider} access key; nothing fetched");
            return FetchOutcome::new(Vec::new(), StopReason::MissingKey);
        }

        let mut paths = Vec::new();
        for done in 0..count {
            match self.fetch_one(provider, model, observer).await {
                Step::Stored(path) => paths.push(path),
                Step::Skipped => {}
                Step::Stop(reason) => return FetchOutcome::new(paths, reason),
            }
            observer.on_progress(done + 1, count);
        }

        tracing::info!("Fetched {} image(s) from {provider}", paths.len());
        FetchOutcome::new(paths, StopReason::Completed)
    }

    /// Fetch `count` images, picking Unsplash or Pexels at random each time.
    ///
    /// A provider that runs out of quota or has no key drops out; the run
    /// ends early only once both have.
    pub async fn fetch_alternating(
        &self,
        count: usize,
        model: ModelKind,
        observer: &mut dyn FetchObserver,
    ) -> FetchOutcome {
        let mut available: Vec<Provider> = Provider::ALL
            .iter()
            .copied()
            .filter(|p| self.has_source(*p))
            .collect();
        if available.is_empty() {
            tracing::error!("No provider access keys found; nothing fetched");
            return FetchOutcome::new(Vec::new(), StopReason::MissingKey);
        }

        let mut paths = Vec::new();
        let mut last_stop = StopReason::Completed;

        for done in 0..count {
            if available.is_empty() {
                return FetchOutcome::new(paths, last_stop);
            }
            let provider = {
                let mut rng = rand::thread_rng();
                available[rng.gen_range(0..available.len())]
            };

            match self.fetch_one(provider, model, observer).await {
                Step::Stored(path) => paths.push(path),
                Step::Skipped => {}
                Step::Stop(StopReason::Aborted(message)) => {
                    return FetchOutcome::new(paths, StopReason::Aborted(message));
                }
                Step::Stop(reason) => {
                    tracing::info!("{provider} dropped out of alternating fetch: {reason:?}");
                    available.retain(|p| *p != provider);
                    last_stop = reason;
                }
            }
            observer.on_progress(done + 1, count);
        }

        let stop = if available.is_empty() {
            last_stop
        } else {
            StopReason::Completed
        };
        FetchOutcome::new(paths, stop)
    }

    async fn fetch_one(
        &self,
        provider: Provider,
        model: ModelKind,
        observer: &mut dyn FetchObserver,
    ) -> Step {
        match self.try_fetch_one(provider, model, observer).await {
            Ok(step) => step,
            Err(e) => {
                tracing::error!("Error fetching image from {provider}: {e}");
                Step::Stop(StopReason::Aborted(e.to_string()))
            }
        }
    }

    async fn try_fetch_one(
        &self,
        provider: Provider,
        model: ModelKind,
        observer: &mut dyn FetchObserver,
    ) -> Result<Step, SnapclassError> {
        let Some(source) = self.sources.get(&provider) else {
            return Ok(Step::Stop(StopReason::MissingKey));
        };

        if !self.counter.check_and_consume(provider)? {
            return Ok(Step::Stop(StopReason::QuotaExhausted));
        }

        let url = match source.next_image(&self.client).await? {
            Lookup::Found(url) => url,
            Lookup::Skip(reason) => {
                tracing::warn!("{reason}");
                observer.on_skipped(provider, &reason);
                return Ok(Step::Skipped);
            }
        };

        let bytes = self.download(provider, &url).await?;
        let image = self.store(provider, bytes)?;

        let decoded = decode_bytes(&image.bytes, &image.path)?;
        let classifier = Arc::clone(&self.classifier);
        let result = tokio::task::spawn_blocking(move || classifier.classify(&decoded, model))
            .await
            .map_err(|e| ClassifyError::Inference {
                model: model.to_string(),
                message: format!("Classification task failed: {e}"),
            })??;

        tracing::debug!("Classified {} with {model}", image.file_name);
        observer.on_classified(&image, &result);
        Ok(Step::Stored(image.path))
    }

    async fn download(&self, provider: Provider, url: &str) -> Result<Vec<u8>, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| network_error(provider, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                provider: provider.to_string(),
                status: status.as_u16(),
                body: format!("image download from {url}"),
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| network_error(provider, e))?
            .to_vec();

        if !is_image_payload(&bytes) {
            return Err(FetchError::Malformed {
                provider: provider.to_string(),
                message: format!("{url} did not return an image"),
            });
        }
        Ok(bytes)
    }

    fn store(&self, provider: Provider, bytes: Vec<u8>) -> Result<FetchedImage, FetchError> {
        let dir = self
            .dirs
            .get(&provider)
            .cloned()
            .unwrap_or_else(|| PathBuf::from(format!("{}_images", provider.file_prefix())));
        let path = storage::unique_image_path(&dir, provider.file_prefix());

        storage::save_fetched_image(&bytes, &path).map_err(|source| FetchError::Storage {
            path: path.clone(),
            source,
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        tracing::info!("Image saved to {}", path.display());

        Ok(FetchedImage {
            provider,
            file_name,
            path,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Prediction;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;
    use std::path::Path;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedClassifier;

    impl ImageClassifier for FixedClassifier {
        fn classify(
            &self,
            _image: &DynamicImage,
            model: ModelKind,
        ) -> Result<ClassificationResult, ClassifyError> {
            Ok(ClassificationResult {
                model,
                predictions: vec![Prediction::new("n01440764", "tench", 91.5)],
            })
        }
    }

    #[derive(Default)]
    struct Collect {
        classified: Vec<(String, String)>,
        skipped: usize,
        progress: Vec<(usize, usize)>,
    }

    impl FetchObserver for Collect {
        fn on_classified(&mut self, image: &FetchedImage, result: &ClassificationResult) {
            let top = result.top().map(|p| p.class_name.clone()).unwrap_or_default();
            self.classified.push((image.file_name.clone(), top));
        }

        fn on_progress(&mut self, done: usize, total: usize) {
            self.progress.push((done, total));
        }

        fn on_skipped(&mut self, _provider: Provider, _reason: &str) {
            self.skipped += 1;
        }
    }

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(8, 8));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn test_config(root: &Path, server: &MockServer, keys: serde_json::Value) -> Config {
        std::fs::write(root.join("config.json"), keys.to_string()).unwrap();
        let mut config = Config::default();
        config.storage.keys_file = root.join("config.json");
        config.storage.usage_file = root.join("api_usage.txt");
        config.storage.unsplash_dir = root.join("unsplash_images");
        config.storage.pexels_dir = root.join("pexels_images");
        config.fetch.unsplash_endpoint = server.uri();
        config.fetch.pexels_endpoint = server.uri();
        config
    }

    fn fetcher(config: &Config, limit: u32) -> Fetcher {
        let counter = UsageCounter::new(config.usage_path(), limit);
        Fetcher::new(config, counter, Arc::new(FixedClassifier)).unwrap()
    }

    async fn mount_unsplash(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/photos/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "urls": { "full": format!("{}/img/u.jpg", server.uri()) }
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/img/u.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes()))
            .mount(server)
            .await;
    }

    async fn mount_both(server: &MockServer) {
        mount_unsplash(server).await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "photos": [{ "src": { "original": format!("{}/img/p.jpg", server.uri()) } }]
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/img/p.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes()))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_stores_classifies_and_counts() {
        let server = MockServer::start().await;
        mount_unsplash(&server).await;
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), &server, serde_json::json!({"unsplash_access_key": "u"}));
        let fetcher = fetcher(&config, 10);

        let mut observer = Collect::default();
        let outcome = fetcher
            .fetch_and_classify(2, Provider::Unsplash, ModelKind::ResNet50, &mut observer)
            .await;

        assert_eq!(outcome.stop, StopReason::Completed);
        assert_eq!(outcome.paths.len(), 2);
        assert_ne!(outcome.paths[0], outcome.paths[1]);
        for p in &outcome.paths {
            assert!(p.exists());
            assert!(p.starts_with(dir.path().join("unsplash_images")));
        }
        assert_eq!(observer.classified.len(), 2);
        assert!(observer.classified[0].0.starts_with("unsplash_"));
        assert_eq!(observer.classified[0].1, "tench");
        assert_eq!(observer.progress, vec![(1, 2), (2, 2)]);
        assert_eq!(fetcher.counter().count(Provider::Unsplash).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_quota_refusal_returns_partial_results() {
        let server = MockServer::start().await;
        mount_unsplash(&server).await;
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), &server, serde_json::json!({"unsplash_access_key": "u"}));
        let fetcher = fetcher(&config, 1);

        let outcome = fetcher
            .fetch_and_classify(3, Provider::Unsplash, ModelKind::Vgg16, &mut NoopObserver)
            .await;

        assert_eq!(outcome.stop, StopReason::QuotaExhausted);
        assert_eq!(outcome.paths.len(), 1);
        assert_eq!(fetcher.counter().count(Provider::Unsplash).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_key_returns_empty() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), &server, serde_json::json!({"unsplash_access_key": "u"}));
        let fetcher = fetcher(&config, 10);

        let outcome = fetcher
            .fetch_and_classify(2, Provider::Pexels, ModelKind::ResNet50, &mut NoopObserver)
            .await;

        assert_eq!(outcome.stop, StopReason::MissingKey);
        assert!(outcome.paths.is_empty());
        assert_eq!(fetcher.counter().count(Provider::Pexels).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_pexels_empty_page_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"photos": []})))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), &server, serde_json::json!({"pexels_access_key": "p"}));
        let fetcher = fetcher(&config, 10);

        let mut observer = Collect::default();
        let outcome = fetcher
            .fetch_and_classify(2, Provider::Pexels, ModelKind::ResNet50, &mut observer)
            .await;

        assert_eq!(outcome.stop, StopReason::Completed);
        assert!(outcome.paths.is_empty());
        assert_eq!(observer.skipped, 2);
    }

    #[tokio::test]
    async fn test_failed_download_aborts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "urls": { "full": format!("{}/img/gone.jpg", server.uri()) }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/img/gone.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), &server, serde_json::json!({"unsplash_access_key": "u"}));
        let fetcher = fetcher(&config, 10);

        let outcome = fetcher
            .fetch_and_classify(3, Provider::Unsplash, ModelKind::ResNet50, &mut NoopObserver)
            .await;

        assert!(matches!(outcome.stop, StopReason::Aborted(_)));
        assert!(outcome.paths.is_empty());
    }

    #[tokio::test]
    async fn test_alternating_continues_after_one_provider_drops_out() {
        let server = MockServer::start().await;
        mount_both(&server).await;
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(
            dir.path(),
            &server,
            serde_json::json!({"unsplash_access_key": "u", "pexels_access_key": "p"}),
        );
        let fetcher = fetcher(&config, 1);

        let outcome = fetcher
            .fetch_alternating(6, ModelKind::InceptionV3, &mut NoopObserver)
            .await;

        // One image per provider before both quotas run out.
        assert_eq!(outcome.paths.len(), 2);
        assert_eq!(outcome.stop, StopReason::QuotaExhausted);
        assert_eq!(fetcher.counter().count(Provider::Unsplash).unwrap(), 1);
        assert_eq!(fetcher.counter().count(Provider::Pexels).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_alternating_reports_exhaustion_on_final_iteration() {
        let server = MockServer::start().await;
        mount_both(&server).await;
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(
            dir.path(),
            &server,
            serde_json::json!({"unsplash_access_key": "u", "pexels_access_key": "p"}),
        );
        let fetcher = fetcher(&config, 1);

        // Each provider takes one success and one refusal, so the fourth
        // iteration always removes the last provider.
        let outcome = fetcher
            .fetch_alternating(4, ModelKind::ResNet50, &mut NoopObserver)
            .await;

        assert_eq!(outcome.paths.len(), 2);
        assert_eq!(outcome.stop, StopReason::QuotaExhausted);
    }
}
