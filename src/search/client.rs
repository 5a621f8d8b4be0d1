//! ViSearch client
//!
//! Every operation returns a `SearchOutcome`. Transport, parsing and API
//! errors all end up in `SearchOutcome::Failure`.

use super::models::SearchOutcome;
use super::normalizer::ResultNormalizer;
use super::params::*;
use super::transport::{HttpResponse, ReqwestTransport, Transport};
use crate::config::{ResponseConfig, ViSearchConfig};
use crate::error::{Result, SearchError};
use crate::metrics::METRICS;
use bytes::Bytes;
use std::io::Read;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Service endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Search,
    Recommendation,
    ColorSearch,
    UploadSearch,
    DiscoverSearch,
    SimilarProducts,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Search => "/search",
            Self::Recommendation => "/recommendation",
            Self::ColorSearch => "/colorsearch",
            Self::UploadSearch => "/uploadsearch",
            Self::DiscoverSearch => "/discoversearch",
            Self::SimilarProducts => "/similarproducts",
        }
    }

    pub fn as_str(&self) -> &'static str {
        &self.path()[1..]
    }
}

/// Name given to multipart uploads read from a stream
pub const STREAM_FILE_NAME: &str = "image-stream";

/// ViSearch client
pub struct ViSearchClient<T: Transport = ReqwestTransport> {
    transport: T,
    normalizer: ResultNormalizer,
}

impl ViSearchClient<ReqwestTransport> {
    /// Create a client talking to `config.base_url`
    pub fn new(config: &ViSearchConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(transport, config.response.clone()))
    }
}

impl<T: Transport> ViSearchClient<T> {
    /// Create a client over a custom transport
    pub fn with_transport(transport: T, response_config: ResponseConfig) -> Self {
        Self {
            transport,
            normalizer: ResultNormalizer::new(response_config),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Search by the name of an indexed image
    pub async fn search(&self, params: &SearchParams) -> SearchOutcome {
        let query = params.to_query();
        self.run(Endpoint::Search, async {
            self.transport.get(Endpoint::Search.path(), &query).await
        })
        .await
    }

    /// Recommendations for an indexed image
    pub async fn recommendation(&self, params: &SearchParams) -> SearchOutcome {
        let query = params.to_query();
        self.run(Endpoint::Recommendation, async {
            self.transport.get(Endpoint::Recommendation.path(), &query).await
        })
        .await
    }

    pub async fn color_search(&self, params: &ColorSearchParams) -> SearchOutcome {
        let query = params.to_query();
        self.run(Endpoint::ColorSearch, async {
            self.transport.get(Endpoint::ColorSearch.path(), &query).await
        })
        .await
    }

    /// Search with an uploaded image, image url or previously uploaded im_id
    pub async fn upload_search(&self, params: UploadSearchParams) -> SearchOutcome {
        self.run(Endpoint::UploadSearch, self.post_image_search(Endpoint::UploadSearch, params))
            .await
    }

    /// Detect objects in the image and search each of them
    pub async fn discover_search(&self, params: UploadSearchParams) -> SearchOutcome {
        self.run(Endpoint::DiscoverSearch, self.post_image_search(Endpoint::DiscoverSearch, params))
            .await
    }

    /// Similar products, returned in the same object layout as discover search
    pub async fn similar_products_search(&self, params: UploadSearchParams) -> SearchOutcome {
        self.run(Endpoint::SimilarProducts, self.post_image_search(Endpoint::SimilarProducts, params))
            .await
    }

    /// `im_id` wins over any image; otherwise file, then stream, then url.
    async fn post_image_search(
        &self,
        endpoint: Endpoint,
        params: UploadSearchParams,
    ) -> Result<HttpResponse> {
        let query = params.to_query();

        if params.has_im_id() {
            debug!("{} by im_id", endpoint.as_str());
            return self.transport.post(endpoint.path(), &query).await;
        }

        match params.image {
            None => Err(SearchError::MissingImageSource),
            Some(ImageSource::Url(url)) if url.is_empty() => Err(SearchError::MissingImageSource),
            Some(ImageSource::File(path)) => {
                let bytes = tokio::fs::read(&path)
                    .await
                    .map_err(|e| SearchError::unreadable_file(&path, e))?;
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| STREAM_FILE_NAME.to_string());
                let upload = ImageUpload {
                    bytes: Bytes::from(bytes),
                    file_name,
                };
                self.transport.post_image(endpoint.path(), &query, upload).await
            }
            Some(ImageSource::Stream(mut stream)) => {
                let mut buffer = Vec::new();
                stream
                    .read_to_end(&mut buffer)
                    .map_err(|e| SearchError::ImageSourceUnreadable {
                        name: STREAM_FILE_NAME.to_string(),
                        source: e,
                    })?;
                drop(stream);
                let upload = ImageUpload {
                    bytes: Bytes::from(buffer),
                    file_name: STREAM_FILE_NAME.to_string(),
                };
                self.transport.post_image(endpoint.path(), &query, upload).await
            }
            Some(ImageSource::Url(url)) => {
                let mut query = query;
                query.push(("im_url".to_string(), url));
                self.transport.post(endpoint.path(), &query).await
            }
        }
    }

    /// Await the request, normalize the body and fold every error into the outcome
    async fn run<F>(&self, endpoint: Endpoint, request: F) -> SearchOutcome
    where
        F: std::future::Future<Output = Result<HttpResponse>>,
    {
        let start = Instant::now();

        let result = request.await.and_then(|response| {
            if !(200..300).contains(&response.status) {
                debug!("{} returned HTTP {}", endpoint.as_str(), response.status);
            }
            self.normalizer.normalize_body(&response.body, response.headers)
        });

        METRICS
            .search_request_duration
            .with_label_values(&[endpoint.as_str()])
            .observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(paged) => {
                METRICS.record_success(endpoint.as_str(), paged.shape().as_str());
                info!(
                    "{} succeeded: shape={}, total={:?}",
                    endpoint.as_str(),
                    paged.shape().as_str(),
                    paged.total()
                );
            }
            Err(e) => {
                METRICS.record_failure(endpoint.as_str(), e.kind());
                warn!("{} failed ({}): {}", endpoint.as_str(), e.kind(), e);
            }
        }

        result.into()
    }
}
