//! HTTP transport for the ViSearch API

use super::params::{ImageUpload, QueryParams};
use crate::config::ViSearchConfig;
use crate::error::{Result, SearchError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use tracing::debug;

/// Raw HTTP response handed to the normalizer
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    pub headers: HashMap<String, String>,
}

/// Executes prepared requests against the service
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET with parameters in the query string
    async fn get(&self, path: &str, params: &QueryParams) -> Result<HttpResponse>;

    /// POST with urlencoded parameters
    async fn post(&self, path: &str, params: &QueryParams) -> Result<HttpResponse>;

    /// Multipart POST carrying the image plus parameters
    async fn post_image(
        &self,
        path: &str,
        params: &QueryParams,
        image: ImageUpload,
    ) -> Result<HttpResponse>;
}

/// `reqwest` based transport using HTTP basic credentials
pub struct ReqwestTransport {
    http: Client,
    base_url: String,
    access_key: Option<String>,
    secret_key: Option<SecretString>,
}

impl ReqwestTransport {
    pub fn new(config: &ViSearchConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_key: config.access_key.clone(),
            secret_key: config
                .secret_key
                .as_ref()
                .map(|s| SecretString::new(s.expose_secret().clone())),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.access_key {
            Some(access_key) => req.basic_auth(
                access_key,
                self.secret_key.as_ref().map(|s| s.expose_secret()),
            ),
            None => req,
        }
    }

    async fn execute(&self, req: RequestBuilder) -> Result<HttpResponse> {
        let response = self.authorize(req).send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout(e.to_string())
            } else {
                SearchError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        debug!("ViSearch responded {} ({} bytes)", status, body.len());

        Ok(HttpResponse {
            status: status.as_u16(),
            body,
            headers,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, path: &str, params: &QueryParams) -> Result<HttpResponse> {
        let req = self.http.get(self.url(path)).query(params);
        self.execute(req).await
    }

    async fn post(&self, path: &str, params: &QueryParams) -> Result<HttpResponse> {
        let req = self.http.post(self.url(path)).form(params);
        self.execute(req).await
    }

    async fn post_image(
        &self,
        path: &str,
        params: &QueryParams,
        image: ImageUpload,
    ) -> Result<HttpResponse> {
        let mut form = Form::new();
        for (name, value) in params {
            form = form.text(name.clone(), value.clone());
        }
        let part = Part::bytes(image.bytes.to_vec()).file_name(image.file_name);
        form = form.part("image", part);

        let req = self.http.post(self.url(path)).multipart(form);
        self.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        let transport = ReqwestTransport::new(&ViSearchConfig::default());
        assert!(transport.is_ok());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = ViSearchConfig {
            base_url: "http://localhost:9000/".to_string(),
            ..Default::default()
        };
        let transport = ReqwestTransport::new(&config).unwrap();
        assert_eq!(transport.url("/search"), "http://localhost:9000/search");
    }
}
