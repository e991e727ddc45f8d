//! HTTP implementation of the gateway.

use async_trait::async_trait;
use reqwest::{Client, Method};

use crate::config::ApiConfig;
use crate::error::RpnResult;
use crate::gateway::{decode_error, Form, Gateway};

/// Gateway backed by a [`reqwest::Client`].
///
/// Adds the bearer token to every request and form-encodes mutation bodies.
/// Success bodies are returned as raw text; non-success bodies are decoded
/// into an [`RpnError`](crate::error::RpnError) through [`decode_error`].
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpGateway {
    /// Create a gateway from configuration.
    pub fn new(config: &ApiConfig) -> RpnResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            token: config.token.clone(),
        })
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        form: Option<Form<'_>>,
    ) -> RpnResult<String> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(&self.token);
        if let Some(form) = form {
            request = request.form(form);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(decode_error(&body))
        }
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn get(&self, path: &str) -> RpnResult<String> {
        self.request(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, form: Form<'_>) -> RpnResult<String> {
        self.request(Method::POST, path, Some(form)).await
    }

    async fn put(&self, path: &str, form: Form<'_>) -> RpnResult<String> {
        self.request(Method::PUT, path, Some(form)).await
    }

    async fn patch(&self, path: &str, form: Form<'_>) -> RpnResult<String> {
        self.request(Method::PATCH, path, Some(form)).await
    }

    async fn delete(&self, path: &str, form: Form<'_>) -> RpnResult<String> {
        self.request(Method::DELETE, path, Some(form)).await
    }
}
