use anyhow::{Context, Result};
use http_body_util::{BodyExt, Full};
use hyper::{body::Bytes, Method, Request, Response, StatusCode};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// HTTP client bound to one test server
#[derive(Clone)]
pub struct TestClient {
    base_url: String,
    client: Client<HttpConnector, Full<Bytes>>,
}

impl TestClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(Method::GET, path, None, &[]).await
    }

    pub async fn get_with_headers(
        &self,
        path: &str,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        self.send(Method::GET, path, None, headers).await
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        let body = serde_json::to_vec(body)?;
        self.send(Method::POST, path, Some(("application/json", body)), &[])
            .await
    }

    /// POST a body as-is, without JSON serialization
    pub async fn post_raw(
        &self,
        path: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<ApiResponse> {
        self.send(Method::POST, path, Some((content_type, body)), &[])
            .await
    }

    /// POST /api/stories with a base64 image
    pub async fn create_story(&self, theme: &str, image_base64: &str) -> Result<ApiResponse> {
        self.post("/api/stories", &json!({ "theme": theme, "image": image_base64 }))
            .await
    }

    pub async fn story(&self, id: &str) -> Result<ApiResponse> {
        self.get(&format!("/api/stories/{}", id)).await
    }

    pub async fn story_audio(&self, id: &str) -> Result<ApiResponse> {
        self.get(&format!("/api/stories/{}/audio", id)).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<(&str, Vec<u8>)>,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        let mut builder = Request::builder()
            .method(method)
            .uri(format!("{}{}", self.base_url, path));

        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = match body {
            Some((content_type, bytes)) => builder
                .header("Content-Type", content_type)
                .body(Full::new(Bytes::from(bytes)))?,
            None => builder.body(Full::new(Bytes::new()))?,
        };

        let response = self.client.request(request).await?;
        ApiResponse::read(response).await
    }
}

pub struct ApiResponse {
    pub status: StatusCode,
    /// Parsed JSON body, `None` for empty or non-JSON bodies
    pub body: Option<Value>,
    pub body_bytes: Vec<u8>,
    pub headers: HashMap<String, String>,
}

impl ApiResponse {
    async fn read(response: Response<hyper::body::Incoming>) -> Result<Self> {
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();

        let body_bytes = response.into_body().collect().await?.to_bytes().to_vec();
        let body = serde_json::from_slice(&body_bytes).ok();

        Ok(Self {
            status,
            body,
            body_bytes,
            headers,
        })
    }

    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected status {} but got {}. Body: {:?}",
            expected, self.status, self.body
        );
        self
    }

    /// JSON field at the top level of the body
    pub fn field(&self, name: &str) -> &Value {
        self.body
            .as_ref()
            .and_then(|b| b.get(name))
            .unwrap_or_else(|| panic!("Missing field '{}' in body {:?}", name, self.body))
    }

    /// Id of a created or fetched story
    pub fn story_id(&self) -> Result<String> {
        self.field("id")
            .as_str()
            .map(str::to_string)
            .context("story id is not a string")
    }

    pub fn assert_error_message(&self, expected_message: &str) -> &Self {
        let message = self.field("message").as_str().unwrap_or_default();
        assert!(
            message.contains(expected_message),
            "Expected error message to contain '{}', but got '{}'",
            expected_message,
            message
        );
        self
    }

    pub fn assert_error_code(&self, expected_code: &str) -> &Self {
        assert_eq!(self.field("code"), expected_code, "Error code mismatch");
        self
    }

    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers.get(name)
    }

    pub fn assert_header(&self, name: &str, value: &str) -> &Self {
        let actual = self
            .headers
            .get(name)
            .unwrap_or_else(|| panic!("Header '{}' not found", name));
        assert_eq!(actual, value, "Header '{}' value mismatch", name);
        self
    }

    pub fn assert_header_exists(&self, name: &str) -> &Self {
        assert!(self.headers.contains_key(name), "Header '{}' not found", name);
        self
    }
}
