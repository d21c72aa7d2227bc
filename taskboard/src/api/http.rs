//! HTTP implementation of [`TaskApi`] over `reqwest`.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use taskboard_proto::{ErrorBody, NewTask, SessionInfo, Task, TaskId, TaskPatch};
use url::Url;

use super::{ApiError, TaskApi};

/// Talks to a task server with a bearer token.
#[derive(Clone)]
pub struct HttpTaskApi {
    client: Client,
    base: Url,
    token: String,
}

impl std::fmt::Debug for HttpTaskApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTaskApi")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpTaskApi {
    /// Creates a client for the server at `base` (e.g. `http://127.0.0.1:8080`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the HTTP client cannot be built.
    pub fn new(
        mut base: Url,
        token: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, ApiError> {
        // `Url::join` replaces the last segment unless the base ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base,
            token: token.into(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::Network(format!("invalid endpoint {path}: {e}")))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(network_error)?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        let status = response.status();
        response.json::<T>().await.map_err(|e| ApiError::Server {
            status: status.as_u16(),
            message: format!("invalid response body: {e}"),
        })
    }
}

fn network_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Network("request timed out".to_string())
    } else if error.is_connect() {
        ApiError::Network("could not connect to server".to_string())
    } else {
        ApiError::Network(error.to_string())
    }
}

async fn error_from_response(response: Response) -> ApiError {
    let status = response.status();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_string(),
    };
    tracing::debug!(status = status.as_u16(), %message, "request failed");
    ApiError::from_status(status.as_u16(), message)
}

impl TaskApi for HttpTaskApi {
    async fn session(&self) -> Result<SessionInfo, ApiError> {
        let url = self.endpoint("protected")?;
        self.send_json(self.client.get(url)).await
    }

    async fn list(&self) -> Result<Vec<Task>, ApiError> {
        let url = self.endpoint("tasks")?;
        self.send_json(self.client.get(url)).await
    }

    async fn get(&self, id: TaskId) -> Result<Task, ApiError> {
        let url = self.endpoint(&format!("tasks/{id}"))?;
        self.send_json(self.client.get(url)).await
    }

    async fn create(&self, task: NewTask) -> Result<Task, ApiError> {
        let url = self.endpoint("tasks")?;
        self.send_json(self.client.post(url).json(&task)).await
    }

    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Task, ApiError> {
        let url = self.endpoint(&format!("tasks/{id}"))?;
        self.send_json(self.client.patch(url).json(&patch)).await
    }

    async fn delete(&self, id: TaskId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("tasks/{id}"))?;
        let response = self.send(self.client.delete(url)).await?;
        if response.status() != StatusCode::NO_CONTENT {
            tracing::debug!(status = response.status().as_u16(), "unexpected delete status");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpTaskApi {
        HttpTaskApi::new(
            Url::parse(base).unwrap(),
            "token",
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn endpoints_join_under_base_path() {
        let local = api("http://127.0.0.1:8080");
        assert_eq!(
            local.endpoint("tasks/3").unwrap().as_str(),
            "http://127.0.0.1:8080/tasks/3"
        );

        let nested = api("http://example.com/api");
        assert_eq!(
            nested.endpoint("tasks").unwrap().as_str(),
            "http://example.com/api/tasks"
        );
    }

    #[test]
    fn debug_hides_token() {
        let rendered = format!("{:?}", api("http://127.0.0.1:8080"));
        assert!(!rendered.contains("token"));
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        // Port 9 (discard) is closed on test machines.
        let api = api("http://127.0.0.1:9");
        let err = api.list().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }
}
