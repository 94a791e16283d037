use crate::core::{ConfigProvider, ContactClient};
use crate::domain::model::{ContactPayload, SyncOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Creates contacts with one authenticated POST per payload.
///
/// There is no retry: a non-2xx answer is reported as
/// [`SyncOutcome::Rejected`] and a transport failure as an error.
pub struct HttpContactClient {
    client: Client,
    endpoint: String,
    username: String,
    password: String,
}

impl HttpContactClient {
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.api_endpoint(),
            config.api_username(),
            config.api_password(),
            config.request_timeout_seconds().map(Duration::from_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ContactClient for HttpContactClient {
    async fn create_contact(&self, payload: &ContactPayload) -> Result<SyncOutcome> {
        tracing::debug!("POST {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            match response.text().await {
                Ok(body) => tracing::debug!("CRM rejected contact ({}): {}", status, body),
                Err(e) => tracing::debug!(
                    "CRM rejected contact ({}), response body unreadable: {}",
                    status,
                    e
                ),
            }
        }

        Ok(SyncOutcome::from_status(status.as_u16()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transform::transform_record;
    use crate::core::Record;
    use httpmock::prelude::*;
    use serde_json::json;

    fn sample_payload() -> ContactPayload {
        let row: Record = [
            ("CustomerId", json!("7")),
            ("Gender", json!("F")),
            ("MaritalStatus", json!("S")),
            ("MobileNo", json!("9990001111")),
        ]
        .into_iter()
        .collect();
        transform_record(&row)
    }

    #[tokio::test]
    async fn test_create_contact_sends_json_with_basic_auth() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v2/contacts")
                // base64("agent:X")
                .header("authorization", "Basic YWdlbnQ6WA==")
                .header("content-type", "application/json")
                .json_body_partial(
                    r#"{"mobile": 9990001111, "custom_fields": {"customer_id": 7, "gender": "Female", "marital_status": "Single"}}"#,
                );
            then.status(201).json_body(json!({"id": 1}));
        });

        let client =
            HttpContactClient::new(server.url("/api/v2/contacts"), "agent", "X", None).unwrap();
        let outcome = client.create_contact(&sample_payload()).await.unwrap();

        api_mock.assert();
        assert_eq!(outcome, SyncOutcome::Created { status: 201 });
    }

    #[tokio::test]
    async fn test_create_contact_reports_rejection() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/contacts");
            then.status(409).json_body(json!({"description": "duplicate"}));
        });

        let client = HttpContactClient::new(server.url("/contacts"), "agent", "X", None).unwrap();
        let outcome = client.create_contact(&sample_payload()).await.unwrap();

        api_mock.assert();
        assert!(!outcome.is_success());
        assert_eq!(outcome.status(), 409);
    }

    #[tokio::test]
    async fn test_rejection_without_body_is_still_reported() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/contacts");
            then.status(500);
        });

        let client = HttpContactClient::new(server.url("/contacts"), "agent", "X", None).unwrap();
        let outcome = client.create_contact(&sample_payload()).await.unwrap();

        api_mock.assert();
        assert_eq!(outcome, SyncOutcome::Rejected { status: 500 });
    }

    #[tokio::test]
    async fn test_create_contact_transport_error() {
        // 沒有服務在監聽的埠
        let client =
            HttpContactClient::new("http://127.0.0.1:1/contacts", "agent", "X", None).unwrap();
        assert!(client.create_contact(&sample_payload()).await.is_err());
    }
}
