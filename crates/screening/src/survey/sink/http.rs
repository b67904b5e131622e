use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use super::{ResultSink, ResultSinkError};
use crate::survey::domain::EvaluationRecord;

/// Uploads records to an object store that accepts `PUT {endpoint}/{bucket}/{key}`.
#[derive(Debug, Clone)]
pub struct HttpResultSink {
    client: Client,
    endpoint: String,
    bucket: String,
    token: Option<String>,
}

impl HttpResultSink {
    pub fn new(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self, ResultSinkError> {
        let client = Client::builder()
            .build()
            .map_err(|err| ResultSinkError::Backend(err.to_string()))?;
        Ok(Self::with_client(client, endpoint, bucket, token))
    }

    pub fn with_client(
        client: Client,
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            token,
        }
    }

    pub fn object_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.bucket.trim_matches('/'),
            key
        )
    }
}

#[async_trait]
impl ResultSink for HttpResultSink {
    async fn store(&self, record: &EvaluationRecord) -> Result<String, ResultSinkError> {
        let key = record.storage_key();
        let body = serde_json::to_vec(record)?;

        let mut request = self
            .client
            .put(self.object_url(&key))
            .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| ResultSinkError::Backend(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResultSinkError::Backend(format!(
                "object store rejected {key} with status {status}"
            )));
        }

        Ok(key)
    }
}
