// Push sink: InfluxDB v2 write API over HTTP

use async_trait::async_trait;
use std::time::Duration;

use crate::config::PushConfig;
use crate::render::Point;
use crate::version::USER_AGENT;

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("write request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("write rejected with {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Accepts one batch of points per push tick.
#[async_trait]
pub trait PushSink: Send + Sync {
    async fn write_points(&self, points: &[Point]) -> Result<(), PushError>;
}

pub struct InfluxSink {
    client: reqwest::Client,
    write_url: String,
    org: String,
    bucket: String,
    token: String,
}

impl InfluxSink {
    pub fn new(config: &PushConfig) -> Result<Self, PushError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(PushError::Client)?;
        Ok(Self {
            client,
            write_url: format!("{}/api/v2/write", config.url.trim_end_matches('/')),
            org: config.org.clone(),
            bucket: config.bucket.clone(),
            token: config.token.clone(),
        })
    }
}

/// Newline-separated line protocol body.
pub fn encode_batch(points: &[Point]) -> String {
    points
        .iter()
        .map(Point::to_line_protocol)
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl PushSink for InfluxSink {
    async fn write_points(&self, points: &[Point]) -> Result<(), PushError> {
        if points.is_empty() {
            return Ok(());
        }
        let response = self
            .client
            .post(&self.write_url)
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", self.bucket.as_str()),
                ("precision", "ns"),
            ])
            .header(reqwest::header::AUTHORIZATION, format!("Token {}", self.token))
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(encode_batch(points))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Rejected { status, body });
        }
        Ok(())
    }
}
