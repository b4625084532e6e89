use crate::domain::model::PinEntry;
use crate::domain::ports::PinApi;
use crate::utils::error::{PinMapError, Result};
use crate::utils::validation::Validate;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const DATA_PATH: &str = "/data";
const SUBMIT_PATH: &str = "/submit";

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    success: bool,
}

/// `PinApi` over the pin server's `GET /data` and `POST /submit`.
#[derive(Debug, Clone)]
pub struct HttpPinApi {
    client: Client,
    base_url: String,
}

impl HttpPinApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl PinApi for HttpPinApi {
    async fn fetch_pins(&self) -> Result<Vec<PinEntry>> {
        let url = self.endpoint(DATA_PATH);
        tracing::debug!("Making API request to: {}", url);
        let response = self.client.get(&url).send().await?;

        tracing::debug!("API response status: {}", response.status());
        if !response.status().is_success() {
            return Err(PinMapError::UnexpectedStatus {
                endpoint: DATA_PATH.to_string(),
                status: response.status().as_u16(),
            });
        }

        let json_data: serde_json::Value = response.json().await?;
        let serde_json::Value::Array(items) = json_data else {
            return Err(PinMapError::MalformedResponse {
                endpoint: DATA_PATH.to_string(),
                message: "expected a JSON array of pins".to_string(),
            });
        };

        let total = items.len();
        let pins: Vec<PinEntry> = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let parsed = serde_json::from_value::<PinEntry>(item)
                    .map_err(PinMapError::from)
                    .and_then(|pin| pin.validate().map(|()| pin));
                match parsed {
                    Ok(pin) => Some(pin),
                    Err(e) => {
                        tracing::warn!("Skipping malformed pin #{}: {}", index, e);
                        None
                    }
                }
            })
            .collect();

        if pins.len() < total {
            tracing::warn!("Kept {} of {} pins from {}", pins.len(), total, DATA_PATH);
        }
        Ok(pins)
    }

    async fn submit_pin(&self, pin: &PinEntry) -> Result<()> {
        let url = self.endpoint(SUBMIT_PATH);
        tracing::debug!("Submitting pin '{}' to: {}", pin.job, url);
        let response = self.client.post(&url).json(pin).send().await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);
        if !status.is_success() {
            return Err(PinMapError::UnexpectedStatus {
                endpoint: SUBMIT_PATH.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(());
        }

        match serde_json::from_str::<SubmitResponse>(&body) {
            Ok(SubmitResponse { success: true }) => Ok(()),
            Ok(SubmitResponse { success: false }) => Err(PinMapError::SubmissionRejected),
            Err(e) => {
                tracing::warn!("Unrecognised submit response, assuming success: {}", e);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn api(server: &MockServer) -> HttpPinApi {
        HttpPinApi::new(server.base_url(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let api = HttpPinApi::with_client(Client::new(), "http://pins.local/");
        assert_eq!(api.base_url(), "http://pins.local");
        assert_eq!(api.endpoint(DATA_PATH), "http://pins.local/data");
    }

    #[tokio::test]
    async fn test_fetch_skips_malformed_pins() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/data");
            then.status(200).json_body(serde_json::json!([
                {"lat": 10.0, "lon": 10.0, "job": "Engineer", "exp": 5, "url": "http://x"},
                {"lat": "north", "lon": 10.0, "job": "Broken", "exp": 1, "url": ""},
                {"lat": 500.0, "lon": -999.0, "job": "Lost", "exp": 1, "url": ""},
                {"lat": 4.0, "lon": 4.0, "job": "", "exp": 1, "url": ""},
                {"lat": 1.0, "lon": 2.0, "job": "Nurse", "exp": 3, "url": "http://y"}
            ]));
        });

        let pins = api(&server).fetch_pins().await.unwrap();

        mock.assert();
        assert_eq!(pins.len(), 2);
        assert_eq!(pins[0].job, "Engineer");
        assert_eq!(pins[1].job, "Nurse");
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_array() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/data");
            then.status(200).json_body(serde_json::json!({"pins": []}));
        });

        assert!(api(&server).fetch_pins().await.is_err());
    }

    #[tokio::test]
    async fn test_submit_rejected_by_server() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/submit");
            then.status(200).json_body(serde_json::json!({"success": false}));
        });

        let pin = PinEntry {
            lat: 5.0,
            lon: 5.0,
            job: "Nurse".to_string(),
            exp: 3,
            url: "http://y".to_string(),
        };
        let err = api(&server).submit_pin(&pin).await.unwrap_err();
        assert!(matches!(err, PinMapError::SubmissionRejected));
    }

    #[tokio::test]
    async fn test_submit_with_empty_body_succeeds() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/submit");
            then.status(200);
        });

        let pin = PinEntry {
            lat: 5.0,
            lon: 5.0,
            job: "Nurse".to_string(),
            exp: 3,
            url: "http://y".to_string(),
        };
        assert!(api(&server).submit_pin(&pin).await.is_ok());
    }
}
