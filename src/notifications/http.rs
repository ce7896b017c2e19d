use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};
use url::Url;

use super::{Channel, Notifier};
use crate::error::{AppError, DeliveryError};
use crate::Result;

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    recipient: &'a str,
    message: &'a str,
    channel: Channel,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayResponse {
    message_id: String,
}

/// Posts each message as JSON to a delivery gateway and returns its `messageId`.
pub struct HttpNotifier {
    client: Client,
    endpoint: Url,
}

impl HttpNotifier {
    pub fn new(gateway_url: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(gateway_url)
            .map_err(|e| AppError::ConfigError(format!("invalid gateway url '{}': {}", gateway_url, e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(AppError::ConfigError(format!(
                "gateway url must be http(s), got '{}'",
                endpoint.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("advocate-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::ConfigError(format!("failed to build http client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, recipient: &str, message: &str, channel: Channel) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&GatewayRequest {
                recipient,
                message,
                channel,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("Gateway rejected {} to {}: {}", channel, recipient, status);
            return Err(DeliveryError::Rejected(status.as_u16()).into());
        }

        let body: GatewayResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::InvalidResponse(e.to_string()))?;

        info!("Gateway accepted {} to {} as {}", channel, recipient, body.message_id);
        Ok(body.message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn notifier(server: &MockServer) -> HttpNotifier {
        HttpNotifier::new(&format!("{}/v1/messages", server.uri()), Duration::from_secs(2)).unwrap()
    }

    #[test_log::test(tokio::test)]
    async fn test_posts_message_and_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_json(serde_json::json!({
                "recipient": "client-42",
                "message": "Hearing moved to 3pm",
                "channel": "sms"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "messageId": "gw-123" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let id = notifier(&server)
            .await
            .send("client-42", "Hearing moved to 3pm", Channel::Sms)
            .await
            .unwrap();
        assert_eq!(id, "gw-123");
    }

    #[tokio::test]
    async fn test_gateway_error_status_is_delivery_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = notifier(&server)
            .await
            .send("client-42", "hello", Channel::Email)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DeliveryError(DeliveryError::Rejected(503))));
        assert_eq!(err.kind(), ErrorKind::DeliveryError);
    }

    #[tokio::test]
    async fn test_malformed_gateway_body_is_delivery_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let err = notifier(&server)
            .await
            .send("client-42", "hello", Channel::Whatsapp)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DeliveryError(DeliveryError::InvalidResponse(_))));
    }

    #[test]
    fn test_rejects_bad_gateway_urls() {
        assert!(HttpNotifier::new("not a url", Duration::from_secs(1)).is_err());
        assert!(HttpNotifier::new("ftp://gateway.example.com", Duration::from_secs(1)).is_err());
        let notifier = HttpNotifier::new("https://gateway.example.com/send", Duration::from_secs(1)).unwrap();
        assert_eq!(notifier.endpoint().path(), "/send");
    }
}
