//! Outbound notifications (SMS, email, WhatsApp).
//!
//! Delivery goes through a [`Notifier`]. [`LogNotifier`] only logs;
//! [`HttpNotifier`] hands the message to an external gateway.

pub mod http;

use actix_web::{web, HttpResponse};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::auth::AuthContext;
use crate::config::{NotificationConfig, NotificationProvider};
use crate::error::AppError;
use crate::AppState;
use crate::Result;

pub use http::HttpNotifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    Email,
    Whatsapp,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Sms => "sms",
            Channel::Email => "email",
            Channel::Whatsapp => "whatsapp",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message` and return the provider's message id.
    async fn send(&self, recipient: &str, message: &str, channel: Channel) -> Result<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, recipient: &str, message: &str, channel: Channel) -> Result<String> {
        info!("{} to {}: {}", channel, recipient, message);
        Ok(format!("{}_{}", channel, Utc::now().timestamp_millis()))
    }
}

pub fn notifier_from_config(config: &NotificationConfig) -> Result<Arc<dyn Notifier>> {
    match config.provider {
        NotificationProvider::Log => Ok(Arc::new(LogNotifier)),
        NotificationProvider::Http => {
            let url = config.gateway_url.as_deref().ok_or_else(|| {
                AppError::ConfigError("notifications.gateway_url is required for the http provider".into())
            })?;
            Ok(Arc::new(HttpNotifier::new(
                url,
                Duration::from_secs(config.timeout_secs),
            )?))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    pub recipient_id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub channel: Channel,
    #[serde(default)]
    pub urgent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub success: bool,
    pub message_id: String,
}

/// Validate, then deliver. Nothing reaches the notifier on invalid input.
pub async fn deliver(
    notifier: &dyn Notifier,
    req: &SendNotificationRequest,
) -> Result<NotificationResponse> {
    let recipient = req.recipient_id.trim();
    if recipient.is_empty() || req.message.trim().is_empty() {
        return Err(AppError::validation("Recipient ID and message are required"));
    }

    let message_id = notifier.send(recipient, &req.message, req.channel).await?;
    Ok(NotificationResponse {
        success: true,
        message_id,
    })
}

pub async fn send_notification(
    auth: AuthContext,
    req: web::Json<SendNotificationRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let response = deliver(state.notifier.as_ref(), &req).await?;
    info!(
        "{} notification {} sent by {}{}",
        req.channel,
        response.message_id,
        auth.user_id,
        if req.urgent { " (urgent)" } else { "" }
    );
    Ok(HttpResponse::Ok().json(response))
}
