use async_trait::async_trait;
use serde_json::json;

use super::device_models::DevicePlatform;

/// Rendered message handed to a channel, one per device.
#[derive(Debug, Clone)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub badge: i64,
    pub data: serde_json::Value,
}

/// A device messaging target. Implementations talk to one provider and are
/// keyed by the opaque per-device registration id.
#[async_trait]
pub trait PushChannel: Send + Sync {
    fn platform(&self) -> DevicePlatform;

    async fn send(&self, registration_id: &str, message: &PushMessage) -> anyhow::Result<()>;
}

/// FCM data message.
pub struct FcmChannel {
    client: reqwest::Client,
    endpoint: String,
    server_key: String,
}

impl FcmChannel {
    pub fn new(server_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: "https://fcm.googleapis.com/fcm/send".to_string(),
            server_key,
        }
    }
}

#[async_trait]
impl PushChannel for FcmChannel {
    fn platform(&self) -> DevicePlatform {
        DevicePlatform::Fcm
    }

    async fn send(&self, registration_id: &str, message: &PushMessage) -> anyhow::Result<()> {
        let payload = json!({
            "to": registration_id,
            "data": {
                "title": message.title,
                "body": message.body,
                "payload": message.data,
            },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("FCM returned {}", response.status());
        }

        Ok(())
    }
}

/// APNS alert message with a badge count.
pub struct ApnsChannel {
    client: reqwest::Client,
    endpoint: String,
    auth_token: String,
    topic: String,
}

impl ApnsChannel {
    pub fn new(auth_token: String, topic: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: "https://api.push.apple.com".to_string(),
            auth_token,
            topic,
        }
    }
}

#[async_trait]
impl PushChannel for ApnsChannel {
    fn platform(&self) -> DevicePlatform {
        DevicePlatform::Apns
    }

    async fn send(&self, registration_id: &str, message: &PushMessage) -> anyhow::Result<()> {
        let payload = json!({
            "aps": {
                "alert": {
                    "title": message.title,
                    "body": message.body,
                },
                "badge": message.badge,
            },
            "payload": message.data,
        });

        let url = format!("{}/3/device/{}", self.endpoint, registration_id);
        let response = self
            .client
            .post(&url)
            .header("authorization", format!("bearer {}", self.auth_token))
            .header("apns-topic", &self.topic)
            .header("apns-push-type", "alert")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("APNS returned {}", response.status());
        }

        Ok(())
    }
}
