use async_trait::async_trait;
use std::sync::Arc;

/// Outbound email transport. Real transports live outside this service;
/// the contract is a single send call.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Outbound SMS transport.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, recipient: &str, body: &str) -> anyhow::Result<()>;
}

/// Stand-in transport that only logs. Swapped for a real provider in deployment.
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, recipients: &[String], subject: &str, _body: &str) -> anyhow::Result<()> {
        tracing::info!("email to {:?}: {}", recipients, subject);
        Ok(())
    }
}

pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn send(&self, recipient: &str, _body: &str) -> anyhow::Result<()> {
        tracing::info!("sms to {}", recipient);
        Ok(())
    }
}

/// Payload for the delivery queue.
#[derive(Debug, Clone)]
pub enum DeliveryTask {
    Email {
        recipients: Vec<String>,
        subject: String,
        body: String,
    },
    Sms {
        recipient: String,
        body: String,
    },
}

pub async fn dispatch(
    task: DeliveryTask,
    email: Arc<dyn EmailSender>,
    sms: Arc<dyn SmsSender>,
) -> anyhow::Result<()> {
    match task {
        DeliveryTask::Email {
            recipients,
            subject,
            body,
        } => email.send(&recipients, &subject, &body).await,
        DeliveryTask::Sms { recipient, body } => sms.send(&recipient, &body).await,
    }
}
