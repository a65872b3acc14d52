use async_trait::async_trait;
use aws_sdk_sesv2::error::{BuildError, DisplayErrorContext};
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// A dispatched message. `message_id` is whatever the provider handed back.
#[derive(Debug, Clone, PartialEq)]
pub struct SentEmail {
    pub message_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("could not build message: {0}")]
    Build(#[from] BuildError),

    #[error("mail transport failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, MailError>;
}

/// Amazon SES (v2 API) transport. Region and credentials come from the
/// ambient AWS environment.
#[derive(Clone)]
pub struct SesMailer {
    client: aws_sdk_sesv2::Client,
}

impl SesMailer {
    pub async fn from_env() -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(aws_sdk_sesv2::Client::new(&aws_config))
    }

    pub fn new(client: aws_sdk_sesv2::Client) -> Self {
        Self { client }
    }
}

fn utf8(data: &str) -> Result<Content, BuildError> {
    Content::builder().data(data).charset("UTF-8").build()
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, MailError> {
        let body = Body::builder()
            .text(utf8(&message.text_body)?)
            .html(utf8(&message.html_body)?)
            .build();

        let content = EmailContent::builder()
            .simple(
                Message::builder()
                    .subject(utf8(&message.subject)?)
                    .body(body)
                    .build(),
            )
            .build();

        let destination = Destination::builder()
            .to_addresses(&message.to)
            .build();

        let out = self
            .client
            .send_email()
            .from_email_address(&message.from)
            .destination(destination)
            .content(content)
            .send()
            .await
            .map_err(|e| MailError::Transport(DisplayErrorContext(e).to_string()))?;

        Ok(SentEmail {
            message_id: out.message_id().map(str::to_string),
        })
    }
}
