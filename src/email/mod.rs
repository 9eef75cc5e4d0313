pub mod templates;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{SmtpConfig, SmtpTls};
use crate::error::SendError;
use crate::models::Submission;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, submission: &Submission) -> Result<(), SendError>;
}

#[async_trait]
impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    async fn send(&self, submission: &Submission) -> Result<(), SendError> {
        (**self).send(submission).await
    }
}

/// Sends each submission to the configured mailbox over SMTP.
///
/// The envelope sender is always the authenticated system address. The
/// submitter only appears as the display name and as `Reply-To`, so relays
/// that verify the sender accept the message.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Address,
    to: Mailbox,
    site_name: String,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, SendError> {
        let from: Address = config
            .from
            .parse()
            .map_err(|e| SendError::Address(format!("from {}: {e}", config.from)))?;
        let to: Mailbox = config
            .to
            .parse()
            .map_err(|e| SendError::Address(format!("to {}: {e}", config.to)))?;

        Ok(Self {
            transport: build_smtp_transport(config)?,
            from,
            to,
            site_name: config.site_name.clone(),
        })
    }

    pub fn build_message(&self, submission: &Submission) -> Result<Message, SendError> {
        let html = templates::render_contact_html(submission, &self.site_name)?;
        let text = templates::render_contact_text(submission, &self.site_name)?;

        let author = Mailbox::new(
            Some(format!("{} via {}", submission.name(), self.site_name)),
            self.from.clone(),
        );

        let mut builder = Message::builder()
            .from(author)
            .to(self.to.clone())
            .subject(format!("Contact Form: {}", submission.subject()));

        match submission.email().parse::<Mailbox>() {
            Ok(reply_to) => builder = builder.reply_to(reply_to),
            Err(e) => tracing::warn!(
                submission_id = %submission.id(),
                "Submitter address is not a valid mailbox, sending without Reply-To: {e}"
            ),
        }

        builder
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html),
                    ),
            )
            .map_err(|e| SendError::Build(e.to_string()))
    }

    /// Probe the SMTP server once. Only used as a start-up diagnostic.
    pub async fn check_connection(&self) -> Result<bool, SendError> {
        self.transport
            .test_connection()
            .await
            .map_err(|e| SendError::Transport(e.to_string()))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, submission: &Submission) -> Result<(), SendError> {
        let message = self.build_message(submission)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;

        tracing::info!(
            submission_id = %submission.id(),
            code = %response.code(),
            "Notification sent"
        );
        Ok(())
    }
}

pub fn build_smtp_transport(
    config: &SmtpConfig,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, SendError> {
    let mut builder = match config.tls {
        SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| SendError::Transport(format!("SMTP relay error: {e}")))?,
        SmtpTls::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| SendError::Transport(format!("SMTP starttls error: {e}")))?,
        SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
    }
    .port(config.port)
    .timeout(Some(config.timeout));

    if let (Some(user), Some(pass)) = (&config.user, &config.pass) {
        builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
    }

    Ok(builder.build())
}

/// Bounds any notifier by a deadline; an overrun is reported as [`SendError::Timeout`].
pub struct WithTimeout<N> {
    inner: N,
    limit: Duration,
}

impl<N> WithTimeout<N> {
    pub fn new(inner: N, limit: Duration) -> Self {
        Self { inner, limit }
    }

    pub fn inner(&self) -> &N {
        &self.inner
    }
}

#[async_trait]
impl<N: Notifier> Notifier for WithTimeout<N> {
    async fn send(&self, submission: &Submission) -> Result<(), SendError> {
        tokio::time::timeout(self.limit, self.inner.send(submission))
            .await
            .map_err(|_| SendError::Timeout(self.limit.as_secs()))?
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::models::ContactForm;

    fn smtp_config() -> SmtpConfig {
        SmtpConfig {
            host: "localhost".to_string(),
            port: 1025,
            tls: SmtpTls::None,
            user: None,
            pass: None,
            from: "robot@example.com".to_string(),
            to: "inbox@example.com".to_string(),
            site_name: "Cove".to_string(),
            timeout: Duration::from_secs(8),
        }
    }

    fn submission(email: &str) -> Submission {
        Submission::from_form(ContactForm {
            name: Some("Ann".into()),
            email: Some(email.into()),
            phone: Some("555".into()),
            subject: Some("Info".into()),
            message: Some("Hi".into()),
        })
        .unwrap()
    }

    fn formatted(message: &Message) -> String {
        String::from_utf8_lossy(&message.formatted()).into_owned()
    }

    #[tokio::test]
    async fn message_uses_system_sender_and_submitter_reply_to() {
        let notifier = SmtpNotifier::new(&smtp_config()).unwrap();
        let message = notifier.build_message(&submission("ann@x.com")).unwrap();
        let raw = formatted(&message);

        assert!(raw.contains("Ann via Cove"));
        assert!(raw.contains("<robot@example.com>"));
        assert!(raw.contains("Reply-To: ann@x.com"));
        assert!(raw.contains("To: inbox@example.com"));
        assert!(raw.contains("Subject: Contact Form: Info"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("text/html"));
    }

    #[tokio::test]
    async fn invalid_submitter_address_drops_reply_to() {
        let notifier = SmtpNotifier::new(&smtp_config()).unwrap();
        let message = notifier.build_message(&submission("not an address")).unwrap();
        assert!(!formatted(&message).contains("Reply-To"));
    }

    #[test]
    fn invalid_destination_is_rejected() {
        let config = SmtpConfig {
            to: "nobody".to_string(),
            ..smtp_config()
        };
        assert!(matches!(
            SmtpNotifier::new(&config),
            Err(SendError::Address(_))
        ));
    }

    struct Slow(Duration, AtomicUsize);

    #[async_trait]
    impl Notifier for Slow {
        async fn send(&self, _submission: &Submission) -> Result<(), SendError> {
            self.1.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.0).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn timeout_turns_slow_send_into_error() {
        let notifier = WithTimeout::new(
            Slow(Duration::from_secs(10), AtomicUsize::new(0)),
            Duration::from_millis(50),
        );
        let err = notifier.send(&submission("ann@x.com")).await.unwrap_err();
        assert!(matches!(err, SendError::Timeout(_)));
        assert_eq!(notifier.inner.1.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn timeout_passes_fast_send_through() {
        let notifier = WithTimeout::new(
            Slow(Duration::from_millis(1), AtomicUsize::new(0)),
            Duration::from_secs(5),
        );
        assert!(notifier.send(&submission("ann@x.com")).await.is_ok());
    }
}
