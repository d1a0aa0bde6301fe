//! Notification delivery
//!
//! The Runner only sees the `Notifier` trait. Delivery problems are
//! reported through `NotifyStatus` and never returned as errors, so a
//! failing mail relay cannot stop the tick loop.

use super::credentials::Credentials;
use crate::error::TransportError;

use serde::{Deserialize, Serialize};
use std::fmt;

/// One address or a list of addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    /// Non-blank addresses, trimmed
    pub fn addresses(&self) -> Vec<&str> {
        let all: Vec<&str> = match self {
            Recipients::One(addr) => vec![addr.as_str()],
            Recipients::Many(addrs) => addrs.iter().map(String::as_str).collect(),
        };
        all.into_iter()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses().is_empty()
    }
}

impl Default for Recipients {
    fn default() -> Self {
        Recipients::Many(Vec::new())
    }
}

impl From<Vec<String>> for Recipients {
    fn from(addrs: Vec<String>) -> Self {
        Recipients::Many(addrs)
    }
}

impl From<&str> for Recipients {
    fn from(addr: &str) -> Self {
        Recipients::One(addr.to_string())
    }
}

/// Why nothing was delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotSentReason {
    /// No credentials were configured or they failed to load
    MissingCredentials,
    /// Recipient list was empty
    NoRecipients,
    /// Every send attempt failed
    AllFailed,
}

/// Outcome of one `notify` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotifyStatus {
    Sent { delivered: usize },
    Partial { delivered: usize, failed: usize },
    NotSent(NotSentReason),
}

impl NotifyStatus {
    pub fn is_sent(&self) -> bool {
        matches!(self, NotifyStatus::Sent { .. } | NotifyStatus::Partial { .. })
    }
}

impl fmt::Display for NotifyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyStatus::Sent { delivered } => write!(f, "sent to {} recipient(s)", delivered),
            NotifyStatus::Partial { delivered, failed } => {
                write!(f, "sent to {} recipient(s), {} failed", delivered, failed)
            }
            NotifyStatus::NotSent(NotSentReason::MissingCredentials) => {
                write!(f, "not sent: no credentials provided")
            }
            NotifyStatus::NotSent(NotSentReason::NoRecipients) => {
                write!(f, "not sent: no recipients")
            }
            NotifyStatus::NotSent(NotSentReason::AllFailed) => {
                write!(f, "not sent: every delivery failed")
            }
        }
    }
}

/// Notification channel trait
pub trait Notifier {
    /// Deliver `body` to every recipient; `None` subject means the default
    fn notify(&self, recipients: &Recipients, body: &str, subject: Option<&str>) -> NotifyStatus;

    /// Channel name for identification
    fn name(&self) -> &str;
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, recipients: &Recipients, body: &str, subject: Option<&str>) -> NotifyStatus {
        (**self).notify(recipients, body, subject)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Sends one message to one address
pub trait MailTransport {
    fn send(
        &self,
        credentials: &Credentials,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), TransportError>;
}

impl<T: MailTransport + ?Sized> MailTransport for &T {
    fn send(
        &self,
        credentials: &Credentials,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), TransportError> {
        (**self).send(credentials, to, subject, body)
    }
}

/// STARTTLS SMTP relay
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    host: String,
    port: u16,
}

impl SmtpMailer {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl MailTransport for SmtpMailer {
    fn send(
        &self,
        credentials: &Credentials,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), TransportError> {
        use lettre::message::header::ContentType;
        use lettre::message::Mailbox;
        use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
        use lettre::{Message, SmtpTransport, Transport};

        let from: Mailbox = credentials
            .address()
            .parse()
            .map_err(|_| TransportError::Address(credentials.address().to_string()))?;
        let to_box: Mailbox = to
            .parse()
            .map_err(|_| TransportError::Address(to.to_string()))?;

        let email = Message::builder()
            .from(from)
            .to(to_box)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(format!("{}\n", body))
            .map_err(|e| TransportError::Message(e.to_string()))?;

        let mailer = SmtpTransport::starttls_relay(&self.host)
            .map_err(|e| TransportError::Smtp(e.to_string()))?
            .port(self.port)
            .credentials(SmtpCredentials::new(
                credentials.address().to_string(),
                credentials.password().to_string(),
            ))
            .build();

        mailer
            .send(&email)
            .map(|_| ())
            .map_err(|e| TransportError::Smtp(e.to_string()))
    }
}

/// Email notifier: one message per recipient
pub struct EmailNotifier<T> {
    transport: T,
    credentials: Option<Credentials>,
    default_subject: String,
}

impl<T: MailTransport> EmailNotifier<T> {
    pub fn new(transport: T, credentials: Option<Credentials>, default_subject: impl Into<String>) -> Self {
        Self {
            transport,
            credentials,
            default_subject: default_subject.into(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }
}

impl<T: MailTransport> Notifier for EmailNotifier<T> {
    fn notify(&self, recipients: &Recipients, body: &str, subject: Option<&str>) -> NotifyStatus {
        let Some(credentials) = &self.credentials else {
            log::info!("No email sent: credentials not provided");
            return NotifyStatus::NotSent(NotSentReason::MissingCredentials);
        };

        let addresses = recipients.addresses();
        if addresses.is_empty() {
            log::info!("No email sent: no recipients configured");
            return NotifyStatus::NotSent(NotSentReason::NoRecipients);
        }

        let subject = subject.unwrap_or(&self.default_subject);
        let mut delivered = 0;
        let mut failed = 0;

        for to in addresses {
            match self.transport.send(credentials, to, subject, body) {
                Ok(()) => {
                    log::info!("Email sent to: {}", to);
                    delivered += 1;
                }
                Err(e) => {
                    log::warn!("Email to {} failed: {}", to, e);
                    failed += 1;
                }
            }
        }

        match (delivered, failed) {
            (0, _) => NotifyStatus::NotSent(NotSentReason::AllFailed),
            (d, 0) => NotifyStatus::Sent { delivered: d },
            (d, f) => NotifyStatus::Partial {
                delivered: d,
                failed: f,
            },
        }
    }

    fn name(&self) -> &str {
        "email"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::RecordingTransport;

    fn creds() -> Credentials {
        Credentials::new("sender@example.com", "pw")
    }

    #[test]
    fn test_recipients_single_and_many() {
        assert_eq!(Recipients::from("a@x.org").addresses(), vec!["a@x.org"]);
        let many = Recipients::from(vec!["a@x.org".to_string(), " ".to_string(), "b@x.org ".to_string()]);
        assert_eq!(many.addresses(), vec!["a@x.org", "b@x.org"]);
        assert!(Recipients::default().is_empty());
    }

    #[test]
    fn test_recipients_deserialize_string_or_list() {
        #[derive(Deserialize)]
        struct Wrap {
            to: Recipients,
        }
        let one: Wrap = toml::from_str(r#"to = "a@x.org""#).unwrap();
        assert_eq!(one.to, Recipients::One("a@x.org".to_string()));
        let many: Wrap = toml::from_str(r#"to = ["a@x.org", "b@x.org"]"#).unwrap();
        assert_eq!(many.to.addresses().len(), 2);
    }

    #[test]
    fn test_missing_credentials_is_not_sent() {
        let transport = RecordingTransport::new();
        let notifier = EmailNotifier::new(&transport, None, "Update");

        let status = notifier.notify(&Recipients::from("a@x.org"), "body", None);
        assert_eq!(status, NotifyStatus::NotSent(NotSentReason::MissingCredentials));
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_no_recipients_is_not_sent() {
        let transport = RecordingTransport::new();
        let notifier = EmailNotifier::new(&transport, Some(creds()), "Update");

        let status = notifier.notify(&Recipients::default(), "body", None);
        assert_eq!(status, NotifyStatus::NotSent(NotSentReason::NoRecipients));
    }

    #[test]
    fn test_sends_one_message_per_recipient() {
        let transport = RecordingTransport::new();
        let notifier = EmailNotifier::new(&transport, Some(creds()), "Update");

        let recipients = Recipients::from(vec!["a@x.org".to_string(), "b@x.org".to_string()]);
        let status = notifier.notify(&recipients, "hello", Some("Custom"));

        assert_eq!(status, NotifyStatus::Sent { delivered: 2 });
        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "a@x.org");
        assert_eq!(sent[1].subject, "Custom");
        assert_eq!(sent[1].body, "hello");
    }

    #[test]
    fn test_default_subject_used() {
        let transport = RecordingTransport::new();
        let notifier = EmailNotifier::new(&transport, Some(creds()), "Periodic Update");
        notifier.notify(&Recipients::from("a@x.org"), "b", None);
        assert_eq!(transport.sent()[0].subject, "Periodic Update");
    }

    #[test]
    fn test_transport_errors_are_swallowed() {
        let transport = RecordingTransport::failing_for(&["bad@x.org"]);
        let notifier = EmailNotifier::new(&transport, Some(creds()), "Update");

        let both = Recipients::from(vec!["ok@x.org".to_string(), "bad@x.org".to_string()]);
        assert_eq!(
            notifier.notify(&both, "b", None),
            NotifyStatus::Partial {
                delivered: 1,
                failed: 1
            }
        );

        let status = notifier.notify(&Recipients::from("bad@x.org"), "b", None);
        assert_eq!(status, NotifyStatus::NotSent(NotSentReason::AllFailed));
        assert!(!status.is_sent());
    }

    #[test]
    fn test_smtp_rejects_bad_sender_address() {
        let mailer = SmtpMailer::new("localhost", 2525);
        let result = mailer.send(&Credentials::new("not an address", "pw"), "a@x.org", "s", "b");
        assert!(matches!(result, Err(TransportError::Address(_))));
    }
}
