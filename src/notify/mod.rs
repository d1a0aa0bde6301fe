//! Email notifications
//!
//! Heartbeats and threshold alerts go out through a `Notifier`. The SMTP
//! implementation needs sender credentials; without them every call
//! reports "not sent" and does nothing else.

pub mod credentials;
pub mod message;
mod notifier;

pub use credentials::Credentials;
pub use notifier::{
    EmailNotifier, MailTransport, NotSentReason, Notifier, NotifyStatus, Recipients, SmtpMailer,
};
