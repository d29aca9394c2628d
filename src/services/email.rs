//! Outbound email.
//!
//! Messages are rendered from Tera templates and handed to an [`EmailSender`].
//! The production sender publishes them to the emailer service over a ZeroMQ
//! PUB socket owned by a background task, so requests never wait on mail
//! delivery. Delivery problems are logged and never reach the client.

use std::collections::BTreeMap;
use std::sync::Arc;

use tera::{Context, Tera};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::domain::types::{EmailAddress, Username};
use crate::models::config::MailConfig;
use crate::models::zmq::ZmqEmailMessage;

pub const CONFIRM_EMAIL_SUBJECT: &str = "Confirm your email";
pub const RESET_PASSWORD_SUBJECT: &str = "Password Reset Request - Contacts App";

const CONFIRM_EMAIL_TEMPLATE: &str = "emails/verify_email.html";
const RESET_PASSWORD_TEMPLATE: &str = "emails/reset_password_email.html";

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<zmq::Error> for EmailError {
    fn from(err: zmq::Error) -> Self {
        EmailError::Transport(err.to_string())
    }
}

/// Delivers composed messages.
#[cfg_attr(test, mockall::automock)]
pub trait EmailSender: Send + Sync {
    fn send(&self, message: &ZmqEmailMessage) -> Result<(), EmailError>;
}

/// Publishes serialized messages on a ZeroMQ PUB socket.
///
/// The socket lives in a task on the tokio blocking pool and is fed through
/// an unbounded channel. The task ends once every sender clone is dropped.
pub struct ZmqEmailSender {
    queue: mpsc::UnboundedSender<Vec<u8>>,
}

impl ZmqEmailSender {
    /// Connects to `endpoint` and starts the publisher. Must be called from
    /// within a tokio runtime.
    pub fn start(endpoint: &str) -> Result<Self, EmailError> {
        let runtime = Handle::try_current().map_err(|e| EmailError::Transport(e.to_string()))?;

        let context = zmq::Context::new();
        let socket = context.socket(zmq::PUB)?;
        socket.connect(endpoint)?;

        let (queue, mut pending) = mpsc::unbounded_channel::<Vec<u8>>();

        runtime.spawn_blocking(move || {
            while let Some(payload) = pending.blocking_recv() {
                if let Err(e) = socket.send(payload, 0) {
                    log::error!("Failed to publish email: {e}");
                }
            }
            log::info!("Email publisher stopped");
        });

        log::info!("Publishing emails to {endpoint}");

        Ok(Self { queue })
    }
}

impl EmailSender for ZmqEmailSender {
    fn send(&self, message: &ZmqEmailMessage) -> Result<(), EmailError> {
        let payload = serde_json::to_vec(message)?;
        self.queue
            .send(payload)
            .map_err(|e| EmailError::Transport(e.to_string()))
    }
}

/// Composes the account emails and hands them to the sender.
#[derive(Clone)]
pub struct EmailService {
    sender: Arc<dyn EmailSender>,
    templates: Tera,
    settings: MailConfig,
}

impl EmailService {
    pub fn new(sender: Arc<dyn EmailSender>, templates: Tera, settings: MailConfig) -> Self {
        Self {
            sender,
            templates,
            settings,
        }
    }

    /// Sends the link confirming ownership of `email`. `host` is the public
    /// base URL of the API, ending with `/`.
    pub fn send_confirm_email(
        &self,
        email: &EmailAddress,
        username: &Username,
        host: &str,
        token: &str,
    ) {
        let mut context = Context::new();
        context.insert("host", host);
        context.insert("username", username.as_str());
        context.insert("token", token);

        if let Err(e) = self.deliver(email, CONFIRM_EMAIL_SUBJECT, CONFIRM_EMAIL_TEMPLATE, &context)
        {
            log::error!("Failed to send confirmation email to {email}: {e}");
        }
    }

    /// Sends the password reset link for `email`.
    pub fn send_password_reset_email(
        &self,
        email: &EmailAddress,
        username: &Username,
        host: &str,
        token: &str,
    ) {
        let mut context = Context::new();
        context.insert("username", username.as_str());
        context.insert("reset_link", &reset_link(host, token));

        if let Err(e) = self.deliver(
            email,
            RESET_PASSWORD_SUBJECT,
            RESET_PASSWORD_TEMPLATE,
            &context,
        ) {
            log::error!("Failed to send password reset email to {email}: {e}");
        }
    }

    fn deliver(
        &self,
        email: &EmailAddress,
        subject: &str,
        template: &str,
        context: &Context,
    ) -> Result<(), EmailError> {
        let body = self.templates.render(template, context)?;
        let message = self.compose(email, subject, body);
        self.sender.send(&message)
    }

    /// Builds a message with the standard headers.
    pub fn compose(&self, email: &EmailAddress, subject: &str, body: String) -> ZmqEmailMessage {
        let headers = BTreeMap::from([
            (
                "List-Unsubscribe".to_string(),
                self.settings.list_unsubscribe.clone(),
            ),
            ("X-Mailer".to_string(), self.settings.from_name.clone()),
            ("Reply-To".to_string(), self.settings.reply_to.clone()),
        ]);

        ZmqEmailMessage {
            from_email: self.settings.from_email.clone(),
            from_name: self.settings.from_name.clone(),
            recipients: vec![email.to_string()],
            subject: subject.to_string(),
            body,
            headers,
        }
    }
}

/// Frontend page handling the reset token.
pub fn reset_link(host: &str, token: &str) -> String {
    format!("{}/reset?token={token}", host.trim_end_matches('/'))
}

#[cfg(test)]
pub(crate) fn test_mail_config() -> MailConfig {
    MailConfig {
        zmq_emailer_pub: "tcp://127.0.0.1:5557".to_string(),
        from_email: "noreply@contacts.local".to_string(),
        from_name: "Contacts App".to_string(),
        reply_to: "no-reply@yourapp.com".to_string(),
        list_unsubscribe: "<mailto:unsubscribe@yourapp.com>".to_string(),
    }
}

#[cfg(test)]
pub(crate) fn test_templates() -> Tera {
    Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*.html"))
        .expect("templates should parse")
}
