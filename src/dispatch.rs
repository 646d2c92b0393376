//! Delivers the filled form by email and offers it for download.

use crate::config::Config;
use crate::document::{DOCX_CONTENT_TYPE, PopulatedDocument};
use crate::error::{ConfigError, DispatchError};
use crate::notice::{DownloadOffer, Notice, Notifier};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use log::{error, info, warn};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const EMAIL_SUBJECT: &str = "Digital Media Release Consent Form Submission";
pub const EMAIL_BODY: &str = "Please find the attached filled consent form.";
pub const DOWNLOAD_LABEL: &str = "Download Your Response";

pub trait MailRelay {
    fn deliver(&self, message: &Message) -> Result<(), DispatchError>;
}

/// Authenticated SMTP with a STARTTLS upgrade.
#[derive(Clone)]
pub struct SmtpRelay {
    server: String,
    port: u16,
    username: Option<String>,
    password: Option<String>,
}

impl SmtpRelay {
    pub fn from_config(config: &Config) -> Self {
        Self {
            server: config.smtp_server.clone(),
            port: config.smtp_port,
            username: config.sender_email.clone(),
            password: config.sender_password.clone(),
        }
    }
}

impl MailRelay for SmtpRelay {
    fn deliver(&self, message: &Message) -> Result<(), DispatchError> {
        let username = self
            .username
            .clone()
            .ok_or_else(|| ConfigError::MissingVar("SENDER_EMAIL".into()))?;
        let password = self
            .password
            .clone()
            .ok_or_else(|| ConfigError::MissingVar("SENDER_PASSWORD".into()))?;

        info!("Connecting to {}:{}", self.server, self.port);
        let transport = SmtpTransport::starttls_relay(&self.server)
            .map_err(|e| DispatchError::Transport(e.to_string()))?
            .port(self.port)
            .credentials(Credentials::new(username, password))
            .timeout(Some(Duration::from_secs(30)))
            .build();

        transport
            .send(message)
            .map_err(|e| DispatchError::Transport(e.to_string()))?;
        Ok(())
    }
}

/// Sends the document from the configured sender to that same address.
pub struct Dispatcher {
    sender: Option<String>,
    relay: Box<dyn MailRelay>,
}

impl Dispatcher {
    pub fn new(sender: Option<String>, relay: Box<dyn MailRelay>) -> Self {
        Self { sender, relay }
    }

    /// Never fails: every outcome becomes a notice. A missing file is skipped.
    pub fn send_email(&self, path: &Path, notifier: &dyn Notifier) {
        if !path.exists() {
            warn!("{} does not exist, not emailing it", path.display());
            notifier.notify(Notice::warning("File not found. Skipping email sending."));
            return;
        }

        let notice = match self.try_send(path) {
            Ok(receiver) => {
                info!("Sent {} to {}", path.display(), receiver);
                Notice::success(format!("Consent form submitted and sent to {}.", receiver))
            }
            Err(DispatchError::Transport(e)) => Notice::error(format!("SMTP error occurred: {}", e)),
            Err(DispatchError::File(e)) => Notice::error(format!("Error with file handling: {}", e)),
            Err(e) => Notice::error(format!("An error occurred while sending the email: {}", e)),
        };
        notifier.notify(notice);
    }

    fn try_send(&self, path: &Path) -> Result<String, DispatchError> {
        let sender = self
            .sender
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVar("SENDER_EMAIL".into()))?;
        let message = compose_message(sender, path)?;
        self.relay.deliver(&message)?;
        Ok(sender.to_string())
    }
}

/// Plain-text body plus the document attached under its own file name.
pub fn compose_message(sender: &str, path: &Path) -> Result<Message, DispatchError> {
    let mailbox: Mailbox = sender
        .parse()
        .map_err(|e| DispatchError::Message(format!("Invalid sender address '{}': {}", sender, e)))?;
    let contents = fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type =
        ContentType::parse(DOCX_CONTENT_TYPE).map_err(|e| DispatchError::Message(e.to_string()))?;

    Message::builder()
        .from(mailbox.clone())
        .to(mailbox)
        .subject(EMAIL_SUBJECT)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(EMAIL_BODY.to_string()))
                .singlepart(Attachment::new(file_name).body(contents, content_type)),
        )
        .map_err(|e| DispatchError::Message(e.to_string()))
}

/// Hands the saved document to the user; a read failure becomes a notice.
pub fn offer_download(document: &PopulatedDocument, notifier: &dyn Notifier) {
    match fs::read(&document.path) {
        Ok(contents) => notifier.offer_download(DownloadOffer {
            label: DOWNLOAD_LABEL.to_string(),
            file_name: document.file_name(),
            content_type: DOCX_CONTENT_TYPE,
            contents,
        }),
        Err(e) => {
            error!("Could not read {}: {}", document.path.display(), e);
            notifier.notify(Notice::error(format!("Error with file handling: {}", e)));
        }
    }
}
