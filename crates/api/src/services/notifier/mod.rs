//! Lifecycle notification delivery.
//!
//! The lifecycle manager holds an `Arc<dyn Notifier>` and is unaware of
//! which variant backs it: [`CaptureNotifier`] renders plain text into
//! per-kind artifact directories (local/test environments, never reaches a
//! real inbox), while [`SmtpNotifier`] hands rendered multipart mail to a
//! real SMTP transport. The variant is chosen once at process start from
//! configuration.

pub mod capture;
pub mod smtp;

use std::sync::Arc;

use askama::Template;
use async_trait::async_trait;
use thiserror::Error;

use helpdesk_core::Email;

pub use capture::CaptureNotifier;
pub use smtp::SmtpNotifier;

use crate::config::EmailDelivery;
use crate::models::Application;

/// The two lifecycle notification templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Sent to the submitter when an application is stored.
    ApplicationReceived,
    /// Sent to the submitter when an administrator resolves the application.
    ApplicationResolved,
}

impl TemplateKind {
    /// Stable name, used as the capture artifact directory.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApplicationReceived => "ApplicationReceived",
            Self::ApplicationResolved => "ApplicationResolved",
        }
    }

    /// Subject line for this kind.
    #[must_use]
    pub const fn subject(self) -> &'static str {
        match self {
            Self::ApplicationReceived => "Application Received",
            Self::ApplicationResolved => "Application Resolved",
        }
    }
}

/// Errors that can occur when sending a notification.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// Template rendering error.
    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Failed to build the email message.
    #[error("failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// Failed to write a capture artifact.
    #[error("failed to write capture artifact: {0}")]
    Io(#[from] std::io::Error),
}

/// Abstract sender of lifecycle notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification for `application` to `to`.
    async fn send(
        &self,
        to: &Email,
        subject: &str,
        kind: TemplateKind,
        application: &Application,
    ) -> Result<(), NotifierError>;
}

/// Build the configured notifier variant.
///
/// # Errors
///
/// Returns an error if the SMTP transport cannot be constructed.
pub fn from_config(config: &EmailDelivery) -> Result<Arc<dyn Notifier>, NotifierError> {
    match config {
        EmailDelivery::Capture { dir } => Ok(Arc::new(CaptureNotifier::new(dir.clone()))),
        EmailDelivery::Smtp(smtp) => Ok(Arc::new(SmtpNotifier::new(smtp)?)),
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Plain text template for the received notification.
#[derive(Template)]
#[template(path = "email/application_received.txt")]
struct ReceivedText<'a> {
    to: &'a str,
    subject: &'a str,
    name: &'a str,
    message: &'a str,
    received_at: String,
}

/// HTML template for the received notification.
#[derive(Template)]
#[template(path = "email/application_received.html")]
struct ReceivedHtml<'a> {
    name: &'a str,
    message: &'a str,
    received_at: String,
}

/// Plain text template for the resolved notification.
#[derive(Template)]
#[template(path = "email/application_resolved.txt")]
struct ResolvedText<'a> {
    to: &'a str,
    subject: &'a str,
    name: &'a str,
    message: &'a str,
    resolved_at: String,
    comment: &'a str,
}

/// HTML template for the resolved notification.
#[derive(Template)]
#[template(path = "email/application_resolved.html")]
struct ResolvedHtml<'a> {
    name: &'a str,
    message: &'a str,
    resolved_at: String,
    comment: &'a str,
}

/// Render the plain-text body for a notification.
pub(super) fn render_text(
    to: &Email,
    subject: &str,
    kind: TemplateKind,
    application: &Application,
) -> Result<String, askama::Error> {
    match kind {
        TemplateKind::ApplicationReceived => ReceivedText {
            to: to.as_str(),
            subject,
            name: &application.name,
            message: &application.message,
            received_at: application.created_at.to_rfc2822(),
        }
        .render(),
        TemplateKind::ApplicationResolved => ResolvedText {
            to: to.as_str(),
            subject,
            name: &application.name,
            message: &application.message,
            resolved_at: application.updated_at.to_rfc2822(),
            comment: application.comment.as_deref().unwrap_or_default(),
        }
        .render(),
    }
}

/// Render the HTML body for a notification.
pub(super) fn render_html(
    kind: TemplateKind,
    application: &Application,
) -> Result<String, askama::Error> {
    match kind {
        TemplateKind::ApplicationReceived => ReceivedHtml {
            name: &application.name,
            message: &application.message,
            received_at: application.created_at.to_rfc2822(),
        }
        .render(),
        TemplateKind::ApplicationResolved => ResolvedHtml {
            name: &application.name,
            message: &application.message,
            resolved_at: application.updated_at.to_rfc2822(),
            comment: application.comment.as_deref().unwrap_or_default(),
        }
        .render(),
    }
}
