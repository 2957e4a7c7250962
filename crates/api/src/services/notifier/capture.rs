//! Capture notifier: renders notifications to local artifact files.

use std::path::PathBuf;

use async_trait::async_trait;

use helpdesk_core::Email;

use super::{Notifier, NotifierError, TemplateKind, render_text};
use crate::models::Application;

/// Notifier variant that writes one plain-text artifact per send under
/// `<dir>/<template kind>/`. Nothing is delivered to a real inbox, which
/// makes it the default for local environments and the test suite.
pub struct CaptureNotifier {
    dir: PathBuf,
}

impl CaptureNotifier {
    /// Create a capture notifier rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl Notifier for CaptureNotifier {
    async fn send(
        &self,
        to: &Email,
        subject: &str,
        kind: TemplateKind,
        application: &Application,
    ) -> Result<(), NotifierError> {
        let body = render_text(to, subject, kind, application)?;

        let kind_dir = self.dir.join(kind.as_str());
        tokio::fs::create_dir_all(&kind_dir).await?;

        let filename = format!(
            "{}_{}.txt",
            application.updated_at.format("%Y-%m-%dT%H-%M-%S%.3f"),
            to
        );
        let path = kind_dir.join(filename);
        tokio::fs::write(&path, body).await?;

        tracing::info!(to = %to, kind = kind.as_str(), path = %path.display(), "notification captured");
        Ok(())
    }
}
