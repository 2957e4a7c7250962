//! Application lifecycle manager.
//!
//! Owns the Active→Resolved state machine and triggers the lifecycle
//! notifications. Notification dispatch is awaited inline but best-effort:
//! the stored application is the durable record, so a failed send is
//! logged and never rolls back or fails the transition.

use std::sync::Arc;

use thiserror::Error;

use helpdesk_core::{ApplicationId, Email};

use crate::db::{ApplicationStore, RepositoryError};
use crate::models::{Application, ApplicationFilter, NewApplication};
use crate::services::notifier::{Notifier, TemplateKind};

/// Errors surfaced by the lifecycle manager.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// No application with this ID exists.
    #[error("application with ID \"{0}\" not found")]
    NotFound(ApplicationId),
    /// The application already reached its terminal state.
    #[error("application with ID \"{0}\" has already been resolved")]
    AlreadyResolved(ApplicationId),
    /// A resolution must carry a non-empty comment.
    #[error("comment must not be empty when resolving an application")]
    EmptyComment,
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// Manages submission, triage, and resolution of support applications.
pub struct ApplicationService {
    store: Arc<dyn ApplicationStore>,
    notifier: Arc<dyn Notifier>,
}

impl ApplicationService {
    /// Create a new lifecycle manager.
    #[must_use]
    pub fn new(store: Arc<dyn ApplicationStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Store a new application and notify the submitter.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::Store`] if persistence fails. A failed
    /// notification does not fail the submission.
    pub async fn submit(
        &self,
        name: String,
        email: Email,
        message: String,
    ) -> Result<Application, ApplicationError> {
        let application = self
            .store
            .insert(NewApplication {
                name,
                email,
                message,
            })
            .await?;

        tracing::info!(id = %application.id, "application submitted");
        self.dispatch(TemplateKind::ApplicationReceived, &application)
            .await;

        Ok(application)
    }

    /// Resolve an active application with a comment and notify the
    /// submitter.
    ///
    /// The transition is a single conditional update at the store layer, so
    /// of two racing resolve calls exactly one succeeds; the other observes
    /// the terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::EmptyComment`] for a blank comment,
    /// [`ApplicationError::NotFound`] for an unknown ID, and
    /// [`ApplicationError::AlreadyResolved`] when the application already
    /// reached its terminal state.
    pub async fn resolve(
        &self,
        id: ApplicationId,
        comment: &str,
    ) -> Result<Application, ApplicationError> {
        if comment.trim().is_empty() {
            return Err(ApplicationError::EmptyComment);
        }

        match self.store.resolve(id, comment).await? {
            Some(application) => {
                tracing::info!(id = %application.id, "application resolved");
                self.dispatch(TemplateKind::ApplicationResolved, &application)
                    .await;
                Ok(application)
            }
            // No row transitioned: either the ID is unknown or the
            // application was already resolved (possibly concurrently).
            None => match self.store.get(id).await? {
                Some(_) => Err(ApplicationError::AlreadyResolved(id)),
                None => Err(ApplicationError::NotFound(id)),
            },
        }
    }

    /// List applications matching the filter.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::Store`] if the query fails.
    pub async fn list(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, ApplicationError> {
        Ok(self.store.list(filter).await?)
    }

    /// Fetch an application by ID.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::NotFound`] when the ID is absent.
    pub async fn get(&self, id: ApplicationId) -> Result<Application, ApplicationError> {
        self.store
            .get(id)
            .await?
            .ok_or(ApplicationError::NotFound(id))
    }

    /// Delete an application, returning the removed record.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::NotFound`] when the ID is absent.
    pub async fn delete(&self, id: ApplicationId) -> Result<Application, ApplicationError> {
        self.store
            .delete(id)
            .await?
            .ok_or(ApplicationError::NotFound(id))
    }

    /// Best-effort notification dispatch.
    async fn dispatch(&self, kind: TemplateKind, application: &Application) {
        if let Err(error) = self
            .notifier
            .send(&application.email, kind.subject(), kind, application)
            .await
        {
            tracing::error!(
                %error,
                id = %application.id,
                kind = kind.as_str(),
                "failed to dispatch notification"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use helpdesk_core::ApplicationStatus;

    use super::*;
    use crate::db::MemoryApplicationStore;
    use crate::services::notifier::NotifierError;

    /// Records every dispatched notification.
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(Email, TemplateKind)>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(
            &self,
            to: &Email,
            _subject: &str,
            kind: TemplateKind,
            _application: &Application,
        ) -> Result<(), NotifierError> {
            self.sent
                .lock()
                .expect("notifier mutex poisoned")
                .push((to.clone(), kind));
            Ok(())
        }
    }

    /// Fails every send.
    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(
            &self,
            _to: &Email,
            _subject: &str,
            _kind: TemplateKind,
            _application: &Application,
        ) -> Result<(), NotifierError> {
            Err(NotifierError::InvalidAddress("transport down".to_owned()))
        }
    }

    fn service_with(notifier: Arc<dyn Notifier>) -> ApplicationService {
        ApplicationService::new(Arc::new(MemoryApplicationStore::default()), notifier)
    }

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_submit_stores_active_and_notifies() {
        let notifier = Arc::new(RecordingNotifier::default());
        let service = service_with(notifier.clone());

        let application = service
            .submit("Ada".to_owned(), email("ada@x.com"), "crash".to_owned())
            .await
            .unwrap();

        assert_eq!(application.status, ApplicationStatus::Active);
        assert!(application.comment.is_none());

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(
            *sent,
            vec![(email("ada@x.com"), TemplateKind::ApplicationReceived)]
        );
    }

    #[tokio::test]
    async fn test_resolve_transitions_and_notifies() {
        let notifier = Arc::new(RecordingNotifier::default());
        let service = service_with(notifier.clone());

        let application = service
            .submit("Ada".to_owned(), email("ada@x.com"), "crash".to_owned())
            .await
            .unwrap();
        let resolved = service.resolve(application.id, "patched").await.unwrap();

        assert_eq!(resolved.status, ApplicationStatus::Resolved);
        assert_eq!(resolved.comment.as_deref(), Some("patched"));

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(
            sent.get(1).unwrap(),
            &(email("ada@x.com"), TemplateKind::ApplicationResolved)
        );
    }

    #[tokio::test]
    async fn test_second_resolve_is_domain_error_and_changes_nothing() {
        let service = service_with(Arc::new(RecordingNotifier::default()));

        let application = service
            .submit("Ada".to_owned(), email("ada@x.com"), "crash".to_owned())
            .await
            .unwrap();
        service.resolve(application.id, "fixed").await.unwrap();

        let result = service.resolve(application.id, "fixed harder").await;
        assert!(matches!(result, Err(ApplicationError::AlreadyResolved(_))));

        let stored = service.get(application.id).await.unwrap();
        assert_eq!(stored.status, ApplicationStatus::Resolved);
        assert_eq!(stored.comment.as_deref(), Some("fixed"));
    }

    #[tokio::test]
    async fn test_resolve_unknown_id_not_found() {
        let service = service_with(Arc::new(RecordingNotifier::default()));
        let result = service.resolve(ApplicationId::new(404), "patched").await;
        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_resolve_requires_non_empty_comment() {
        let notifier = Arc::new(RecordingNotifier::default());
        let service = service_with(notifier.clone());

        let application = service
            .submit("Ada".to_owned(), email("ada@x.com"), "crash".to_owned())
            .await
            .unwrap();

        let result = service.resolve(application.id, "   ").await;
        assert!(matches!(result, Err(ApplicationError::EmptyComment)));

        // Still active, and no resolved notification went out.
        let stored = service.get(application.id).await.unwrap();
        assert_eq!(stored.status, ApplicationStatus::Active);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_the_transition() {
        let service = service_with(Arc::new(FailingNotifier));

        let application = service
            .submit("Ada".to_owned(), email("ada@x.com"), "crash".to_owned())
            .await
            .unwrap();
        assert_eq!(application.status, ApplicationStatus::Active);

        let resolved = service.resolve(application.id, "patched").await.unwrap();
        assert_eq!(resolved.status, ApplicationStatus::Resolved);
    }

    #[tokio::test]
    async fn test_delete_then_get_not_found() {
        let service = service_with(Arc::new(RecordingNotifier::default()));

        let application = service
            .submit("Ada".to_owned(), email("ada@x.com"), "crash".to_owned())
            .await
            .unwrap();

        let removed = service.delete(application.id).await.unwrap();
        assert_eq!(removed.id, application.id);

        let result = service.get(application.id).await;
        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    }
}
