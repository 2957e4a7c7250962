//! In-memory store implementations.
//!
//! These back the test suites and database-free local runs. They enforce
//! the same contracts as the `PostgreSQL` stores: unique emails, and a
//! check-and-set `resolve` that admits exactly one transition per
//! application (the mutex plays the role of the conditional UPDATE).

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use helpdesk_core::{ApplicationId, ApplicationStatus, Email, UserId};

use super::{ApplicationStore, RepositoryError, UserStore};
use crate::models::{Application, ApplicationFilter, NewApplication, NewUser, SortOrder, User};

/// In-memory user store.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<UserTable>,
}

#[derive(Default)]
struct UserTable {
    next_id: i32,
    rows: Vec<User>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let table = self.inner.lock().expect("user store mutex poisoned");
        Ok(table.rows.iter().find(|u| &u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut table = self.inner.lock().expect("user store mutex poisoned");

        if table.rows.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(format!(
                "email {} already registered",
                user.email
            )));
        }

        table.next_id += 1;
        let stored = User {
            id: UserId::new(table.next_id),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        table.rows.push(stored.clone());
        Ok(stored)
    }
}

/// In-memory application store.
#[derive(Default)]
pub struct MemoryApplicationStore {
    inner: Mutex<ApplicationTable>,
}

#[derive(Default)]
struct ApplicationTable {
    next_id: i32,
    rows: Vec<Application>,
}

#[async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn insert(&self, application: NewApplication) -> Result<Application, RepositoryError> {
        let mut table = self.inner.lock().expect("application store mutex poisoned");

        table.next_id += 1;
        let now = Utc::now();
        let stored = Application {
            id: ApplicationId::new(table.next_id),
            name: application.name,
            email: application.email,
            message: application.message,
            status: ApplicationStatus::Active,
            comment: None,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let table = self.inner.lock().expect("application store mutex poisoned");
        Ok(table.rows.iter().find(|a| a.id == id).cloned())
    }

    async fn list(&self, filter: &ApplicationFilter) -> Result<Vec<Application>, RepositoryError> {
        let table = self.inner.lock().expect("application store mutex poisoned");

        let mut matched: Vec<Application> = table
            .rows
            .iter()
            .filter(|a| filter.status.is_none_or(|status| a.status == status))
            .cloned()
            .collect();

        match filter.order_by_date {
            Some(SortOrder::Asc) => matched.sort_by_key(|a| a.updated_at),
            Some(SortOrder::Desc) => {
                matched.sort_by_key(|a| std::cmp::Reverse(a.updated_at));
            }
            None => {}
        }

        Ok(matched)
    }

    async fn resolve(
        &self,
        id: ApplicationId,
        comment: &str,
    ) -> Result<Option<Application>, RepositoryError> {
        let mut table = self.inner.lock().expect("application store mutex poisoned");

        let Some(application) = table
            .rows
            .iter_mut()
            .find(|a| a.id == id && a.status == ApplicationStatus::Active)
        else {
            return Ok(None);
        };

        application.status = ApplicationStatus::Resolved;
        application.comment = Some(comment.to_owned());
        application.updated_at = Utc::now();
        Ok(Some(application.clone()))
    }

    async fn delete(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let mut table = self.inner.lock().expect("application store mutex poisoned");

        let position = table.rows.iter().position(|a| a.id == id);
        Ok(position.map(|index| table.rows.remove(index)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_application(email: &str) -> NewApplication {
        NewApplication {
            name: "Ada".to_owned(),
            email: Email::parse(email).unwrap(),
            message: "crash".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_user_insert_assigns_sequential_ids() {
        let store = MemoryUserStore::default();
        let first = store
            .insert(NewUser {
                name: "Ada".to_owned(),
                email: Email::parse("ada@x.com").unwrap(),
                password_hash: "hash".to_owned(),
                role: helpdesk_core::Role::User,
            })
            .await
            .unwrap();
        let second = store
            .insert(NewUser {
                name: "Brian".to_owned(),
                email: Email::parse("brian@x.com").unwrap(),
                password_hash: "hash".to_owned(),
                role: helpdesk_core::Role::Admin,
            })
            .await
            .unwrap();

        assert_eq!(first.id.as_i32(), 1);
        assert_eq!(second.id.as_i32(), 2);
    }

    #[tokio::test]
    async fn test_user_duplicate_email_conflicts() {
        let store = MemoryUserStore::default();
        let user = NewUser {
            name: "Ada".to_owned(),
            email: Email::parse("ada@x.com").unwrap(),
            password_hash: "hash".to_owned(),
            role: helpdesk_core::Role::User,
        };
        store.insert(user.clone()).await.unwrap();

        let result = store.insert(user).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_resolve_is_conditional_on_active() {
        let store = MemoryApplicationStore::default();
        let application = store.insert(new_application("ada@x.com")).await.unwrap();

        let resolved = store.resolve(application.id, "patched").await.unwrap();
        assert!(resolved.is_some());

        // The second transition finds no active row.
        let again = store.resolve(application.id, "again").await.unwrap();
        assert!(again.is_none());

        let stored = store.get(application.id).await.unwrap().unwrap();
        assert_eq!(stored.comment.as_deref(), Some("patched"));
    }

    #[tokio::test]
    async fn test_resolve_unknown_id_is_none() {
        let store = MemoryApplicationStore::default();
        let resolved = store.resolve(ApplicationId::new(99), "patched").await.unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let store = MemoryApplicationStore::default();
        let first = store.insert(new_application("a@x.com")).await.unwrap();
        let second = store.insert(new_application("b@x.com")).await.unwrap();
        store.resolve(first.id, "done").await.unwrap();

        let active = store
            .list(&ApplicationFilter {
                status: Some(ApplicationStatus::Active),
                order_by_date: None,
            })
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active.first().unwrap().id, second.id);

        // first was resolved after second was created, so ascending
        // updated_at puts second first.
        let ordered = store
            .list(&ApplicationFilter {
                status: None,
                order_by_date: Some(SortOrder::Asc),
            })
            .await
            .unwrap();
        let ids: Vec<_> = ordered.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_delete_returns_removed_record() {
        let store = MemoryApplicationStore::default();
        let application = store.insert(new_application("ada@x.com")).await.unwrap();

        let removed = store.delete(application.id).await.unwrap().unwrap();
        assert_eq!(removed.id, application.id);
        assert!(store.get(application.id).await.unwrap().is_none());
        assert!(store.delete(application.id).await.unwrap().is_none());
    }
}
