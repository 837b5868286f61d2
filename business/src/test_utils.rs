//! In-process fakes for driving [`AppUsersCtx`](crate::AppUsersCtx) in tests.
//!
//! `FakeAccountService` answers from a fixed user list and can hold any call
//! until the test releases it, which is how completion order is controlled:
//!
//! ```ignore
//! let service = Arc::new(FakeAccountService::new(vec![item("a", 10, false)]));
//! let release_a = service.hold("a");
//! let mut ctx = AppUsersCtx::new("demo", service.clone(), AutoConfirm);
//!
//! ctx.delete_user("a");
//! release_a.notify_one();
//! ctx.settle().await;
//! ```

#![cfg(test)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use tokio::sync::Notify;

use crate::app_users::{
    AccountService, AppUserItem, ConfirmPrompt, ConfirmationGate, ListAppUsersResponse,
    ServiceError, ServiceResult,
};

/// Key used by [`FakeAccountService::hold`] for the list call.
pub const LIST_KEY: &str = "list";
/// Key used by [`FakeAccountService::hold`] for the delete-app call.
pub const APP_KEY: &str = "app";

/// A user created `t` seconds after the epoch.
pub fn item(user_id: &str, t: i64, deleted: bool) -> AppUserItem {
    AppUserItem {
        user_id: user_id.to_owned(),
        username: format!("name-{user_id}"),
        creation_date: DateTime::from_timestamp(t, 0).expect("valid timestamp"),
        deleted,
        email: None,
        profile: None,
        protected_profile: None,
    }
}

#[derive(Default)]
pub struct FakeAccountService {
    users: Vec<AppUserItem>,
    holds: Mutex<HashMap<String, Arc<Notify>>>,
    failures: Mutex<HashMap<String, ServiceError>>,
    calls: Mutex<Vec<String>>,
    completed: Mutex<usize>,
}

impl FakeAccountService {
    pub fn new(users: Vec<AppUserItem>) -> Self {
        Self {
            users,
            ..Self::default()
        }
    }

    /// Calls for `key` (a user id, [`LIST_KEY`] or [`APP_KEY`]) wait until
    /// the returned handle is notified.
    pub fn hold(&self, key: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.holds
            .lock()
            .expect("holds lock")
            .insert(key.to_owned(), Arc::clone(&notify));
        notify
    }

    /// Calls for `key` fail with `err`.
    pub fn fail(&self, key: &str, err: ServiceError) {
        self.failures
            .lock()
            .expect("failures lock")
            .insert(key.to_owned(), err);
    }

    /// `"<endpoint>:<key>"` for every call made, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn completed(&self) -> usize {
        *self.completed.lock().expect("completed lock")
    }

    /// Wait until `n` calls have returned, even from detached tasks.
    pub async fn wait_completed(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.completed() < n {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("service calls did not complete in time");
    }

    async fn call(&self, endpoint: &str, key: &str) -> ServiceResult<()> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(format!("{endpoint}:{key}"));

        let hold = self.holds.lock().expect("holds lock").get(key).cloned();
        if let Some(hold) = hold {
            hold.notified().await;
        }

        let failure = self.failures.lock().expect("failures lock").get(key).cloned();
        *self.completed.lock().expect("completed lock") += 1;
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AccountService for FakeAccountService {
    async fn list_users(&self, _app_name: &str) -> ServiceResult<ListAppUsersResponse> {
        self.call("list-app-users", LIST_KEY).await?;
        Ok(ListAppUsersResponse {
            app_id: "app-1".to_owned(),
            users: self.users.clone(),
        })
    }

    async fn delete_user(
        &self,
        user_id: &str,
        _app_name: &str,
        _username: &str,
    ) -> ServiceResult<()> {
        self.call("delete-user", user_id).await
    }

    async fn permanently_delete_user(
        &self,
        user_id: &str,
        _app_name: &str,
        _username: &str,
    ) -> ServiceResult<()> {
        self.call("permanent-delete-user", user_id).await
    }

    async fn delete_app(&self, _app_name: &str) -> ServiceResult<()> {
        self.call("delete-app", APP_KEY).await
    }
}

/// Gives a fixed answer and remembers what it was asked.
pub struct ScriptedGate {
    answer: bool,
    asked: Mutex<Vec<ConfirmPrompt>>,
}

impl ScriptedGate {
    pub fn new(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            asked: Mutex::new(Vec::new()),
        })
    }

    pub fn asked(&self) -> Vec<ConfirmPrompt> {
        self.asked.lock().expect("asked lock").clone()
    }
}

impl ConfirmationGate for ScriptedGate {
    fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        self.asked.lock().expect("asked lock").push(prompt.clone());
        self.answer
    }
}
