//! `delete` and `purge`: per-user destructive commands.

use anyhow::{Result, bail};
use tracing::instrument;
use userbase_business::{AppUsersActionKind, AppUsersCtx, DispatchOutcome, UserRecord};
use ustr::Ustr;

use crate::context::load_users;
use crate::output::Output;

/// Mark users as deleted.
pub async fn run_delete(ctx: AppUsersCtx, user_ids: Vec<String>) -> Result<()> {
    run_user_action(ctx, AppUsersActionKind::DeleteUser, user_ids).await
}

/// Permanently delete users already marked as deleted.
pub async fn run_purge(ctx: AppUsersCtx, user_ids: Vec<String>) -> Result<()> {
    run_user_action(ctx, AppUsersActionKind::PermanentlyDeleteUser, user_ids).await
}

pub(crate) fn dispatch(ctx: &mut AppUsersCtx, kind: AppUsersActionKind, user_id: Ustr) -> DispatchOutcome {
    match kind {
        AppUsersActionKind::DeleteUser => ctx.delete_user(user_id),
        AppUsersActionKind::PermanentlyDeleteUser => ctx.permanently_delete_user(user_id),
    }
}

/// Print why a dispatch did not start. Returns `true` if it did.
pub(crate) fn report_dispatch(
    out: &Output,
    kind: AppUsersActionKind,
    user_id: Ustr,
    outcome: DispatchOutcome,
) -> bool {
    match outcome {
        DispatchOutcome::Started(task) => {
            tracing::debug!(%task, "{} {user_id} started", kind.label());
            return true;
        }
        DispatchOutcome::Declined => out.dim(format!("Skipped {user_id}")),
        DispatchOutcome::Busy => {
            out.warning(format!("{user_id} already has an operation in progress"));
        }
        DispatchOutcome::NotFound => match kind {
            AppUsersActionKind::DeleteUser => {
                out.error(format!("{user_id}: no active user with this id"));
            }
            AppUsersActionKind::PermanentlyDeleteUser => out.error(format!(
                "{user_id}: no user pending deletion with this id (delete it first)"
            )),
        },
        DispatchOutcome::Ignored | DispatchOutcome::Disposed => {
            out.warning(format!("{user_id}: nothing to do"));
        }
    }
    false
}

/// Wait for every spawned call, then read each started user's outcome off
/// its record. An `Err` carries the message the failure left on the record.
pub(crate) async fn settle_started(
    ctx: &mut AppUsersCtx,
    kind: AppUsersActionKind,
    started: &[Ustr],
) -> Vec<(Ustr, Result<(), String>)> {
    ctx.settle().await;
    ctx.clear_error();

    started
        .iter()
        .map(|&user_id| {
            let record = ctx.state().find(user_id);
            let done = match kind {
                AppUsersActionKind::DeleteUser => record.is_some_and(UserRecord::is_deleted),
                AppUsersActionKind::PermanentlyDeleteUser => record.is_none(),
            };
            let outcome = if done {
                Ok(())
            } else {
                let message = record.and_then(UserRecord::last_error).unwrap_or("failed");
                Err(message.to_owned())
            };
            (user_id, outcome)
        })
        .collect()
}

/// Wait for `started` and print one line per user. Returns how many failed.
pub(crate) async fn settle_and_report(
    ctx: &mut AppUsersCtx,
    out: &Output,
    kind: AppUsersActionKind,
    started: &[Ustr],
) -> usize {
    let mut failed = 0;
    for (user_id, outcome) in settle_started(ctx, kind, started).await {
        match (outcome, kind) {
            (Ok(()), AppUsersActionKind::DeleteUser) => {
                out.success(format!("Deleted user {user_id} (pending permanent deletion)"));
            }
            (Ok(()), AppUsersActionKind::PermanentlyDeleteUser) => {
                out.success(format!("Permanently deleted user {user_id}"));
            }
            (Err(message), _) => {
                failed += 1;
                out.error(format!("Could not {} {user_id}: {message}", kind.label()));
            }
        }
    }
    failed
}

#[instrument(skip_all, name = "user_action", fields(action = kind.label(), count = user_ids.len()))]
async fn run_user_action(
    mut ctx: AppUsersCtx,
    kind: AppUsersActionKind,
    user_ids: Vec<String>,
) -> Result<()> {
    let out = Output::new();
    load_users(&mut ctx).await?;

    let mut started = Vec::new();
    let mut rejected = 0;
    for user_id in &user_ids {
        let user_id = Ustr::from(user_id.as_str());
        let outcome = dispatch(&mut ctx, kind, user_id);
        if report_dispatch(&out, kind, user_id, outcome) {
            started.push(user_id);
        } else if outcome != DispatchOutcome::Declined {
            rejected += 1;
        }
    }

    let failed = settle_and_report(&mut ctx, &out, kind, &started).await;
    ctx.dispose();

    let problems = failed + rejected;
    if problems > 0 {
        bail!("{problems} of {} user(s) could not be processed", user_ids.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use userbase_business::BusinessConfig;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, method, path},
    };

    use super::*;
    use crate::context::build_app_users_ctx;

    async fn server_with_users() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/list-app-users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "appId": "app-1",
                "users": [
                    { "userId": "a", "username": "ann", "creationDate": "2021-01-02T00:00:00Z" },
                    { "userId": "b", "username": "ben", "creationDate": "2021-01-01T00:00:00Z" },
                    { "userId": "d", "username": "dan", "creationDate": "2020-01-01T00:00:00Z", "deleted": true }
                ]
            })))
            .mount(&server)
            .await;
        server
    }

    fn ctx_for(server: &MockServer) -> AppUsersCtx {
        build_app_users_ctx("demo", &BusinessConfig::new(server.uri()), true)
    }

    #[tokio::test]
    async fn delete_several_users() {
        let server = server_with_users().await;
        Mock::given(method("POST"))
            .and(path("/admin/delete-user"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let result = run_delete(ctx_for(&server), vec!["a".to_owned(), "b".to_owned()]).await;

        assert!(result.is_ok(), "{result:?}");
    }

    #[tokio::test]
    async fn partial_failure_is_an_error() {
        let server = server_with_users().await;
        Mock::given(method("POST"))
            .and(path("/admin/delete-user"))
            .and(body_partial_json(json!({ "userId": "a" })))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/admin/delete-user"))
            .and(body_partial_json(json!({ "userId": "b" })))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = run_delete(ctx_for(&server), vec!["a".to_owned(), "b".to_owned()])
            .await
            .expect_err("b fails");

        assert_eq!(err.to_string(), "1 of 2 user(s) could not be processed");
    }

    #[tokio::test]
    async fn failures_finishing_together_keep_their_messages() {
        let server = server_with_users().await;
        for (user_id, body) in [("a", "boom-a"), ("b", "boom-b")] {
            Mock::given(method("POST"))
                .and(path("/admin/delete-user"))
                .and(body_partial_json(json!({ "userId": user_id })))
                .respond_with(
                    ResponseTemplate::new(500)
                        .set_body_string(body)
                        .set_delay(Duration::from_millis(100)),
                )
                .mount(&server)
                .await;
        }

        let mut ctx = ctx_for(&server);
        load_users(&mut ctx).await.expect("list loads");
        let started = [Ustr::from("a"), Ustr::from("b")];
        for &user_id in &started {
            assert!(dispatch(&mut ctx, AppUsersActionKind::DeleteUser, user_id).is_started());
        }
        // Both responses are queued before the owner looks at either.
        tokio::time::sleep(Duration::from_millis(400)).await;

        let outcomes = settle_started(&mut ctx, AppUsersActionKind::DeleteUser, &started).await;

        assert_eq!(
            outcomes,
            vec![
                (started[0], Err("boom-a".to_owned())),
                (started[1], Err("boom-b".to_owned())),
            ]
        );
        assert!(ctx.state().error().is_none());
    }

    #[tokio::test]
    async fn purge_requires_pending_deletion() {
        let server = server_with_users().await;
        Mock::given(method("POST"))
            .and(path("/admin/permanent-delete-user"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let err = run_purge(ctx_for(&server), vec!["d".to_owned(), "a".to_owned()])
            .await
            .expect_err("a is still active");

        assert_eq!(err.to_string(), "1 of 2 user(s) could not be processed");
    }
}
