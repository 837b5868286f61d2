//! `users`: list an app's users, optionally driving deletes interactively.

use std::fmt;

use anyhow::{Context as _, Result};
use inquire::Select;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::instrument;
use userbase_business::app_users::Profile;
use userbase_business::{
    AppUsersActionKind, AppUsersCtx, AppUsersState, PendingOperation, UserRecord,
};
use ustr::Ustr;

use crate::commands::delete::{dispatch, report_dispatch, settle_and_report};
use crate::context::load_users;
use crate::output::Output;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "User ID")]
    user_id: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn status(record: &UserRecord) -> &'static str {
    match record.pending_operation() {
        PendingOperation::Deleting => "deleting...",
        PendingOperation::PermanentlyDeleting => "purging...",
        PendingOperation::None if record.is_deleted() => "pending deletion",
        PendingOperation::None => "active",
    }
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    } else {
        s.to_owned()
    }
}

fn user_table(users: &[UserRecord]) -> String {
    let rows: Vec<UserRow> = users
        .iter()
        .map(|u| UserRow {
            username: truncate_str(u.username(), 32),
            user_id: u.user_id().to_string(),
            created: u.formatted_creation_date().to_owned(),
            status: status(u).to_owned(),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.to_string()
}

fn print_profile(out: &Output, label: &str, profile: Option<&Profile>) {
    let Some(profile) = profile.filter(|p| !p.is_empty()) else {
        return;
    };
    out.labeled_indent(label, "", 2);
    for (key, value) in profile {
        out.labeled_indent(key, value, 4);
    }
}

fn print_metadata(out: &Output, record: &UserRecord) {
    out.subheader(format!("{} [{}]", record.username(), record.user_id()));
    out.labeled_indent("Email", record.email().unwrap_or("-"), 2);
    out.labeled_indent("Created", record.formatted_creation_date(), 2);
    print_profile(out, "Profile", record.profile());
    print_profile(out, "Protected profile", record.protected_profile());
}

fn print_list(out: &Output, users: &[UserRecord], empty: &str) {
    if users.is_empty() {
        out.dim(empty);
        return;
    }
    out.print(user_table(users));
    for record in users.iter().filter(|u| u.is_metadata_expanded()) {
        out.newline();
        print_metadata(out, record);
    }
}

fn print_users(out: &Output, state: &AppUsersState) {
    out.newline();
    out.header(format!("Users of {}", state.app_name()));
    out.info(state.user_count_label());
    print_list(out, state.active_users(), "No users.");

    if state.is_showing_deleted_users() {
        out.newline();
        out.subheader(format!("Pending deletion ({})", state.deleted_users().len()));
        print_list(out, state.deleted_users(), "None.");
    } else if !state.deleted_users().is_empty() {
        out.dim(format!(
            "{} user(s) pending deletion hidden (use --deleted)",
            state.deleted_users().len()
        ));
    }
}

#[instrument(skip_all, name = "users", fields(app = %ctx.state().app_name(), deleted, expand, interactive))]
pub async fn run_users(
    mut ctx: AppUsersCtx,
    deleted: bool,
    expand: bool,
    interactive: bool,
) -> Result<()> {
    let out = Output::new();
    load_users(&mut ctx).await?;

    if expand {
        ctx.expand_all();
    } else if deleted {
        ctx.show_deleted_users();
    }

    if interactive {
        run_interactive(&mut ctx, &out).await?;
    }

    print_users(&out, ctx.state());
    ctx.dispose();
    Ok(())
}

enum MenuItem {
    User { user_id: Ustr, label: String },
    ToggleDeleted { showing: bool },
    ExpandAll,
    CollapseAll,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User { label, .. } => f.write_str(label),
            Self::ToggleDeleted { showing: true } => f.write_str("Hide users pending deletion"),
            Self::ToggleDeleted { showing: false } => f.write_str("Show users pending deletion"),
            Self::ExpandAll => f.write_str("Expand all"),
            Self::CollapseAll => f.write_str("Collapse all"),
        }
    }
}

fn menu(state: &AppUsersState) -> Vec<MenuItem> {
    let shown_deleted: &[UserRecord] = if state.is_showing_deleted_users() {
        state.deleted_users()
    } else {
        &[]
    };

    let mut items: Vec<MenuItem> = state
        .active_users()
        .iter()
        .chain(shown_deleted)
        .map(|u| MenuItem::User {
            user_id: u.user_id(),
            label: format!("{} [{}] ({})", u.username(), u.user_id(), status(u)),
        })
        .collect();
    items.push(MenuItem::ToggleDeleted {
        showing: state.is_showing_deleted_users(),
    });
    items.push(MenuItem::ExpandAll);
    items.push(MenuItem::CollapseAll);
    items
}

const TOGGLE_DETAILS: &str = "Toggle details";
const DELETE: &str = "Delete";
const PURGE: &str = "Permanently delete";

async fn run_interactive(ctx: &mut AppUsersCtx, out: &Output) -> Result<()> {
    loop {
        let selection = Select::new("Select a user:", menu(ctx.state()))
            .with_help_message("Use arrow keys to navigate, Enter to select, Esc to finish")
            .prompt_skippable()
            .context("Failed to select user")?;

        let user_id = match selection {
            None => return Ok(()),
            Some(MenuItem::ToggleDeleted { showing: true }) => {
                ctx.hide_deleted_users();
                continue;
            }
            Some(MenuItem::ToggleDeleted { showing: false }) => {
                ctx.show_deleted_users();
                continue;
            }
            Some(MenuItem::ExpandAll) => {
                ctx.expand_all();
                continue;
            }
            Some(MenuItem::CollapseAll) => {
                ctx.collapse_all();
                continue;
            }
            Some(MenuItem::User { user_id, .. }) => user_id,
        };

        let Some(record) = ctx.state().find(user_id) else {
            continue;
        };
        let (kind, action) = if record.is_deleted() {
            (AppUsersActionKind::PermanentlyDeleteUser, PURGE)
        } else {
            (AppUsersActionKind::DeleteUser, DELETE)
        };

        let choice = Select::new(&format!("{}:", record.username()), vec![TOGGLE_DETAILS, action])
            .prompt_skippable()
            .context("Failed to select action")?;

        match choice {
            Some(TOGGLE_DETAILS) => {
                ctx.toggle_metadata(user_id);
                if let Some(record) = ctx.state().find(user_id).filter(|r| r.is_metadata_expanded()) {
                    print_metadata(out, record);
                }
            }
            Some(_) => {
                let outcome = dispatch(ctx, kind, user_id);
                if report_dispatch(out, kind, user_id, outcome) {
                    settle_and_report(ctx, out, kind, &[user_id]).await;
                }
            }
            None => {}
        }
    }
}
