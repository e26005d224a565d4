//! Login, register, logout and whoami.

use chrono::{DateTime, Utc};
use dialoguer::Input;
use secrecy::SecretString;
use serde::Serialize;

use loomap_core::{Dashboard, Session};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct SessionView {
    user_id: i64,
    issued_at: Option<DateTime<Utc>>,
    expires_at: DateTime<Utc>,
}

impl From<&Session> for SessionView {
    fn from(s: &Session) -> Self {
        Self {
            user_id: s.subject,
            issued_at: s.issued_at,
            expires_at: s.expires_at,
        }
    }
}

fn detail(v: &SessionView) -> String {
    let remaining = v.expires_at - Utc::now();
    [
        format!("User ID:  {}", v.user_id),
        format!(
            "Issued:   {}",
            v.issued_at.map_or_else(|| "-".into(), |t| t.to_rfc3339())
        ),
        format!(
            "Expires:  {} (in {}m)",
            v.expires_at.to_rfc3339(),
            remaining.num_minutes().max(0)
        ),
    ]
    .join("\n")
}

fn credentials(args: &LoginArgs) -> Result<(String, SecretString), CliError> {
    let username = match &args.username {
        Some(name) => name.clone(),
        None => Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(util::prompt_err)?,
    };
    let password = util::read_password(args.password_stdin)?;
    Ok((username, password))
}

pub async fn login(
    dashboard: &Dashboard,
    args: LoginArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (username, password) = credentials(&args)?;
    let session = dashboard.login(&username, &password).await?;
    output::success(
        global,
        &format!(
            "Logged in as '{}' until {}",
            username.trim(),
            session.expires_at.format("%Y-%m-%d %H:%M UTC")
        ),
    );
    Ok(())
}

pub async fn register(
    dashboard: &Dashboard,
    args: LoginArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (username, password) = credentials(&args)?;
    dashboard.register(&username, &password).await?;
    output::success(
        global,
        &format!("Account '{}' created. Run: loomap login", username.trim()),
    );
    Ok(())
}

pub fn logout(dashboard: &Dashboard, global: &GlobalOpts) {
    dashboard.logout();
    output::success(global, "Logged out");
}

pub fn whoami(dashboard: &Dashboard, global: &GlobalOpts) -> Result<(), CliError> {
    let session = dashboard.require_session()?;
    let view = SessionView::from(&session);
    let out = output::render_single(&global.output, &view, detail, |v| v.user_id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
