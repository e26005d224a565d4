//! Command dispatch: bridges CLI args -> dashboard actions -> output formatting.

pub mod config_cmd;
pub mod locate;
pub mod reviews;
pub mod session;
pub mod toilets;
pub mod util;

use loomap_core::Dashboard;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    dashboard: &Dashboard,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => session::login(dashboard, args, global).await,
        Command::Register(args) => session::register(dashboard, args, global).await,
        Command::Logout => {
            session::logout(dashboard, global);
            Ok(())
        }
        Command::Whoami => session::whoami(dashboard, global),
        Command::Toilets(args) => toilets::handle(dashboard, args, global).await,
        Command::Reviews(args) => reviews::handle(dashboard, args, global).await,
        Command::Locate => locate::handle(dashboard, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
