//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod config_cmd;
pub mod cylinders;
pub mod scan;
pub mod types;
pub mod util;

use std::path::PathBuf;

use cyltrack_core::Inventory;

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

/// Everything an inventory-bound handler needs.
pub struct Context {
    pub inventory: Inventory,
    pub data_dir: PathBuf,
    pub config: Config,
    pub global: GlobalOpts,
}

/// Dispatch an inventory-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Types(args) => types::handle(ctx, args),
        Command::Cylinders(args) => cylinders::handle(ctx, args),
        Command::Scan(args) => scan::handle(ctx, args).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
