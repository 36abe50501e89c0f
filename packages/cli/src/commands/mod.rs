pub mod init;
pub mod inspect;
pub mod replay;

pub use init::{init, InitArgs};
pub use inspect::{inspect, InspectArgs};
pub use replay::{replay, ReplayArgs};

use anyhow::Result;
use pagebuilder_editor::{EditorConfig, FileGateway};
use std::path::Path;

/// Load the project config and a gateway over its pages directory
pub(crate) fn open_project(cwd: &Path) -> Result<(EditorConfig, FileGateway)> {
    let config = EditorConfig::load(cwd)?;
    let gateway = FileGateway::new(config.get_pages_dir(cwd));
    Ok((config, gateway))
}
