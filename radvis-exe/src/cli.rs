use std::path::PathBuf;

use argh::FromArgs;
use radvis::{VisMode, log};

/// Build patch to patch visibility for a procedural room
#[derive(Debug, Clone, FromArgs)]
pub struct CLIOptions {
    /// verbose level: off, error, warn, info, debug
    #[argh(option)]
    pub verbose: Option<log::LevelFilter>,
    /// path to a room description (toml). Transfers are cached next to it
    #[argh(option)]
    pub room: PathBuf,
    /// worker threads, 0 for one per core
    #[argh(option)]
    pub threads: Option<usize>,
    /// reuse the transfers cached from the last run of the same room
    #[argh(option)]
    pub incremental: Option<bool>,
    /// visibility mode <binary, attenuated>
    #[argh(option)]
    pub mode: Option<VisMode>,
    /// log progress and time remaining while building
    #[argh(option)]
    pub estimate: Option<bool>,
}
