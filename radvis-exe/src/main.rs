#![doc = include_str!("../../README.md")]

mod cli;
mod config;
mod room;
mod solver;

use cli::*;
use mimalloc::MiMalloc;
use simplelog::TermLogger;
use std::error::Error;
use std::time::Instant;

use crate::config::UserConfig;
use crate::room::RoomDesc;
use crate::solver::TransferSummary;
use radvis::log::{self, info};
use radvis::make_scales;

const BASE_DIR: &str = "radvis/";

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<(), Box<dyn Error>> {
    let mut options: CLIOptions = argh::from_env();

    // The logger passes everything, the max level does the filtering so it
    // can follow the user config once that is read
    TermLogger::init(
        log::LevelFilter::Trace,
        simplelog::ConfigBuilder::default()
            .set_time_level(log::LevelFilter::Trace)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;
    log::set_max_level(options.verbose.unwrap_or(log::LevelFilter::Info));

    let mut user_config = UserConfig::load()?;
    user_config.sync_cli(&mut options);
    user_config.write()?;
    log::set_max_level(user_config.verbose);

    let room = RoomDesc::load(&options.room)?;
    let (scene, tracer) = room.build();
    let config = user_config.vis_config();
    info!(
        "Mode {:?}, {} threads, incremental {}",
        config.mode, config.threads, config.incremental
    );

    let start = Instant::now();
    let transfers = make_scales(&scene, &tracer, &config, &options.room, |vis| {
        solver::encode(&solver::count_transfers(vis))
    })?;

    let table = solver::decode(&transfers.data)?;
    if table.len() != scene.num_patches() {
        return Err(format!(
            "transfer table has {} entries for {} patches",
            table.len(),
            scene.num_patches()
        )
        .into());
    }
    TransferSummary::of(&table).log();
    info!(
        "Finished in {:.2}s{}",
        start.elapsed().as_secs_f32(),
        if transfers.from_cache {
            ", transfers from cache"
        } else {
            ""
        }
    );

    Ok(())
}
