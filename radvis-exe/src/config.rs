//! User configuration options.

use crate::{BASE_DIR, CLIOptions};
use dirs::config_dir;
use radvis::log::{LevelFilter, info, warn};
use radvis::{VisConfig, VisMode};
use serde::{Deserialize, Serialize};
use std::{
    error::Error,
    fs::{File, OpenOptions, create_dir_all},
    io::{Read, Write},
    path::{Path, PathBuf},
};

const LOG_TAG: &str = "UserConfig";

fn get_cfg_file() -> Result<PathBuf, Box<dyn Error>> {
    let mut dir = config_dir().ok_or("Couldn't find the user config dir")?;
    dir.push(BASE_DIR);
    if !dir.exists() {
        create_dir_all(&dir)?;
    }
    dir.push("user.toml");
    Ok(dir)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub verbose: LevelFilter,
    /// 0 picks one thread per core
    pub threads: usize,
    pub incremental: bool,
    pub mode: VisMode,
    pub estimate: bool,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            verbose: LevelFilter::Info,
            threads: 0,
            incremental: false,
            mode: VisMode::Binary,
            estimate: true,
        }
    }
}

impl UserConfig {
    /// Read the config, creating it with defaults if it is missing or broken
    pub fn load() -> Result<Self, Box<dyn Error>> {
        let path = get_cfg_file()?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        let mut buf = String::new();
        if file.read_to_string(&mut buf)? > 0 {
            match toml::from_str(&buf) {
                Ok(data) => {
                    info!(target: LOG_TAG, "Loaded user config file");
                    return Ok(data);
                }
                Err(e) => warn!("Could not deserialise {path:?} recreating config: {e}"),
            }
        }
        UserConfig::create_default(&mut file, &path)
    }

    fn create_default(file: &mut File, path: &Path) -> Result<Self, Box<dyn Error>> {
        let config = UserConfig::default();
        let data = toml::to_string(&config)?;
        file.set_len(0)?;
        file.write_all(data.as_bytes())?;
        info!("Saved default user config to {path:?}");
        Ok(config)
    }

    pub fn write(&self) -> Result<(), Box<dyn Error>> {
        let mut file = File::create(get_cfg_file()?)?;
        let data = toml::to_string_pretty(self)?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    /// Sync the CLI options and UserOptions with each other
    pub fn sync_cli(&mut self, cli: &mut CLIOptions) {
        info!("Checking CLI options");

        if let Some(verbose) = cli.verbose {
            self.verbose = verbose;
        } else {
            cli.verbose = Some(self.verbose);
        }

        if let Some(threads) = cli.threads {
            if threads != self.threads {
                self.threads = threads;
                info!("Worker threads changed to: {threads}");
            }
        } else {
            cli.threads = Some(self.threads);
        }

        if let Some(f) = cli.incremental {
            self.incremental = f;
        } else {
            cli.incremental = Some(self.incremental);
        }

        if let Some(mode) = cli.mode {
            if mode != self.mode {
                self.mode = mode;
                info!("Visibility mode changed to: {mode:?}");
            }
        } else {
            cli.mode = Some(self.mode);
        }

        if let Some(f) = cli.estimate {
            self.estimate = f;
        } else {
            cli.estimate = Some(self.estimate);
        }
    }

    pub fn vis_config(&self) -> VisConfig {
        let defaults = VisConfig::default();
        VisConfig {
            threads: if self.threads == 0 {
                defaults.threads
            } else {
                self.threads
            },
            incremental: self.incremental,
            mode: self.mode,
            estimate: self.estimate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> CLIOptions {
        CLIOptions {
            verbose: None,
            room: PathBuf::from("hall.toml"),
            threads: None,
            incremental: None,
            mode: None,
            estimate: None,
        }
    }

    #[test]
    fn cli_overrides_and_is_filled_in() {
        let mut config = UserConfig::default();
        let mut options = CLIOptions {
            threads: Some(3),
            mode: Some(VisMode::Attenuated),
            ..cli()
        };
        config.sync_cli(&mut options);

        assert_eq!(config.threads, 3);
        assert_eq!(config.mode, VisMode::Attenuated);
        assert_eq!(options.verbose, Some(LevelFilter::Info));
        assert_eq!(options.incremental, Some(false));
        assert_eq!(options.estimate, Some(true));
    }

    #[test]
    fn zero_threads_means_all_cores() {
        let config = UserConfig::default();
        assert!(config.vis_config().threads >= 1);

        let config = UserConfig {
            threads: 2,
            ..UserConfig::default()
        };
        assert_eq!(config.vis_config().threads, 2);
    }

    #[test]
    fn toml_fills_missing_fields() {
        let config: UserConfig = toml::from_str("mode = \"Attenuated\"").unwrap();
        assert_eq!(config.mode, VisMode::Attenuated);
        assert_eq!(config.verbose, LevelFilter::Info);
        assert!(config.estimate);
    }
}
