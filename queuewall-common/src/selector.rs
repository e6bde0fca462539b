use std::path::PathBuf;

use chrono::{DateTime, Local, Timelike};
use rand::seq::SliceRandom;
use walkdir::WalkDir;

use crate::error::{QueuewallError, Result, SelectionError};
use crate::schedule::{ScheduleConfig, ScheduleMode};

/// Picks the candidate wallpaper for a change cycle.
///
/// The returned path is only a candidate: in the time-of-day modes nothing
/// guarantees the file exists, and the caller is expected to treat a missing
/// file as a skipped cycle rather than a failure.
pub struct WallpaperSelector;

impl WallpaperSelector {
    pub fn select(config: &ScheduleConfig, now: &DateTime<Local>) -> Result<PathBuf> {
        match config.mode {
            ScheduleMode::Random => Self::select_random(config),
            ScheduleMode::HourlyByClock | ScheduleMode::FixedInterval(_) => {
                Ok(Self::hour_named(config, now))
            }
        }
    }

    /// Wallpapers are laid out as `HH.<ext>` for `HH` in `00`-`23`.
    fn hour_named(config: &ScheduleConfig, now: &DateTime<Local>) -> PathBuf {
        config
            .directory
            .join(format!("{:02}.{}", now.hour(), config.extension))
    }

    fn select_random(config: &ScheduleConfig) -> Result<PathBuf> {
        // TODO: the random pool is the raw directory listing, so non-image
        // files can be picked. Decide whether to filter by `extension`.
        let mut entries = Vec::new();
        for entry in WalkDir::new(&config.directory).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                QueuewallError::Selection(SelectionError::DirectoryRead {
                    path: config.directory.clone(),
                    source: std::io::Error::other(e),
                })
            })?;
            if entry.path().is_file() {
                entries.push(entry.path().to_path_buf());
            }
        }

        entries
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| {
                QueuewallError::Selection(SelectionError::EmptyDirectory {
                    path: config.directory.clone(),
                })
            })
    }
}
