use tokio::sync::mpsc;

use crate::command::ControlCommand;
use crate::error::{ErrorReporting, Result};
use crate::executor::ChangeAction;
use crate::schedule::{delay_until_next, Clock, ScheduleConfig};
use crate::selector::WallpaperSelector;
use crate::timer::PendingAction;

/// Lifecycle flag. Starts `Running`, reaches `Stopping` on an exit command
/// or interrupt, never goes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopping,
}

type ConfigReload = Box<dyn Fn() -> Result<ScheduleConfig> + Send>;

/// Drives the timed, interruptible wallpaper-change loop.
///
/// While running, exactly one [`PendingAction`] is outstanding (except in
/// the window between a fire/cancel and the next arm), and change actions
/// never overlap: the pending timer is always cancelled before a synchronous
/// change runs, and re-arming waits for it to complete.
pub struct Scheduler<A, C> {
    config: ScheduleConfig,
    action: A,
    clock: C,
    commands: mpsc::Receiver<ControlCommand>,
    reload_config: Option<ConfigReload>,
    state: RunState,
}

impl<A: ChangeAction, C: Clock> Scheduler<A, C> {
    pub fn new(
        config: ScheduleConfig,
        action: A,
        clock: C,
        commands: mpsc::Receiver<ControlCommand>,
    ) -> Self {
        Self {
            config,
            action,
            clock,
            commands,
            reload_config: None,
            state: RunState::Running,
        }
    }

    /// Re-resolve the schedule configuration on `reload` commands. Without
    /// this, `reload` keeps the current configuration.
    pub fn with_config_reload(
        mut self,
        reload: impl Fn() -> Result<ScheduleConfig> + Send + 'static,
    ) -> Self {
        self.reload_config = Some(Box::new(reload));
        self
    }

    /// Blocks until the scheduler reaches `Stopping`.
    pub async fn run(mut self) -> Result<()> {
        if !self.config.directory.exists() {
            // Tolerated: cycles are skipped until the directory appears
            log::warn!(
                "Wallpaper directory does not exist: {:?}",
                self.config.directory
            );
        }

        // Set the wallpaper for the current time before the first delay
        self.change_wallpaper();

        let (fired_tx, mut fired_rx) = mpsc::channel(1);
        let mut pending = self.arm(&fired_tx);

        while self.state == RunState::Running {
            tokio::select! {
                Some(()) = fired_rx.recv() => {
                    self.change_wallpaper();
                    pending = self.arm(&fired_tx);
                }
                command = self.commands.recv() => {
                    // A closed command channel behaves like an explicit exit
                    let command = command.unwrap_or(ControlCommand::Exit);
                    pending.cancel();
                    match command {
                        ControlCommand::Restart => {
                            log::info!("restarting schedule");
                            pending = self.arm(&fired_tx);
                        }
                        ControlCommand::Reload => {
                            log::info!("reloading");
                            self.reload();
                            self.change_wallpaper();
                            pending = self.arm(&fired_tx);
                        }
                        ControlCommand::Exit => {
                            log::info!("exiting...");
                            self.state = RunState::Stopping;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    log::info!("interrupt received, exiting...");
                    pending.cancel();
                    self.state = RunState::Stopping;
                }
            }
        }

        Ok(())
    }

    fn arm(&self, fired: &mpsc::Sender<()>) -> PendingAction {
        let delay = delay_until_next(&self.config.mode, &self.clock.now());
        log::info!("next change in {}s", delay.as_secs());
        PendingAction::arm(delay, fired.clone())
    }

    /// One change cycle. Every failure here is contained to this cycle.
    fn change_wallpaper(&self) {
        let candidate = match WallpaperSelector::select(&self.config, &self.clock.now()) {
            Ok(path) => path,
            Err(e) => {
                log::warn!("Skipping cycle: {}", e.user_friendly_message());
                return;
            }
        };

        if !candidate.exists() {
            log::info!("No wallpaper: {:?}", candidate);
            return;
        }

        if let Err(e) = self.action.change_wallpaper(&candidate) {
            log::error!(
                "Failed to set wallpaper {:?}: {}",
                candidate,
                e.user_friendly_message()
            );
        }
    }

    fn reload(&mut self) {
        if let Some(reload) = &self.reload_config {
            match reload() {
                Ok(config) => self.config = config,
                Err(e) => log::error!(
                    "Failed to reload configuration, keeping previous: {}",
                    e.user_friendly_message()
                ),
            }
        }
    }
}
