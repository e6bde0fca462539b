pub mod command;
pub mod environment;
pub mod error;
pub mod executor;
pub mod schedule;
pub mod scheduler;
pub mod selector;
pub mod timer;

pub use command::{spawn_terminal_reader, ControlCommand};
pub use environment::{DesktopEnvironment, LinuxDesktop};
pub use error::{ErrorReporting, QueuewallError, Result};
pub use executor::{ChangeAction, ProcessExecutor};
pub use schedule::{delay_until_next, Clock, ScheduleConfig, ScheduleMode, SystemClock};
pub use scheduler::{RunState, Scheduler};
pub use selector::WallpaperSelector;
pub use timer::PendingAction;
