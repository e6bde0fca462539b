use std::io::Write;
use std::str::FromStr;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Control commands accepted while the scheduler is running. Produced by the
/// terminal reader, consumed exactly once by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Drop the pending change and re-arm with a fresh delay
    Restart,
    /// Re-read configuration, change the wallpaper now, re-arm
    Reload,
    /// Stop the scheduler
    Exit,
}

impl FromStr for ControlCommand {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "restart" => Ok(ControlCommand::Restart),
            "reload" => Ok(ControlCommand::Reload),
            "exit" => Ok(ControlCommand::Exit),
            other => Err(other.to_string()),
        }
    }
}

fn prompt() {
    print!("queuewall> ");
    let _ = std::io::stdout().flush();
}

/// Interactive command source: reads lines from stdin and forwards control
/// commands over the channel in FIFO order. End of input is translated into
/// an `Exit` command, never dropped.
pub fn spawn_terminal_reader(commands: mpsc::Sender<ControlCommand>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        prompt();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    log::debug!("end of command input, exiting");
                    let _ = commands.send(ControlCommand::Exit).await;
                    break;
                }
                Err(e) => {
                    log::error!("Failed to read command input: {}", e);
                    let _ = commands.send(ControlCommand::Exit).await;
                    break;
                }
            };

            let line = line.trim();
            if line == "help" {
                println!("Commands: exit, help, reload, restart");
            } else if !line.is_empty() {
                match line.parse::<ControlCommand>() {
                    Ok(command) => {
                        if commands.send(command).await.is_err() {
                            // Scheduler already stopped
                            break;
                        }
                        if command == ControlCommand::Exit {
                            break;
                        }
                    }
                    Err(unknown) => println!("Unknown command: {}", unknown),
                }
            }
            prompt();
        }
        log::debug!("terminal reader returning");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!("restart".parse(), Ok(ControlCommand::Restart));
        assert_eq!("reload".parse(), Ok(ControlCommand::Reload));
        assert_eq!("exit".parse(), Ok(ControlCommand::Exit));
    }

    #[test]
    fn test_parse_unknown_command() {
        let err = "pause".parse::<ControlCommand>().unwrap_err();
        assert_eq!(err, "pause");
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("Exit".parse::<ControlCommand>().is_err());
        assert!("EXIT".parse::<ControlCommand>().is_err());
    }
}
