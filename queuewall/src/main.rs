use std::path::PathBuf;

use clap::Parser;
use tokio::sync::mpsc;

use queuewall_common::{
    environment, spawn_terminal_reader, DesktopEnvironment, ErrorReporting, ProcessExecutor,
    Result, Scheduler, SystemClock,
};
use queuewall_config::Config;

#[derive(Parser, Debug, Clone)]
#[command(name = "queuewall")]
#[command(about = "queuewall (timed wallpaper changer)")]
#[command(version)]
struct Cli {
    /// Custom wallpaper command template, %s replaced with the image path
    #[arg(short, long)]
    command: Option<String>,

    /// Composite the image's name onto it before applying
    #[arg(long)]
    caption: bool,

    /// Wallpaper directory
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Wallpaper file extension
    #[arg(short, long)]
    extension: Option<String>,

    /// Minutes between changes; 60 aligns changes to the hour
    #[arg(short, long)]
    interval: Option<u64>,

    /// Default the log filter to info instead of warn
    #[arg(short, long)]
    log: bool,

    /// Pick a random file from the directory instead of the hour-named one
    #[arg(short, long)]
    random: bool,

    /// Target environment: autodetect, gnome, xfce4, lxde, other, windows
    #[arg(short, long)]
    system: Option<String>,

    /// Accept restart/reload/exit commands on stdin
    #[arg(short, long)]
    terminal: bool,

    /// Directory for captioned and converted image copies
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Configuration file first, command-line flags on top.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(command) = &cli.command {
        config.command = Some(command.clone());
    }
    if cli.caption {
        config.caption = true;
    }
    if let Some(directory) = &cli.directory {
        config.directory = directory.clone();
    }
    if let Some(extension) = &cli.extension {
        config.extension = extension.clone();
    }
    if let Some(interval) = cli.interval {
        config.interval = interval;
    }
    if cli.log {
        config.log = true;
    }
    if cli.random {
        config.random = true;
    }
    if let Some(system) = &cli.system {
        config.system = system.clone();
    }
    if cli.terminal {
        config.terminal = true;
    }
    if let Some(temp_dir) = &cli.temp_dir {
        config.temp_dir = Some(temp_dir.clone());
    }

    config.validate()?;
    Ok(config)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

/// A custom command wins over `system`; "autodetect" probes the process
/// table; anything else must be a known environment name.
fn resolve_environment(config: &Config) -> Result<DesktopEnvironment> {
    if let Some(template) = &config.command {
        return Ok(DesktopEnvironment::Custom(template.clone()));
    }

    match config.system.as_str() {
        "autodetect" => Ok(environment::detect()),
        name => DesktopEnvironment::from_name(name),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e.user_friendly_message()))?;

    init_logging(config.log);
    log::info!("Starting queuewall...");

    let target = resolve_environment(&config).map_err(|e| {
        log::error!("{}", e.user_friendly_message());
        anyhow::anyhow!("{}", e.user_friendly_message())
    })?;
    log::info!("Target environment: {:?}", target);

    let executor = ProcessExecutor::new(target, config.caption, config.temp_dir.clone());

    // The sender stays alive in this scope so the scheduler's command source
    // closes only when the process does
    let (command_tx, command_rx) = mpsc::channel(16);
    let _reader = config
        .terminal
        .then(|| spawn_terminal_reader(command_tx.clone()));

    let reload_cli = cli.clone();
    let scheduler = Scheduler::new(config.to_schedule(), executor, SystemClock, command_rx)
        .with_config_reload(move || load_config(&reload_cli).map(|c| c.to_schedule()));

    scheduler
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e.user_friendly_message()))?;

    log::info!("queuewall stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use queuewall_common::{LinuxDesktop, ScheduleMode};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_cli_overrides_file_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "interval = 60\nextension = \"png\"\n").unwrap();

        let cli = Cli::parse_from([
            "queuewall",
            "--config",
            config_path.to_str().unwrap(),
            "-i",
            "15",
            "-t",
        ]);

        let config = load_config(&cli).unwrap();
        assert_eq!(config.interval, 15);
        assert!(config.terminal);
        // File values the CLI did not touch survive
        assert_eq!(config.extension, "png");
        assert_eq!(config.to_schedule().mode, ScheduleMode::FixedInterval(15));
    }

    #[test]
    fn test_cli_zero_interval_is_rejected() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        let cli = Cli::parse_from([
            "queuewall",
            "--config",
            config_path.to_str().unwrap(),
            "-i",
            "0",
        ]);

        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn test_named_system_resolves_without_detection() {
        let config = Config {
            system: "xfce4".to_string(),
            ..Config::default()
        };
        assert_eq!(
            resolve_environment(&config).unwrap(),
            DesktopEnvironment::Linux(LinuxDesktop::Xfce4)
        );
    }

    #[test]
    fn test_custom_command_wins_over_system() {
        let config = Config {
            system: "gnome".to_string(),
            command: Some("my-setter %s".to_string()),
            ..Config::default()
        };
        assert_eq!(
            resolve_environment(&config).unwrap(),
            DesktopEnvironment::Custom("my-setter %s".to_string())
        );
    }

    #[test]
    fn test_unknown_system_is_fatal() {
        let config = Config {
            system: "cde".to_string(),
            ..Config::default()
        };
        assert!(resolve_environment(&config).is_err());
    }
}
