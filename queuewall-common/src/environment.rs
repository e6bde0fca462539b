use crate::error::{EnvironmentError, QueuewallError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinuxDesktop {
    Gnome,
    Xfce4,
    Lxde,
    /// No recognized session; fall back to feh
    Other,
}

/// Where the wallpaper gets applied. Resolved once at startup, either from
/// the `system` option or by process-table detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesktopEnvironment {
    Linux(LinuxDesktop),
    Windows,
    /// User-supplied command template, `%s` replaced with the image path
    Custom(String),
}

impl DesktopEnvironment {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "gnome" => Ok(DesktopEnvironment::Linux(LinuxDesktop::Gnome)),
            "xfce4" => Ok(DesktopEnvironment::Linux(LinuxDesktop::Xfce4)),
            "lxde" => Ok(DesktopEnvironment::Linux(LinuxDesktop::Lxde)),
            "other" => Ok(DesktopEnvironment::Linux(LinuxDesktop::Other)),
            "windows" => Ok(DesktopEnvironment::Windows),
            other => Err(QueuewallError::Environment(EnvironmentError::UnknownSystem {
                name: other.to_string(),
            })),
        }
    }

    /// The shell commands that apply a wallpaper in this environment, in
    /// order. The first `%s` in a template is replaced with the image path;
    /// templates without a placeholder run as-is.
    pub fn apply_commands(&self) -> Vec<String> {
        match self {
            DesktopEnvironment::Linux(LinuxDesktop::Gnome) => vec![
                "gconftool-2 --type str --set /desktop/gnome/background/picture_filename %s"
                    .to_string(),
            ],
            // Requires xfce >= 4.6.0 and assumes a single screen and monitor
            DesktopEnvironment::Linux(LinuxDesktop::Xfce4) => vec![
                "xfconf-query -c xfce4-desktop -p /backdrop/screen0/monitor0/image-path -s %s"
                    .to_string(),
            ],
            DesktopEnvironment::Linux(LinuxDesktop::Lxde) => {
                vec!["pcmanfm --set-wallpaper=%s".to_string()]
            }
            DesktopEnvironment::Linux(LinuxDesktop::Other) => {
                vec!["feh --bg-scale %s".to_string()]
            }
            DesktopEnvironment::Windows => vec![
                r#"REG ADD "HKCU\Control Panel\Desktop" /V Wallpaper /T REG_SZ /F /D "%s""#
                    .to_string(),
                // WallpaperStyle 2 stretches to fit
                r#"REG ADD "HKCU\Control Panel\Desktop" /V WallpaperStyle /T REG_SZ /F /D 2"#
                    .to_string(),
                // Tell the system to pick up the change immediately
                "RUNDLL32.EXE user32.dll, UpdatePerUserSystemParameters".to_string(),
            ],
            DesktopEnvironment::Custom(template) => vec![template.clone()],
        }
    }
}

/// Best-effort detection of the running desktop environment by looking for a
/// known session process. Invoked once at startup, never from the scheduler.
pub fn detect() -> DesktopEnvironment {
    #[cfg(windows)]
    {
        DesktopEnvironment::Windows
    }

    #[cfg(not(windows))]
    {
        const SESSION_PROCESSES: &[(&str, LinuxDesktop)] = &[
            ("gnome-session", LinuxDesktop::Gnome),
            ("xfce4-session", LinuxDesktop::Xfce4),
            ("lxsession", LinuxDesktop::Lxde),
        ];

        for (process, desktop) in SESSION_PROCESSES {
            if session_process_running(process) {
                log::info!("autodetected {:?} via {}", desktop, process);
                return DesktopEnvironment::Linux(*desktop);
            }
        }

        log::info!("no known session process found, falling back to feh");
        DesktopEnvironment::Linux(LinuxDesktop::Other)
    }
}

#[cfg(not(windows))]
fn session_process_running(name: &str) -> bool {
    use std::process::{Command, Stdio};

    let mut cmd = Command::new("pgrep");
    if let Ok(user) = std::env::var("USER") {
        cmd.args(["-u", &user]);
    }
    cmd.arg(name).stdout(Stdio::null()).stderr(Stdio::null());

    matches!(cmd.status(), Ok(status) if status.success())
}
