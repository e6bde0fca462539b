use std::path::{Path, PathBuf};
use std::process::Command;

use crate::environment::DesktopEnvironment;
use crate::error::{ErrorReporting, ProcessError, QueuewallError, Result};

/// The side effect of a change cycle. Synchronous and blocking from the
/// scheduler's point of view: the scheduler does not re-arm until this
/// returns.
pub trait ChangeAction: Send {
    fn change_wallpaper(&self, path: &Path) -> Result<()>;
}

/// Applies a wallpaper by running the environment's command sequence through
/// the shell, optionally captioning the image first.
pub struct ProcessExecutor {
    environment: DesktopEnvironment,
    caption: bool,
    temp_dir: PathBuf,
}

impl ProcessExecutor {
    pub fn new(environment: DesktopEnvironment, caption: bool, temp_dir: Option<PathBuf>) -> Self {
        Self {
            environment,
            caption,
            temp_dir: temp_dir.unwrap_or_else(std::env::temp_dir),
        }
    }

    /// Composite the image's name onto a copy in the temp directory using
    /// ImageMagick. The original file is never touched.
    fn caption_image(&self, path: &Path) -> Result<PathBuf> {
        let convert = which::which("convert").map_err(|_| {
            QueuewallError::Process(ProcessError::BinaryNotFound {
                binary: "convert".to_string(),
            })
        })?;

        let caption = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("wallpaper");
        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("jpg");
        let output_path = self.temp_dir.join(format!("queuewall-caption.{}", extension));

        let output = Command::new(&convert)
            .arg(path)
            .args([
                "-gravity",
                "South",
                "-pointsize",
                "48",
                "-fill",
                "white",
                "-undercolor",
                "#00000080",
                "-annotate",
                "+0+24",
            ])
            .arg(caption)
            .arg(&output_path)
            .output()
            .map_err(|e| {
                QueuewallError::Process(ProcessError::Execution {
                    command: format!("convert {:?}", path),
                    source: e,
                })
            })?;

        if !output.status.success() {
            return Err(QueuewallError::Process(ProcessError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            }));
        }

        Ok(output_path)
    }

    /// Windows only accepts BMP wallpapers; anything else goes through djpeg
    /// into the temp directory first.
    fn prepare_for_environment(&self, path: &Path) -> Result<PathBuf> {
        if !matches!(self.environment, DesktopEnvironment::Windows) {
            return Ok(path.to_path_buf());
        }

        let is_bmp = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("bmp"));
        if is_bmp {
            return Ok(path.to_path_buf());
        }

        let bmp_path = self.temp_dir.join("queuewall.bmp");
        let output = Command::new("djpeg")
            .arg("-bmp")
            .arg("-outfile")
            .arg(&bmp_path)
            .arg(path)
            .output()
            .map_err(|e| {
                QueuewallError::Process(ProcessError::Execution {
                    command: format!("djpeg -bmp {:?}", path),
                    source: e,
                })
            })?;

        if !output.status.success() {
            return Err(QueuewallError::Process(ProcessError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            }));
        }

        Ok(bmp_path)
    }
}

impl ChangeAction for ProcessExecutor {
    fn change_wallpaper(&self, path: &Path) -> Result<()> {
        let path = if self.caption {
            match self.caption_image(path) {
                Ok(captioned) => captioned,
                Err(e) => {
                    log::warn!(
                        "Captioning failed, using original image: {}",
                        e.user_friendly_message()
                    );
                    path.to_path_buf()
                }
            }
        } else {
            path.to_path_buf()
        };

        let path = self.prepare_for_environment(&path)?;

        for template in self.environment.apply_commands() {
            run_shell(&substitute_path(&template, &path))?;
        }

        log::info!("Setting wallpaper: {:?}", path);
        Ok(())
    }
}

/// Replace the first `%s` in the template with the image path. Templates
/// without a placeholder (refresh-style commands) run unchanged.
fn substitute_path(template: &str, path: &Path) -> String {
    template.replacen("%s", &path.to_string_lossy(), 1)
}

fn run_shell(command: &str) -> Result<()> {
    log::debug!("Running: {}", command);

    #[cfg(windows)]
    let output = Command::new("cmd").args(["/C", command]).output();
    #[cfg(not(windows))]
    let output = Command::new("sh").args(["-c", command]).output();

    let output = output.map_err(|e| {
        QueuewallError::Process(ProcessError::Execution {
            command: command.to_string(),
            source: e,
        })
    })?;

    if !output.status.success() {
        return Err(QueuewallError::Process(ProcessError::NonZeroExit {
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }));
    }

    Ok(())
}
