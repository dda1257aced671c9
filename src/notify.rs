use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    Granted,
    Denied,
    /// Not asked yet.
    #[default]
    Default,
}

/// Something that can show a reminder to the user.
pub trait Notifier {
    fn permission(&self) -> Permission;

    /// Ask for permission. Returns the resulting state.
    fn request_permission(&mut self) -> Permission;

    fn notify(&mut self, title: &str, body: &str);
}

/// Desktop notifications via `notify-send`.
///
/// Permission is granted once the tool turns out to be runnable.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    command: String,
    permission: Permission,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self::with_command("notify-send")
    }

    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            permission: Permission::Default,
        }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for DesktopNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&mut self) -> Permission {
        if self.permission != Permission::Default {
            return self.permission;
        }
        self.permission = match Command::new(&self.command).arg("--version").output() {
            Ok(out) if out.status.success() => Permission::Granted,
            Ok(out) => {
                log::warn!("{} exited with {}", self.command, out.status);
                Permission::Denied
            }
            Err(e) => {
                log::warn!("Desktop notifications unavailable ({}): {}", self.command, e);
                Permission::Denied
            }
        };
        self.permission
    }

    fn notify(&mut self, title: &str, body: &str) {
        let result = Command::new(&self.command)
            .args(["--app-name", "studyplan", title, body])
            .status();
        match result {
            Ok(status) if status.success() => {}
            Ok(status) => log::error!("{} exited with {}", self.command, status),
            Err(e) => log::error!("Failed to run {}: {}", self.command, e),
        }
    }
}

/// Writes reminders to the log. Always permitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&mut self) -> Permission {
        Permission::Granted
    }

    fn notify(&mut self, title: &str, body: &str) {
        log::info!("{}: {}", title, body);
    }
}

/// Records every notification; permission is scripted by the test.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    pub permission: Permission,
    /// State handed out by `request_permission` while undetermined.
    pub grant_on_request: bool,
    pub requests: usize,
    pub sent: Vec<(String, String)>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn granted() -> Self {
        Self {
            permission: Permission::Granted,
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&mut self) -> Permission {
        self.requests += 1;
        if self.permission == Permission::Default {
            self.permission = if self.grant_on_request {
                Permission::Granted
            } else {
                Permission::Denied
            };
        }
        self.permission
    }

    fn notify(&mut self, title: &str, body: &str) {
        self.sent.push((title.to_string(), body.to_string()));
    }
}
