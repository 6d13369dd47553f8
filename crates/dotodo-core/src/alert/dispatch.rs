//! Best-effort alert delivery.
//!
//! The dispatcher tries the native notification channel first and falls
//! back to an in-app toast when permission is denied or delivery fails.
//! Nothing is retried and nothing is reported back to the alert engine.

use std::path::PathBuf;
use std::process::Command;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use super::{Alert, ALERT_TITLE};
use crate::error::NotifyError;

/// How long a toast stays visible by default.
pub const DEFAULT_TOAST_SECS: u64 = 4;

#[cfg(target_os = "macos")]
const NOTIFIER_PROGRAM: &str = "osascript";
#[cfg(not(target_os = "macos"))]
const NOTIFIER_PROGRAM: &str = "notify-send";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
}

/// A channel that can show a notification outside the app.
pub trait Notifier {
    /// Ask for permission. Implementations cache the answer.
    fn request_permission(&mut self) -> Permission;

    fn notify(&mut self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Desktop notifications through the platform notifier program.
///
/// Permission is resolved on the first request: it is granted when
/// notifications are enabled and the program is on `PATH`.
#[derive(Debug, Default)]
pub struct NativeNotifier {
    enabled: bool,
    permission: Option<Permission>,
    program: Option<PathBuf>,
}

impl NativeNotifier {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            permission: None,
            program: None,
        }
    }

    fn resolve_permission(&mut self) -> Permission {
        if !self.enabled {
            return Permission::Denied;
        }
        match which::which(NOTIFIER_PROGRAM) {
            Ok(path) => {
                debug!(program = %path.display(), "native notifier found");
                self.program = Some(path);
                Permission::Granted
            }
            Err(e) => {
                debug!("native notifier unavailable: {e}");
                Permission::Denied
            }
        }
    }

    fn command(program: &PathBuf, title: &str, body: &str) -> Command {
        let mut cmd = Command::new(program);
        if cfg!(target_os = "macos") {
            let script = format!(
                "display notification \"{}\" with title \"{}\"",
                escape_applescript(body),
                escape_applescript(title)
            );
            cmd.arg("-e").arg(script);
        } else {
            cmd.arg("--app-name=dotodo").arg(title).arg(body);
        }
        cmd
    }
}

impl Notifier for NativeNotifier {
    fn request_permission(&mut self) -> Permission {
        if let Some(permission) = self.permission {
            return permission;
        }
        let permission = self.resolve_permission();
        self.permission = Some(permission);
        permission
    }

    fn notify(&mut self, title: &str, body: &str) -> Result<(), NotifyError> {
        if self.request_permission() == Permission::Denied {
            return Err(NotifyError::PermissionDenied);
        }
        let program = self
            .program
            .as_ref()
            .ok_or_else(|| NotifyError::Unavailable(NOTIFIER_PROGRAM.to_string()))?;
        let output = Self::command(program, title, body)
            .output()
            .map_err(|e| NotifyError::DeliveryFailed(e.to_string()))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(NotifyError::DeliveryFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        }
    }
}

fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// An in-app transient notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub message: String,
    pub shown_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Toast {
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Toasts waiting to be auto-dismissed.
#[derive(Debug, Clone)]
pub struct ToastQueue {
    duration: Duration,
    toasts: Vec<Toast>,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(std::time::Duration::from_secs(DEFAULT_TOAST_SECS))
    }
}

impl ToastQueue {
    pub fn new(duration: std::time::Duration) -> Self {
        Self {
            duration: Duration::from_std(duration)
                .unwrap_or_else(|_| Duration::seconds(DEFAULT_TOAST_SECS as i64)),
            toasts: Vec::new(),
        }
    }

    pub fn show(&mut self, message: impl Into<String>, now: DateTime<Utc>) -> &Toast {
        let idx = self.toasts.len();
        self.toasts.push(Toast {
            message: message.into(),
            shown_at: now,
            expires_at: now + self.duration,
        });
        &self.toasts[idx]
    }

    /// Toasts still on screen at `now`.
    pub fn visible(&self, now: DateTime<Utc>) -> impl Iterator<Item = &Toast> {
        self.toasts.iter().filter(move |t| t.is_visible(now))
    }

    /// Remove expired toasts and return them.
    pub fn dismiss_expired(&mut self, now: DateTime<Utc>) -> Vec<Toast> {
        let (keep, expired) = std::mem::take(&mut self.toasts)
            .into_iter()
            .partition(|t| t.is_visible(now));
        self.toasts = keep;
        expired
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

/// Which channel an alert went out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
    Native,
    Toast,
}

/// Routes alerts to the native notifier, with toasts as the fallback.
pub struct Dispatcher {
    notifier: Box<dyn Notifier + Send>,
    toasts: ToastQueue,
}

impl Dispatcher {
    pub fn new(notifier: Box<dyn Notifier + Send>, toasts: ToastQueue) -> Self {
        Self { notifier, toasts }
    }

    /// Deliver one alert. Never fails; the worst case is a toast.
    pub fn dispatch(&mut self, alert: &Alert, now: DateTime<Utc>) -> Delivery {
        let body = alert.message();
        match self.notifier.request_permission() {
            Permission::Granted => match self.notifier.notify(ALERT_TITLE, &body) {
                Ok(()) => return Delivery::Native,
                Err(e) => warn!(task_id = %alert.task_id, "native notification failed: {e}"),
            },
            Permission::Denied => debug!("notification permission denied, using toast"),
        }
        self.toasts.show(body, now);
        Delivery::Toast
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut ToastQueue {
        &mut self.toasts
    }
}
