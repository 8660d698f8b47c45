use std::env;
use std::io::Write;
use std::process::{Command, Stdio};

use arboard::Clipboard;

pub trait ClipboardWriter: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), String>;
}

/// In-process clipboard owner. On X11 the selection lives only as long as this process unless a
/// clipboard manager takes it over.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArboardClipboard;

impl ClipboardWriter for ArboardClipboard {
    fn write_text(&self, text: &str) -> Result<(), String> {
        let mut clipboard = Clipboard::new().map_err(|err| err.to_string())?;
        clipboard
            .set_text(text.to_string())
            .map_err(|err| err.to_string())
    }
}

/// Pipes the text into `wl-copy`, which forks and keeps serving the selection after we exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct WlCopyClipboard;

impl ClipboardWriter for WlCopyClipboard {
    fn write_text(&self, text: &str) -> Result<(), String> {
        let mut child = Command::new("wl-copy")
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|err| format!("wl-copy: {err}"))?;

        child
            .stdin
            .take()
            .ok_or_else(|| "wl-copy stdin unavailable".to_string())?
            .write_all(text.as_bytes())
            .map_err(|err| format!("wl-copy: {err}"))?;

        let status = child.wait().map_err(|err| format!("wl-copy: {err}"))?;
        if status.success() {
            Ok(())
        } else {
            Err(format!("wl-copy exited with {status}"))
        }
    }
}

/// Tries `primary`, then `secondary`. When both fail the primary error is reported.
pub struct FallbackClipboard<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> FallbackClipboard<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P: ClipboardWriter, S: ClipboardWriter> ClipboardWriter for FallbackClipboard<P, S> {
    fn write_text(&self, text: &str) -> Result<(), String> {
        match self.primary.write_text(text) {
            Ok(()) => Ok(()),
            Err(primary_err) => {
                log::debug!("primary clipboard failed, falling back: {primary_err}");
                self.secondary.write_text(text).map_err(|_| primary_err)
            }
        }
    }
}

pub fn prefers_wl_copy() -> bool {
    cfg!(target_os = "linux")
        && (env::var_os("WAYLAND_DISPLAY").is_some()
            || env::var("XDG_SESSION_TYPE")
                .map(|value| value.eq_ignore_ascii_case("wayland"))
                .unwrap_or(false))
}

/// True when a copy made by a short-lived process is likely to vanish once it exits.
pub fn copy_needs_running_process() -> bool {
    cfg!(target_os = "linux") && !prefers_wl_copy() && env::var_os("DISPLAY").is_some()
}

pub fn system_clipboard() -> Box<dyn ClipboardWriter> {
    if prefers_wl_copy() {
        Box::new(FallbackClipboard::new(WlCopyClipboard, ArboardClipboard))
    } else {
        Box::new(ArboardClipboard)
    }
}
