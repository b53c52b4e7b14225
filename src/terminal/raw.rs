use crossterm::terminal::{disable_raw_mode, enable_raw_mode, is_raw_mode_enabled};

/// Keeps the local terminal in raw mode for as long as it is alive
///
/// Raw mode stops the local line discipline from echoing characters the
/// remote TTY will echo again. The previous mode is restored on drop.
#[derive(Debug)]
pub struct RawModeGuard {
    was_raw: bool,
}

impl RawModeGuard {
    pub fn enable() -> std::io::Result<Self> {
        let was_raw = is_raw_mode_enabled()?;
        if !was_raw {
            enable_raw_mode()?;
        }
        Ok(Self { was_raw })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.was_raw {
            return;
        }
        if let Err(e) = disable_raw_mode() {
            tracing::error!("Failed to restore terminal mode: {}", e);
        }
    }
}
