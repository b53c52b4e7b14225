//! Terminal size tracking
//!
//! The remote TTY learns the local window size through a single-slot queue:
//! the initial size is parked in the slot before streaming starts and the
//! exec stream drains it into the transport. Window changes reported by
//! `SIGWINCH` go through the same slot.

use tokio::sync::mpsc;

/// Terminal size in character cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerminalSize {
    pub cols: u16,
    pub rows: u16,
}

impl TerminalSize {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// Size of the controlling terminal, or 0x0 when it cannot be queried
    pub fn current() -> Self {
        match crossterm::terminal::size() {
            Ok((cols, rows)) => Self { cols, rows },
            Err(e) => {
                tracing::debug!("Unable to query terminal size: {}", e);
                Self::default()
            }
        }
    }
}

impl From<TerminalSize> for kube::api::TerminalSize {
    fn from(size: TerminalSize) -> Self {
        kube::api::TerminalSize {
            width: size.cols,
            height: size.rows,
        }
    }
}

/// Producer half of a [`SizeQueue`]
#[derive(Debug, Clone)]
pub struct SizeSender(mpsc::Sender<TerminalSize>);

impl SizeSender {
    /// Wait for the slot to free up, then park `size` in it
    pub async fn send(&self, size: TerminalSize) -> bool {
        self.0.send(size).await.is_ok()
    }
}

/// Single-slot queue of terminal sizes
#[derive(Debug)]
pub struct SizeQueue {
    rx: mpsc::Receiver<TerminalSize>,
}

impl SizeQueue {
    /// Create a queue whose slot already holds `initial`
    pub fn with_initial(initial: TerminalSize) -> (SizeSender, Self) {
        let (tx, rx) = mpsc::channel(1);
        // The slot is empty, so this cannot fail.
        let _ = tx.try_send(initial);
        (SizeSender(tx), Self { rx })
    }

    /// Next size, or `None` once every sender has been dropped and the slot is empty
    pub async fn next(&mut self) -> Option<TerminalSize> {
        self.rx.recv().await
    }
}

/// Push local window changes into the queue until the receiver goes away
#[cfg(unix)]
pub fn watch_resizes(sender: SizeSender) -> std::io::Result<tokio::task::JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut winch = signal(SignalKind::window_change())?;
    Ok(tokio::spawn(async move {
        while winch.recv().await.is_some() {
            let size = TerminalSize::current();
            tracing::trace!(cols = size.cols, rows = size.rows, "Terminal resized");
            if !sender.send(size).await {
                break;
            }
        }
    }))
}

/// Window-change signals are Unix only; elsewhere the initial size stands
#[cfg(not(unix))]
pub fn watch_resizes(sender: SizeSender) -> std::io::Result<tokio::task::JoinHandle<()>> {
    drop(sender);
    Ok(tokio::spawn(async {}))
}
