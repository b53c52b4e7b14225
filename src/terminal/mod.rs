pub mod raw;
pub mod size;

pub use raw::RawModeGuard;
pub use size::{watch_resizes, SizeQueue, SizeSender, TerminalSize};
