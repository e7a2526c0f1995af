//! Bus adapters - Signal daemon and local console

pub mod console;
#[cfg(unix)]
pub mod signal;

pub use console::ConsoleAdapter;
#[cfg(unix)]
pub use signal::SignalAdapter;
