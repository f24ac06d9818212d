//! Logger
//!
//! Logs to stderr, filtered by `RUST_LOG`, and optionally to a file,
//! filtered by `RUST_LOG_FILE`.

// Imports
use {
	std::{fs, io, path::Path, sync::Mutex},
	tracing::{level_filters::LevelFilter, Level},
	tracing_subscriber::{fmt, prelude::*, EnvFilter},
};

/// Logging before the logger is initialized.
///
/// Messages are buffered and emitted once [`init`](super::init) is called.
pub mod pre_init {
	// Imports
	use {std::sync::Mutex, tracing::Level};

	/// All buffered messages
	static MESSAGES: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());

	/// Buffers a message at `level`
	pub fn log(level: Level, msg: impl Into<String>) {
		// Note: A poisoned lock only means some other thread panicked while pushing,
		//       the messages themselves are still fine.
		let mut messages = MESSAGES.lock().unwrap_or_else(|err| err.into_inner());
		messages.push((level, msg.into()));
	}

	/// Buffers a trace message
	pub fn trace(msg: impl Into<String>) {
		self::log(Level::TRACE, msg);
	}

	/// Buffers a debug message
	pub fn debug(msg: impl Into<String>) {
		self::log(Level::DEBUG, msg);
	}

	/// Buffers a warning message
	pub fn warn(msg: impl Into<String>) {
		self::log(Level::WARN, msg);
	}

	/// Takes all buffered messages
	pub(super) fn take() -> Vec<(Level, String)> {
		let mut messages = MESSAGES.lock().unwrap_or_else(|err| err.into_inner());
		std::mem::take(&mut *messages)
	}
}

/// Initializes the logger.
///
/// If `log_file` is specified, logs will also be written to it, either
/// appending or truncating, depending on `log_file_append`.
///
/// # Panics
/// Panics if a global subscriber was already set.
pub fn init(log_file: Option<&Path>, log_file_append: bool) {
	let stderr_layer = fmt::layer()
		.with_writer(io::stderr)
		.with_filter(self::env_filter("RUST_LOG", LevelFilter::INFO));

	let file_layer = log_file.and_then(|log_file| match self::open_log_file(log_file, log_file_append) {
		Ok(file) => Some(
			fmt::layer()
				.with_ansi(false)
				.with_writer(Mutex::new(file))
				.with_filter(self::env_filter("RUST_LOG_FILE", LevelFilter::DEBUG)),
		),
		Err(err) => {
			pre_init::warn(format!("Unable to open log file {log_file:?}: {err}"));
			None
		},
	});

	tracing_subscriber::registry().with(stderr_layer).with(file_layer).init();

	// Then flush everything logged before we were initialized
	for (level, msg) in pre_init::take() {
		match level {
			Level::TRACE => tracing::trace!("{msg}"),
			Level::DEBUG => tracing::debug!("{msg}"),
			Level::INFO => tracing::info!("{msg}"),
			Level::WARN => tracing::warn!("{msg}"),
			_ => tracing::error!("{msg}"),
		}
	}
}

/// Creates an env filter from `env_var`, defaulting to `default`
fn env_filter(env_var: &str, default: LevelFilter) -> EnvFilter {
	EnvFilter::builder()
		.with_default_directive(default.into())
		.with_env_var(env_var)
		.from_env_lossy()
}

/// Opens the log file
fn open_log_file(path: &Path, append: bool) -> Result<fs::File, io::Error> {
	let mut options = fs::File::options();
	options.create(true);
	match append {
		true => options.append(true),
		false => options.write(true).truncate(true),
	};

	options.open(path)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pre_init_messages_are_taken_once() {
		pre_init::debug("first");
		pre_init::warn(String::from("second"));

		let messages = pre_init::take();
		assert!(messages.contains(&(Level::DEBUG, "first".to_owned())));
		assert!(messages.contains(&(Level::WARN, "second".to_owned())));
		assert!(pre_init::take().is_empty());
	}
}
