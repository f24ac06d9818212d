//! Arguments

// Imports
use std::path::PathBuf;

/// Arguments
#[derive(Debug)]
#[derive(clap::Parser)]
pub struct Args {
	/// Log file
	///
	/// Specifies a file to perform verbose logging to.
	/// You can use `RUST_LOG_FILE` to set filtering options
	#[clap(long = "log-file")]
	pub log_file: Option<PathBuf>,

	/// Whether to append to the log file
	#[clap(long = "log-file-append")]
	pub log_file_append: bool,

	/// Config file
	///
	/// Json file with the run labels and buffer sizes.
	/// Uses the default runs and sizes if not passed.
	#[clap(long = "config")]
	pub config_file: Option<PathBuf>,

	/// Output file
	///
	/// Json file to write all measurements to, in addition to stdout.
	#[clap(long = "output")]
	pub output_file: Option<PathBuf>,
}
