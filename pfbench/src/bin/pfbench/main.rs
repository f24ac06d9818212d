//! Page-fault benchmark (`pfbench`)

// Modules
mod args;

// Imports
use {
	self::args::Args,
	anyhow::Context,
	clap::Parser,
	pfbench::{data, Config, ProcessSampler, Suite},
	pfbench_util::logger,
	std::{
		fs,
		io::{self, Write},
	},
};

fn main() -> Result<(), anyhow::Error> {
	// Get arguments
	let args = Args::parse();
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	// Read the config file, if any
	let config = match &args.config_file {
		Some(config_path) => {
			let config_file = fs::File::open(config_path).context("Unable to open config file")?;
			serde_json::from_reader::<_, Config>(config_file).context("Unable to parse config file")?
		},
		None => Config::default(),
	};
	tracing::debug!(?config, "Loaded config");

	let page_size = pfbench::page_size().context("Unable to get page size")?;
	let sizes = config.resolve_sizes(page_size).context("Unable to resolve buffer sizes")?;

	let stdout = io::stdout();
	let mut stdout = stdout.lock();
	writeln!(stdout, "System page size {page_size} bytes ({} KB)", page_size / pfbench::exercise::KIB)
		.context("Unable to write to stdout")?;

	// Run each suite, with the same sizes
	let mut sampler = ProcessSampler;
	let mut runs = Vec::with_capacity(config.runs.len());
	for label in &config.runs {
		let suite = Suite::new(label.as_str(), sizes.clone());
		let run = suite
			.run(&mut sampler, &mut stdout)
			.with_context(|| format!("Unable to run suite {label:?}"))?;
		runs.push(run);
	}
	stdout.flush().context("Unable to flush stdout")?;

	if let Some(output_path) = &args.output_file {
		let data = data::Data { page_size, runs };

		let output_file = fs::File::create(output_path).context("Unable to create output file")?;
		serde_json::to_writer_pretty(output_file, &data).context("Unable to write to output file")?;
		tracing::info!(?output_path, "Wrote measurements");
	}

	Ok(())
}
