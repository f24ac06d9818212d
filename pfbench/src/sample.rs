//! Metric samplers
//!
//! Both counters are process-wide and cumulative since process start.
//! They are read with two separate system calls, so a [`Sample`] is not an
//! atomic snapshot, but they are always read in the same order (faults, then
//! cpu time) so that deltas between samples stay consistent.

// Imports
use {
	anyhow::Context,
	nix::{
		sys::resource::{self, UsageWho},
		time::{self, ClockId},
	},
};

/// Number of nanoseconds per millisecond
pub const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Number of nanoseconds per second
const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A sample of the process counters
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Sample {
	/// Cumulative page faults (major + minor)
	pub page_faults: u64,

	/// Cumulative cpu time (in nanoseconds)
	pub cpu_time_ns: u64,
}

impl Sample {
	/// Returns the measurement between `earlier` and this sample.
	///
	/// The counters never decrease, so if `earlier` is actually after
	/// this sample, the result saturates to `0`.
	#[must_use]
	pub fn delta_since(&self, earlier: &Self) -> Measurement {
		Measurement {
			faults:  self.page_faults.saturating_sub(earlier.page_faults),
			time_ns: self.cpu_time_ns.saturating_sub(earlier.cpu_time_ns),
		}
	}
}

/// Difference between two samples
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Measurement {
	/// Page faults
	pub faults: u64,

	/// Cpu time (in nanoseconds)
	pub time_ns: u64,
}

impl Measurement {
	/// Returns the cpu time, in milliseconds
	#[must_use]
	pub fn time_ms(&self) -> f64 {
		self::ns_to_ms(self.time_ns)
	}
}

/// Sampler
pub trait Sampler {
	/// Samples the counters
	fn sample(&mut self) -> Result<Sample, anyhow::Error>;
}

/// Sampler for the current process' counters
#[derive(Clone, Copy, Default, Debug)]
pub struct ProcessSampler;

impl Sampler for ProcessSampler {
	fn sample(&mut self) -> Result<Sample, anyhow::Error> {
		let page_faults = self::sample_page_faults()?;
		let cpu_time_ns = self::sample_cpu_time()?;

		Ok(Sample { page_faults, cpu_time_ns })
	}
}

/// Returns the cumulative page faults (major + minor) of this process
pub fn sample_page_faults() -> Result<u64, anyhow::Error> {
	let usage = resource::getrusage(UsageWho::RUSAGE_SELF).context("Unable to get resource usage")?;
	let faults = usage.major_page_faults() + usage.minor_page_faults();

	u64::try_from(faults).with_context(|| format!("Page fault count was negative: {faults}"))
}

/// Returns the cumulative cpu time of this process, in nanoseconds
pub fn sample_cpu_time() -> Result<u64, anyhow::Error> {
	let cpu_time = time::clock_gettime(ClockId::CLOCK_PROCESS_CPUTIME_ID).context("Unable to get process cpu time")?;
	let secs = u64::try_from(cpu_time.tv_sec()).context("Process cpu time seconds were negative")?;
	let nanos = u64::try_from(cpu_time.tv_nsec()).context("Process cpu time nanoseconds were negative")?;

	Ok(secs * NANOS_PER_SEC + nanos)
}

/// Converts nanoseconds to milliseconds
#[must_use]
pub fn ns_to_ms(ns: u64) -> f64 {
	ns as f64 / NANOS_PER_MILLI
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ns_to_ms_converts() {
		assert_eq!(ns_to_ms(0), 0.0);
		assert_eq!(ns_to_ms(1_000_000), 1.0);
		assert_eq!(ns_to_ms(2_500_000), 2.5);
	}

	#[test]
	fn delta_since() {
		let before = Sample {
			page_faults: 10,
			cpu_time_ns: 1_000,
		};
		let after = Sample {
			page_faults: 13,
			cpu_time_ns: 4_500,
		};

		assert_eq!(after.delta_since(&before), Measurement {
			faults:  3,
			time_ns: 3_500,
		});
	}

	#[test]
	fn delta_since_saturates_on_misordered_samples() {
		let before = Sample {
			page_faults: 13,
			cpu_time_ns: 4_500,
		};
		let after = Sample {
			page_faults: 10,
			cpu_time_ns: 1_000,
		};

		assert_eq!(after.delta_since(&before), Measurement::default());
	}

	#[test]
	fn process_counters_never_decrease() {
		let mut sampler = ProcessSampler;
		let first = sampler.sample().expect("Unable to sample");

		// Burn some cpu time
		let sum = (0..100_000u64).map(std::hint::black_box).sum::<u64>();
		std::hint::black_box(sum);

		let second = sampler.sample().expect("Unable to sample");
		assert!(second.page_faults >= first.page_faults);
		assert!(second.cpu_time_ns >= first.cpu_time_ns);
	}
}

/// Sampler that replays a fixed list of samples
#[cfg(test)]
#[derive(Clone, Debug)]
pub(crate) struct ScriptedSampler {
	/// Remaining samples
	samples: std::collections::VecDeque<Sample>,
}

#[cfg(test)]
impl ScriptedSampler {
	/// Creates a sampler from `(page_faults, cpu_time_ns)` pairs
	pub fn new(samples: impl IntoIterator<Item = (u64, u64)>) -> Self {
		Self {
			samples: samples
				.into_iter()
				.map(|(page_faults, cpu_time_ns)| Sample { page_faults, cpu_time_ns })
				.collect(),
		}
	}

	/// Returns the number of samples not yet taken
	pub fn remaining(&self) -> usize {
		self.samples.len()
	}
}

#[cfg(test)]
impl Sampler for ScriptedSampler {
	fn sample(&mut self) -> Result<Sample, anyhow::Error> {
		self.samples.pop_front().context("Scripted sampler ran out of samples")
	}
}
