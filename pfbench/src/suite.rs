//! Suite runner

// Imports
use {
	crate::{
		data,
		exercise::{self, ExerciseOutcome, KIB},
		sample::{self, Sampler},
	},
	anyhow::Context,
	itertools::Itertools,
	std::{fmt, io},
};

/// A labeled run over a list of buffer sizes
#[derive(Clone, Debug)]
pub struct Suite {
	/// Label
	label: String,

	/// Buffer sizes (in bytes)
	sizes: Vec<usize>,
}

impl Suite {
	/// Creates a new suite
	pub fn new(label: impl Into<String>, sizes: Vec<usize>) -> Self {
		Self {
			label: label.into(),
			sizes,
		}
	}

	/// Returns the label of this suite
	#[must_use]
	pub fn label(&self) -> &str {
		&self.label
	}

	/// Returns the buffer sizes of this suite
	#[must_use]
	pub fn sizes(&self) -> &[usize] {
		&self.sizes
	}

	/// Runs every exerciser for each size, writing the report to `out`.
	///
	/// For each size, the fresh allocation exerciser always runs before
	/// the reused buffer exerciser.
	pub fn run<S: Sampler>(&self, sampler: &mut S, out: &mut impl io::Write) -> Result<data::RunData, anyhow::Error> {
		tracing::debug!(
			label = %self.label,
			sizes = %self.sizes.iter().join(", "),
			"Running suite"
		);

		writeln!(out).context("Unable to write report")?;
		writeln!(out, "==================== {} ====================", self.label).context("Unable to write report")?;

		let mut sizes = Vec::with_capacity(self.sizes.len());
		for &size in &self.sizes {
			let fresh = exercise::fresh_allocation(sampler, size)
				.with_context(|| format!("Unable to exercise fresh allocation of {size} bytes"))?;
			write!(out, "{fresh}").context("Unable to write report")?;

			let reused = exercise::reused_buffer(sampler, size)
				.with_context(|| format!("Unable to exercise reused buffer of {size} bytes"))?;
			write!(out, "{reused}").context("Unable to write report")?;

			let summary = Summary::new(size, &fresh, &reused);
			write!(out, "{summary}").context("Unable to write report")?;
			tracing::trace!(?summary, "Summarized size");

			sizes.push(data::SizeData {
				size,
				fresh: fresh.exercise().map(data::ExerciseData::from),
				reused: reused.exercise().map(data::ExerciseData::from),
				summary: data::SummaryData::from(&summary),
			});
		}

		Ok(data::RunData {
			label: self.label.clone(),
			sizes,
		})
	}
}

/// Summary comparing both exercisers for a single size
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Summary {
	/// Buffer size (in bytes)
	pub size: usize,

	/// Fresh allocation total time (in milliseconds)
	pub fresh_ms: f64,

	/// Reused buffer total time (in milliseconds)
	pub reused_ms: f64,
}

impl Summary {
	/// Creates a summary from the outcome of both exercisers.
	///
	/// A failed allocation counts as taking no time.
	#[must_use]
	pub fn new(size: usize, fresh: &ExerciseOutcome, reused: &ExerciseOutcome) -> Self {
		Self::from_times(size, fresh.total_time_ns(), reused.total_time_ns())
	}

	/// Creates a summary from the total time of both exercisers, in nanoseconds
	#[must_use]
	pub fn from_times(size: usize, fresh_ns: u64, reused_ns: u64) -> Self {
		Self {
			size,
			fresh_ms: sample::ns_to_ms(fresh_ns),
			reused_ms: sample::ns_to_ms(reused_ns),
		}
	}

	/// Returns the time saved by reusing the buffer, in milliseconds
	#[must_use]
	pub fn time_saved_ms(&self) -> f64 {
		self.fresh_ms - self.reused_ms
	}

	/// Returns how many times faster reusing the buffer was.
	///
	/// Returns `0.0` if the reused buffer took no time.
	#[must_use]
	pub fn speedup(&self) -> f64 {
		match self.reused_ms > 0.0 {
			true => self.fresh_ms / self.reused_ms,
			false => 0.0,
		}
	}
}

impl fmt::Display for Summary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f)?;
		writeln!(f, "--- Summary for {} KB ---", self.size / KIB)?;
		writeln!(f, "Time saved: {:.3} ms ({:.1}x speedup)", self.time_saved_ms(), self.speedup())?;
		writeln!(f)
	}
}

#[cfg(test)]
mod tests {
	use {super::*, crate::sample::ScriptedSampler};

	#[test]
	fn summary() {
		let summary = Summary::from_times(4096, 3_000_000, 1_000_000);
		assert_eq!(summary.fresh_ms, 3.0);
		assert_eq!(summary.reused_ms, 1.0);
		assert_eq!(summary.time_saved_ms(), 2.0);
		assert_eq!(summary.speedup(), 3.0);
	}

	#[test]
	fn speedup_is_zero_when_reused_took_no_time() {
		let summary = Summary::from_times(4096, 3_000_000, 0);
		assert_eq!(summary.speedup(), 0.0);
		assert!(summary.speedup().is_finite());
		assert_eq!(summary.to_string(), "\n--- Summary for 4 KB ---\nTime saved: 3.000 ms (0.0x speedup)\n\n");
	}

	#[test]
	fn run_exercises_fresh_then_reused() {
		let mut sampler = ScriptedSampler::new([
			// Fresh
			(0, 0),
			(1, 4_000_000),
			(1, 5_000_000),
			// Reused
			(1, 5_000_000),
			(1, 6_000_000),
			(1, 7_000_000),
		]);
		let suite = Suite::new("First Run", vec![4096]);

		let mut out = vec![];
		let run = suite.run(&mut sampler, &mut out).expect("Unable to run suite");
		assert_eq!(sampler.remaining(), 0);

		let out = String::from_utf8(out).expect("Report wasn't utf-8");
		let fresh_idx = out.find("=== Fresh allocation test (4 KB) ===").expect("Missing fresh header");
		let reused_idx = out.find("=== Reused buffer test (4 KB) ===").expect("Missing reused header");
		let summary_idx = out.find("--- Summary for 4 KB ---").expect("Missing summary");
		assert!(out.starts_with("\n==================== First Run ====================\n"));
		assert!(fresh_idx < reused_idx && reused_idx < summary_idx);
		assert!(out.contains("Time saved: 3.000 ms (2.5x speedup)"));

		assert_eq!(run.label, "First Run");
		assert_eq!(run.sizes.len(), 1);
		assert_eq!(run.sizes[0].summary.speedup, 2.5);
		assert_eq!(run.sizes[0].fresh.as_ref().map(|fresh| fresh.write.faults), Some(1));
	}

	#[test]
	fn run_continues_after_allocation_failure() {
		let mut sampler = ScriptedSampler::new([(0, 0)]);
		let suite = Suite::new("Huge", vec![isize::MAX as usize]);

		let mut out = vec![];
		let run = suite.run(&mut sampler, &mut out).expect("Unable to run suite");

		let out = String::from_utf8(out).expect("Report wasn't utf-8");
		assert_eq!(out.matches("Allocation failed").count(), 2);
		assert!(out.contains("Time saved: 0.000 ms (0.0x speedup)"));
		assert!(run.sizes[0].fresh.is_none());
		assert!(run.sizes[0].reused.is_none());
	}
}
