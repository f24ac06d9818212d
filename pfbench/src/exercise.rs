//! Buffer exercisers
//!
//! Each exerciser writes then reads every byte of a buffer, sampling the
//! process counters around each pass:
//!
//! - [`fresh_allocation`] allocates the buffer inside the measured window, so
//!   the write pass faults in every page.
//! - [`reused_buffer`] allocates and writes the buffer before the measured
//!   window, so the measured passes only touch resident pages.

// Imports
use {
	crate::{
		sample::{Measurement, Sample, Sampler},
		Buffer,
	},
	anyhow::Context,
	std::fmt,
};

/// Number of bytes per KiB
pub const KIB: usize = 1024;

/// Exercise kind
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum ExerciseKind {
	/// Buffer allocated in the measured window
	Fresh,

	/// Buffer allocated and pre-touched before the measured window
	Reused,
}

impl fmt::Display for ExerciseKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Fresh => write!(f, "Fresh allocation"),
			Self::Reused => write!(f, "Reused buffer"),
		}
	}
}

/// A completed exercise
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Exercise {
	/// Kind
	pub kind: ExerciseKind,

	/// Buffer size (in bytes)
	pub size: usize,

	/// Write pass
	pub write: Measurement,

	/// Read pass
	pub read: Measurement,

	/// Both passes
	pub total: Measurement,

	/// Sum of all bytes read
	pub checksum: u64,
}

impl Exercise {
	/// Creates an exercise from the samples taken before the write pass,
	/// after the write pass and after the read pass.
	#[must_use]
	pub fn from_samples(
		kind: ExerciseKind,
		size: usize,
		start: &Sample,
		after_write: &Sample,
		after_read: &Sample,
		checksum: u64,
	) -> Self {
		Self {
			kind,
			size,
			write: after_write.delta_since(start),
			read: after_read.delta_since(after_write),
			total: after_read.delta_since(start),
			checksum,
		}
	}

	/// Returns the KiB written per page fault during the write pass.
	///
	/// Returns `0.0` if the write pass didn't fault.
	#[must_use]
	pub fn write_kib_per_fault(&self) -> f64 {
		match self.write.faults {
			0 => 0.0,
			faults => self.size as f64 / (faults as f64 * KIB as f64),
		}
	}

	/// Returns the total cpu time, in nanoseconds
	#[must_use]
	pub fn total_time_ns(&self) -> u64 {
		self.total.time_ns
	}
}

impl fmt::Display for Exercise {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self::fmt_header(f, self.kind, self.size)?;
		writeln!(
			f,
			"Write: {} page faults, {:.2} KB/fault, {:.3} ms",
			self.write.faults,
			self.write_kib_per_fault(),
			self.write.time_ms()
		)?;
		writeln!(f, "Read:  {} page faults, {:.3} ms", self.read.faults, self.read.time_ms())?;
		writeln!(f, "Total time: {:.3} ms", self.total.time_ms())
	}
}

/// Outcome of an exerciser
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ExerciseOutcome {
	/// Exercise completed
	Completed(Exercise),

	/// Unable to allocate the buffer
	AllocFailed { kind: ExerciseKind, size: usize },
}

impl ExerciseOutcome {
	/// Returns the total cpu time, in nanoseconds.
	///
	/// Returns `0` if the allocation failed, which can't be told apart
	/// from an exercise that took no time.
	#[must_use]
	pub fn total_time_ns(&self) -> u64 {
		match self {
			Self::Completed(exercise) => exercise.total_time_ns(),
			Self::AllocFailed { .. } => 0,
		}
	}

	/// Returns the exercise, if completed
	#[must_use]
	pub fn exercise(&self) -> Option<&Exercise> {
		match self {
			Self::Completed(exercise) => Some(exercise),
			Self::AllocFailed { .. } => None,
		}
	}
}

impl fmt::Display for ExerciseOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Completed(exercise) => fmt::Display::fmt(exercise, f),
			Self::AllocFailed { kind, size } => {
				self::fmt_header(f, *kind, *size)?;
				writeln!(f, "Allocation failed")
			},
		}
	}
}

/// Formats the header of an exercise
fn fmt_header(f: &mut fmt::Formatter<'_>, kind: ExerciseKind, size: usize) -> fmt::Result {
	writeln!(f)?;
	writeln!(f, "=== {kind} test ({} KB) ===", size / KIB)
}

/// Measures writing and reading a freshly allocated buffer of `size` bytes.
///
/// The buffer is allocated after the first sample, so the write pass
/// includes faulting in every page of the buffer.
pub fn fresh_allocation<S: Sampler>(sampler: &mut S, size: usize) -> Result<ExerciseOutcome, anyhow::Error> {
	let kind = ExerciseKind::Fresh;
	let start = sampler.sample().context("Unable to take starting sample")?;

	let Some(mut buffer) = Buffer::alloc(size) else {
		tracing::warn!(?kind, size, "Unable to allocate buffer");
		return Ok(ExerciseOutcome::AllocFailed { kind, size });
	};

	buffer.write_pattern(0);
	let after_write = sampler.sample().context("Unable to take sample after writing")?;

	let checksum = buffer.read_all().context("Buffer was not written")?;
	let after_read = sampler.sample().context("Unable to take sample after reading")?;

	drop(buffer);

	let exercise = Exercise::from_samples(kind, size, &start, &after_write, &after_read, checksum);
	tracing::debug!(?exercise, "Finished exercise");
	Ok(ExerciseOutcome::Completed(exercise))
}

/// Measures writing and reading an already resident buffer of `size` bytes.
///
/// The buffer is allocated and written before the first sample, so the measured
/// write pass only overwrites pages that are already mapped.
pub fn reused_buffer<S: Sampler>(sampler: &mut S, size: usize) -> Result<ExerciseOutcome, anyhow::Error> {
	let kind = ExerciseKind::Reused;
	let Some(mut buffer) = Buffer::alloc(size) else {
		tracing::warn!(?kind, size, "Unable to allocate buffer");
		return Ok(ExerciseOutcome::AllocFailed { kind, size });
	};

	// Map all pages before measuring
	buffer.write_pattern(0);

	let start = sampler.sample().context("Unable to take starting sample")?;

	// Note: The offset only changes the written values so the write isn't
	//       identical to the one before.
	buffer.write_pattern(1);
	let after_write = sampler.sample().context("Unable to take sample after writing")?;

	let checksum = buffer.read_all().context("Buffer was not written")?;
	let after_read = sampler.sample().context("Unable to take sample after reading")?;

	drop(buffer);

	let exercise = Exercise::from_samples(kind, size, &start, &after_write, &after_read, checksum);
	tracing::debug!(?exercise, "Finished exercise");
	Ok(ExerciseOutcome::Completed(exercise))
}
