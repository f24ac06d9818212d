//! Output data

// Imports
use crate::{
	exercise::{Exercise, ExerciseKind},
	sample::Measurement,
	suite::Summary,
};

/// Output data
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Data {
	/// Page size (in bytes)
	pub page_size: usize,

	/// All runs, in order
	pub runs: Vec<RunData>,
}

/// Run output data
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct RunData {
	pub label: String,
	pub sizes: Vec<SizeData>,
}

/// Output data for a single buffer size
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct SizeData {
	pub size:    usize,
	pub fresh:   Option<ExerciseData>,
	pub reused:  Option<ExerciseData>,
	pub summary: SummaryData,
}

/// Exercise output data.
///
/// Only present for exercises that were able to allocate their buffer.
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ExerciseData {
	pub kind:                ExerciseKind,
	pub write:               Measurement,
	pub read:                Measurement,
	pub total:               Measurement,
	pub write_kib_per_fault: f64,
}

impl From<&Exercise> for ExerciseData {
	fn from(exercise: &Exercise) -> Self {
		Self {
			kind:                exercise.kind,
			write:               exercise.write,
			read:                exercise.read,
			total:               exercise.total,
			write_kib_per_fault: exercise.write_kib_per_fault(),
		}
	}
}

/// Summary output data
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct SummaryData {
	pub fresh_ms:      f64,
	pub reused_ms:     f64,
	pub time_saved_ms: f64,
	pub speedup:       f64,
}

impl From<&Summary> for SummaryData {
	fn from(summary: &Summary) -> Self {
		Self {
			fresh_ms:      summary.fresh_ms,
			reused_ms:     summary.reused_ms,
			time_saved_ms: summary.time_saved_ms(),
			speedup:       summary.speedup(),
		}
	}
}
