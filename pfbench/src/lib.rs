//! Page-fault benchmark (`pfbench`)
//!
//! Measures how much of the cost of touching memory comes from the kernel
//! lazily mapping pages in, by comparing a freshly allocated buffer against
//! one whose pages are already resident.

// Modules
pub mod buffer;
pub mod config;
pub mod data;
pub mod exercise;
pub mod page;
pub mod sample;
pub mod suite;

// Exports
pub use self::{
	buffer::Buffer,
	config::{Config, SizeSpec},
	exercise::{Exercise, ExerciseKind, ExerciseOutcome},
	page::page_size,
	sample::{ns_to_ms, Measurement, ProcessSampler, Sample, Sampler},
	suite::{Suite, Summary},
};
