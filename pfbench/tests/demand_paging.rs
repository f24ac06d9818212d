//! Demand paging with the real process counters.
//!
//! Page faults are counted for the whole process, so this file holds
//! a single test to avoid other test threads faulting in the middle of it.

// Imports
use pfbench::{exercise, ProcessSampler};

#[test]
fn fresh_buffer_faults_and_reused_buffer_does_not() {
	let page_size = pfbench::page_size().expect("Unable to get page size");
	let mut sampler = ProcessSampler;

	// Note: We use a large enough size that the allocator has to map new
	//       pages, instead of handing out memory it already touched.
	let size = 1024 * 1024;
	assert!(size >= page_size);

	let fresh = exercise::fresh_allocation(&mut sampler, size).expect("Unable to exercise fresh allocation");
	let fresh = fresh.exercise().expect("Unable to allocate fresh buffer");
	assert!(fresh.write.faults >= 1, "Fresh write didn't fault: {fresh:?}");
	assert_eq!(fresh.read.faults, 0, "Fresh read faulted: {fresh:?}");
	assert!(fresh.write_kib_per_fault() > 0.0);
	assert_eq!(
		fresh.write_kib_per_fault(),
		size as f64 / (fresh.write.faults as f64 * 1024.0)
	);

	let reused = exercise::reused_buffer(&mut sampler, size).expect("Unable to exercise reused buffer");
	let reused = reused.exercise().expect("Unable to allocate reused buffer");
	assert!(
		reused.write.faults <= fresh.write.faults,
		"Reused write faulted more than fresh write: {reused:?} / {fresh:?}"
	);
}
