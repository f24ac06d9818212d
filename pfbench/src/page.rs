//! Page size

// Imports
use {
	anyhow::Context,
	nix::unistd::{self, SysconfVar},
};

/// Returns the system's memory page size, in bytes
pub fn page_size() -> Result<usize, anyhow::Error> {
	let page_size = unistd::sysconf(SysconfVar::PAGE_SIZE)
		.context("Unable to query page size")?
		.context("Page size is indeterminate")?;

	usize::try_from(page_size).with_context(|| format!("Page size was not a valid size: {page_size}"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn page_size_is_a_power_of_two() {
		let page_size = page_size().expect("Unable to get page size");
		assert!(page_size.is_power_of_two(), "Page size {page_size} is not a power of two");
		assert!(page_size >= 1024);
	}
}
