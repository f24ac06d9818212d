//! Configuration

// Imports
use anyhow::Context;

/// Configuration
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
	/// Labels of each run.
	///
	/// Every run goes through all sizes, in order.
	pub runs: Vec<String>,

	/// Buffer sizes
	pub sizes: Vec<SizeSpec>,
}

impl Config {
	/// Resolves all buffer sizes to bytes, given the page size
	pub fn resolve_sizes(&self, page_size: usize) -> Result<Vec<usize>, anyhow::Error> {
		self.sizes
			.iter()
			.map(|size| {
				size.resolve(page_size)
					.with_context(|| format!("Unable to resolve buffer size {size:?}"))
			})
			.collect()
	}
}

impl Default for Config {
	fn default() -> Self {
		Self {
			runs:  vec!["First Run".to_owned(), "Second Run".to_owned()],
			// Note: The last size is deliberately a byte count, not a page count.
			//       It is only 256 pages when the page size is 4 KiB.
			sizes: vec![
				SizeSpec::Pages(1),
				SizeSpec::Pages(4),
				SizeSpec::Pages(64),
				SizeSpec::Bytes(1024 * 1024),
			],
		}
	}
}

/// Buffer size
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeSpec {
	/// Multiple of the page size
	Pages(usize),

	/// Exact byte count, not necessarily page-aligned
	Bytes(usize),
}

impl SizeSpec {
	/// Resolves this size to bytes, given the page size
	pub fn resolve(&self, page_size: usize) -> Result<usize, anyhow::Error> {
		let size = match *self {
			Self::Pages(pages) => pages
				.checked_mul(page_size)
				.with_context(|| format!("{pages} pages of {page_size} bytes overflows"))?,
			Self::Bytes(bytes) => bytes,
		};
		anyhow::ensure!(size > 0, "Buffer size must not be zero");

		Ok(size)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_sizes() {
		let config = Config::default();
		assert_eq!(config.runs, ["First Run", "Second Run"]);
		assert_eq!(config.resolve_sizes(4096).expect("Unable to resolve sizes"), [
			4096,
			4 * 4096,
			64 * 4096,
			1024 * 1024
		]);
	}

	#[test]
	fn last_default_size_is_not_scaled_by_page_size() {
		let sizes = Config::default().resolve_sizes(16384).expect("Unable to resolve sizes");
		assert_eq!(sizes, [16384, 4 * 16384, 64 * 16384, 1024 * 1024]);
	}

	#[test]
	fn zero_and_overflowing_sizes_are_rejected() {
		assert!(SizeSpec::Pages(0).resolve(4096).is_err());
		assert!(SizeSpec::Bytes(0).resolve(4096).is_err());
		assert!(SizeSpec::Pages(usize::MAX).resolve(4096).is_err());
	}

	#[test]
	fn parse() {
		let config = serde_json::from_str::<Config>(r#"{ "sizes": [{ "pages": 2 }, { "bytes": 1000 }] }"#)
			.expect("Unable to parse config");

		assert_eq!(config.runs, Config::default().runs);
		assert_eq!(config.sizes, [SizeSpec::Pages(2), SizeSpec::Bytes(1000)]);
		assert_eq!(config.resolve_sizes(4096).expect("Unable to resolve sizes"), [8192, 1000]);
	}

	#[test]
	fn parse_rejects_unknown_size_kind() {
		assert!(serde_json::from_str::<Config>(r#"{ "sizes": [{ "kib": 4 }] }"#).is_err());
	}
}
