//! Buffer

// Imports
use std::{
	alloc::{self, Layout},
	hint,
	mem::MaybeUninit,
	ptr::{self, NonNull},
	slice,
};

/// A heap buffer whose pages are left untouched until written.
///
/// Allocated through the global allocator, without initializing
/// any memory, so the first write to each page may fault it in.
#[derive(Debug)]
pub struct Buffer {
	/// Pointer to the allocation
	ptr: NonNull<u8>,

	/// Layout of the allocation
	layout: Layout,

	/// Whether every byte has been written
	initialized: bool,
}

impl Buffer {
	/// Allocates a new buffer of `size` bytes.
	///
	/// Returns `None` if `size` is zero, too large to describe, or if the allocator
	/// was unable to satisfy the request.
	#[must_use]
	pub fn alloc(size: usize) -> Option<Self> {
		if size == 0 {
			return None;
		}

		let layout = Layout::array::<u8>(size).ok()?;

		// SAFETY: `layout` has a non-zero size.
		let ptr = unsafe { alloc::alloc(layout) };
		let ptr = NonNull::new(ptr)?;

		Some(Self {
			ptr,
			layout,
			initialized: false,
		})
	}

	/// Returns the size of this buffer, in bytes
	#[must_use]
	pub fn size(&self) -> usize {
		self.layout.size()
	}

	/// Returns whether every byte has been written
	#[must_use]
	pub fn is_initialized(&self) -> bool {
		self.initialized
	}

	/// Writes `(idx + offset) & 0xFF` to every byte, sequentially
	pub fn write_pattern(&mut self, offset: usize) {
		self.as_uninit_mut().touch_write(offset);
		self.initialized = true;
	}

	/// Reads every byte, sequentially, returning their sum.
	///
	/// Returns `None` if the buffer wasn't written yet.
	#[must_use]
	pub fn read_all(&self) -> Option<u64> {
		self.as_slice().map(|bytes| bytes.touch_read())
	}

	/// Returns the contents of this buffer, if it was written
	#[must_use]
	pub fn as_slice(&self) -> Option<&[u8]> {
		match self.initialized {
			// SAFETY: `ptr` is valid for `size` bytes and every byte was initialized.
			true => Some(unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.size()) }),
			false => None,
		}
	}

	/// Returns the possibly uninitialized contents of this buffer
	fn as_uninit_mut(&mut self) -> &mut [MaybeUninit<u8>] {
		// SAFETY: `ptr` is valid for `size` bytes and `MaybeUninit<u8>`
		//         may hold uninitialized memory.
		unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr().cast::<MaybeUninit<u8>>(), self.size()) }
	}
}

impl Drop for Buffer {
	fn drop(&mut self) {
		tracing::trace!(size = self.size(), "Releasing buffer");

		// SAFETY: `ptr` was allocated by the global allocator with `layout`.
		unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) };
	}
}

/// Extension trait to touch every byte of a possibly uninitialized slice
#[extend::ext(name = TouchWrite)]
pub impl [MaybeUninit<u8>] {
	/// Writes `(idx + offset) & 0xFF` to every byte
	fn touch_write(&mut self, offset: usize) {
		for (idx, byte) in self.iter_mut().enumerate() {
			let value = (idx.wrapping_add(offset) & 0xFF) as u8;

			// SAFETY: Target is valid for writes.
			// Note: We simply want to avoid the write being elided
			unsafe {
				ptr::write_volatile(byte.as_mut_ptr(), hint::black_box(value));
			}
		}
	}
}

/// Extension trait to read every byte of a slice
#[extend::ext(name = TouchRead)]
pub impl [u8] {
	/// Reads every byte, returning their sum
	fn touch_read(&self) -> u64 {
		self.iter().fold(0, |sum, byte| {
			// SAFETY: Target is valid for reads.
			// Note: We simply want to avoid the read being elided
			let value = unsafe { ptr::read_volatile(byte) };
			sum.wrapping_add(u64::from(hint::black_box(value)))
		})
	}
}
