//! Configuration options for adapter construction.
//!
//! [`CodecOptions`] is handed to [`Registry::new`](crate::Registry::new) and copied into
//! every compound adapter the registry builds, so it is fixed for the adapter's lifetime.
//!
//! ## Examples
//!
//! ```rust
//! use propcodec::{CodecOptions, ELEMENT_SIZE_ESTIMATE};
//!
//! // Decode binary arrays in batches of at most 64 elements.
//! let options = CodecOptions::new().with_chunk_budget(64 * ELEMENT_SIZE_ESTIMATE);
//! assert_eq!(options.batch_len(), 64);
//! ```

use crate::Value;

/// Default byte budget for one batch of a chunked binary read (64MB).
pub const DEFAULT_CHUNK_BUDGET: usize = 0x3FF_FFFF;

/// In-memory size of the largest decoded entry (a map key/value pair), used to turn the
/// byte budget into an element count.
pub const ELEMENT_SIZE_ESTIMATE: usize = std::mem::size_of::<(Value, Value)>();

/// Configuration options for the adapters built by a registry.
///
/// # Examples
///
/// ```rust
/// use propcodec::{CodecOptions, DEFAULT_CHUNK_BUDGET, ELEMENT_SIZE_ESTIMATE};
///
/// let options = CodecOptions::new();
/// assert!(options.batch_len() > 100_000);
/// assert!(options.batch_len() * ELEMENT_SIZE_ESTIMATE <= DEFAULT_CHUNK_BUDGET);
///
/// // A zero budget still makes progress one element at a time.
/// let tiny = CodecOptions::new().with_chunk_budget(0);
/// assert_eq!(tiny.batch_len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecOptions {
    pub chunk_budget: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptions {
            chunk_budget: DEFAULT_CHUNK_BUDGET,
        }
    }
}

impl CodecOptions {
    /// Creates default options (64MB chunk budget).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the byte budget of one batch when decoding binary arrays and collections.
    #[must_use]
    pub fn with_chunk_budget(mut self, bytes: usize) -> Self {
        self.chunk_budget = bytes;
        self
    }

    /// Maximum number of elements decoded (and allocated) per batch.
    #[must_use]
    pub fn batch_len(&self) -> usize {
        self.batch_len_for(ELEMENT_SIZE_ESTIMATE)
    }

    /// Batch length for entries occupying `entry_size` bytes each.
    ///
    /// Entries are never costed below [`ELEMENT_SIZE_ESTIMATE`].
    #[must_use]
    pub fn batch_len_for(&self, entry_size: usize) -> usize {
        (self.chunk_budget / entry_size.max(ELEMENT_SIZE_ESTIMATE)).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_batch_fits_budget() {
        let options = CodecOptions::default();
        let entry = std::mem::size_of::<(Value, Value)>();
        assert!(options.batch_len_for(entry) * entry <= DEFAULT_CHUNK_BUDGET);
        assert!(
            options.batch_len_for(std::mem::size_of::<Value>()) * std::mem::size_of::<Value>()
                <= DEFAULT_CHUNK_BUDGET
        );
    }

    #[test]
    fn test_large_entries_shrink_the_batch() {
        let options = CodecOptions::new().with_chunk_budget(1024 * ELEMENT_SIZE_ESTIMATE);
        assert_eq!(options.batch_len_for(1), 1024);
        assert_eq!(options.batch_len_for(4 * ELEMENT_SIZE_ESTIMATE), 256);
    }
}
