//! deck-search: debounced search over in-memory collections.
//!
//! - `Searchable` / `filter_items`: case-insensitive substring matching
//! - `Debouncer`: a single cancellable quiet-period timer on tokio
//! - `DebouncedFilter`: keystroke stream in, filtered view out

pub mod debounce;
pub mod debounced;
pub mod filter;

pub use debounce::Debouncer;
pub use debounced::{ApplyCallback, DebouncedFilter, FilterPhase};
pub use filter::{Searchable, filter_items, matches_term};

/// Quiet period used when the caller does not configure one.
pub const DEFAULT_QUIET_PERIOD_MS: u64 = 300;
