//! Fetch Coalescing Module
//!
//! Single-flight access to the record source: concurrent misses for the
//! same key share one underlying fetch.

mod coalescer;

pub use coalescer::{FetchCoalescer, FetchOutcome};
