//! Resource loading: lifecycle state, cancellation, and byte fetching.
//!
//! A load moves through an explicit tagged lifecycle
//! (idle -> loading -> loaded/failed) driven by a pure transition function.
//! Cancellation is a first-class, benign outcome: an aborted load never
//! reports an error and never overwrites state.

pub mod cancel;
pub mod loader;
pub mod state;

pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use loader::{fetch_bytes, read_file, FetchError};
pub use state::{transition, LoadEvent, LoadState};
