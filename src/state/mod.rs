//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `SessionPhase`: Lifecycle of an extraction session (init, batching, done, timeout)
//! - `PageState`: Final outcome of each fetched catalog page

mod page_state;
mod session_phase;

// Re-export main types
pub use page_state::PageState;
pub use session_phase::SessionPhase;
