//! Structured-log event ids shared by store, fetcher and reconstruction paths.

mod session_events;

pub use session_events::SessionEvent;
