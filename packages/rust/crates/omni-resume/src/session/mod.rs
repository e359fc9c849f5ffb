//! Session namespace: persisted conversation items and the TTL-bound session store.

mod item;
mod redis_backend;
mod store;

pub use item::{ContentBlock, ItemContent, OUTPUT_TEXT_BLOCK_TYPE, Role, SessionItem};
pub use store::{
    DEFAULT_SESSION_KEY_PREFIX, DEFAULT_SESSION_TTL_SECS, SessionInfo, SessionStore,
    SessionStoreConfig,
};
