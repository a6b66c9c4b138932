//! Persistent bundle cache
//!
//! Provides content-addressed caching of bundle outputs keyed by a hash of
//! every input that can change the output. Entries are immutable once
//! written: a different input yields a different key, never an overwrite
//! with different content.
//!
//! # Layout
//!
//! | Path | Contents |
//! |------|----------|
//! | `<cacheRoot>/<appName>/` | Process-wide cache directory |
//! | `<cacheRoot>/<appName>/<hex>` | JSON `{"sourceCode", "sourceMap"?}` |
//!
//! There is no TTL and no eviction. `CacheStore::clear` is the only way
//! entries are removed.

pub mod dir;
pub mod key;
pub mod store;

pub use dir::resolve_cache_directory;
pub use key::{compute_key, CacheKey};
pub use store::CacheStore;
