//! Shared project-config mutation
//!
//! Some script backends read build flags from a project config file that
//! other builds share. A build that needs different flags merges its
//! overrides into the file, runs, and puts the original bytes back. The
//! whole read → merge → write → build → restore sequence runs under a
//! per-path lock so concurrent builds never see each other's merged state.

pub mod guard;
pub mod merge;
pub mod overlay;

pub use guard::{ConfigLease, ConfigLockRegistry};
pub use merge::deep_merge;
pub use overlay::{with_overrides, ConfigOverlay};
