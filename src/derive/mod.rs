//! Pure transformations from raw cluster objects to dashboard facts.
//!
//! Nothing in here performs I/O. Functions that depend on the current time
//! take it as an argument.

pub mod events;
pub mod health;
pub mod images;
pub mod relations;
pub mod resources;

pub use health::{Health, pod_health};
