//! Bounded termination of supervised children.
//!
//! Every child is the leader of its own process group, so signals go to the
//! whole group: `bun run` or `go run` wrappers take their grandchildren down
//! with them.

mod child;
#[cfg(unix)]
mod group;

pub use child::shutdown_child;
#[cfg(unix)]
pub use group::sweep_group;
