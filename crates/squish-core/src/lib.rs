//! Shared plumbing for the squish minifiers
//!
//! The style, script and markup engines all protect regions of their input
//! behind opaque placeholder tokens while a series of regex passes rewrites
//! everything else. This crate owns the pieces they have in common:
//!
//! - [`Marker`]: a per-run prefix that cannot collide with the input
//! - [`PlaceholderTable`]: reserve content behind a token, restore it later
//! - [`try_replace_all`]: regex replacement with a fallible callback
//! - [`Limits`]: caller-supplied resource ceilings

mod limits;
mod marker;
mod placeholder;
mod replace;

pub use limits::{LimitExceeded, Limits};
pub use marker::Marker;
pub use placeholder::PlaceholderTable;
pub use replace::try_replace_all;
