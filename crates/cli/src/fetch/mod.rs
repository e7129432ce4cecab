//! Upstream collaborators: the card database feeds and the card-detail site.

pub(crate) mod common;
pub(crate) mod limitless;
pub(crate) mod pocketdb;
