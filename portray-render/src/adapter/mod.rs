//! Document shaping for top-level output: root-key wrapping and
//! side-loaded flattening. Applies once per render, never inside the
//! recursive engine.

mod root;
mod sideload;

pub(crate) use root::root_key;
pub(crate) use sideload::flatten_into;
