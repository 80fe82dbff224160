//! Common utilities for the reflow engine.
//!
//! This crate provides shared infrastructure used by the layout crates:
//! - **Warning System** - deduplicated warnings routed through the `log` facade
//! - **Trace depth** - nesting counter used by `layout-trace` builds

pub mod trace;
pub mod warning;
