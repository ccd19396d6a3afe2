//! Umbrella crate for the Odyssey admin map editor.
//!
//! Re-exports the engine and protocol crates so downstream code can depend on a
//! single crate name (`odyssey_admin`).

pub use odyssey_admin_engine as engine;
pub use odyssey_admin_protocol as protocol;
