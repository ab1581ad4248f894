//! Search backend module
//!
//! Defines the SearchBackend trait, the named backend variants and a registry
//! callers select backends from. Network implementations live outside this
//! crate and plug in through the trait or [`FnBackend`].

mod profile;
mod registry;
mod traits;

pub use profile::*;
pub use registry::BackendRegistry;
pub use traits::*;
