// Camera domain — device discovery, exclusive ownership, and frame reads.

pub mod backend;
pub mod dummy;
pub mod error;
#[cfg(feature = "native")]
pub mod native;
pub mod source;
pub mod types;
