// Remote transformation service boundary — frame round trips and control
// commands.

pub mod control;
pub mod error;
pub mod transform;
