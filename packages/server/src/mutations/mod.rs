//! Write-side operations that keep related records consistent.

pub mod cascade;
pub mod owned;
pub mod toggle;
pub mod watch;
