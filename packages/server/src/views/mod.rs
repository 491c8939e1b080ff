//! Read-side projections: records joined with the users and videos they
//! reference, shaped for responses.

pub mod channel;
pub mod owner;
pub mod pagination;
pub mod playlist;
pub mod posts;
pub mod video;
