//! Source initializers
//!
//! A source turns the raw configuration into validated, connector-specific
//! settings. Initialization is where fatal configuration errors surface, so a
//! connector never opens a connection with settings that cannot work.

mod region;
mod s3;

pub use region::Region;
pub use s3::{DEFAULT_CONNECTION_TIMEOUT_SECS, S3Keys};
