//! Authentication module.

mod middleware;

pub use middleware::*;
