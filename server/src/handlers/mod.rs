//! Operations behind the HTTP routes.

mod friends;
mod ratings;
mod users;

pub use friends::*;
pub use ratings::*;
pub use users::*;
