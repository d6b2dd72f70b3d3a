mod error;
pub mod invite;
pub mod password;
mod request;
pub mod session;

pub use error::*;
pub use request::*;
