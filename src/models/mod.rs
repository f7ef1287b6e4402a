mod purchase;
mod user;

pub use purchase::*;
pub use user::*;
