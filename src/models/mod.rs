pub mod envelope;
pub mod ticket;
pub mod user;

pub use envelope::*;
pub use ticket::*;
pub use user::*;
