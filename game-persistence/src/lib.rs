pub mod connection;
pub mod entities;
pub mod repositories;
pub mod source;

pub use connection::*;
pub use repositories::*;
pub use source::*;
