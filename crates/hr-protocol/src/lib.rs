pub mod messages;
pub mod route;
pub mod tools;

pub use messages::*;
pub use route::*;
pub use tools::*;
