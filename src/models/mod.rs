pub mod request;
pub mod response;
pub mod table;

pub use request::*;
pub use response::*;
pub use table::*;
