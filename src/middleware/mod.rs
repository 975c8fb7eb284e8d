pub mod rate_limit;
pub mod logging;

pub use rate_limit::*;
pub use logging::*;
