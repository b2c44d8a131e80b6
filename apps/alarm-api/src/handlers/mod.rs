pub mod alerts;
pub mod system;

pub use alerts::*;
pub use system::*;
