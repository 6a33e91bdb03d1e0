pub mod appliance;
pub mod types;

pub use appliance::*;
pub use types::*;
