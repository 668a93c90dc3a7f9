pub mod composite;
pub mod scorecard;

pub use composite::*;
pub use scorecard::*;
