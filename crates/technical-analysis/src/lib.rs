pub mod aggregator;
pub mod alignment;
pub mod analyzer;
pub mod indicators;
pub mod momentum;
pub mod oscillator;
pub mod validator;
pub mod verdict;


pub use aggregator::*;
pub use alignment::*;
pub use analyzer::*;
pub use indicators::*;
pub use momentum::*;
pub use oscillator::*;
pub use validator::*;
pub use verdict::*;
