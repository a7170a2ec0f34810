//! Calculator facade tying validation, evaluation, and history together,
//! plus its HTTP router.

pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use router::subsidy_router;
pub use service::{Assessment, Calculation, CalculatorError, SubsidyCalculator};
