//! Eligibility and subsidy amount engine for the IVF financial-assistance
//! program, with its calculation history and HTTP surface.

pub mod calculator;
pub mod config;
pub mod error;
pub mod history;
pub mod subsidy;
pub mod telemetry;
