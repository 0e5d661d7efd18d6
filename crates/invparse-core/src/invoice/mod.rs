//! Invoice field extraction module.

pub mod lines;
mod parser;
pub mod postprocess;
pub mod rules;

pub use lines::LineCollection;
pub use parser::{ExtractionResult, InvoiceParser, RuleBasedParser};
pub use postprocess::reconcile;
