//! Detection: the rule detector (C1), semantic detector (C2), and their
//! aggregator (C3).

pub mod aggregator;
pub mod rules;
pub mod semantic;

pub use aggregator::detect;
