//! Per-user progress totals and the derived skills analysis.

pub mod handlers;
pub mod stats;
