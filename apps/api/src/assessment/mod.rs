//! Daily assessment: generation-backed question sets and MCQ scoring.

pub mod handlers;
pub mod scoring;
