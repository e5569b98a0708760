//! Coding practice: generated problems and model-judged submissions.

pub mod handlers;
