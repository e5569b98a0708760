pub mod assessment;
pub mod coding;
pub mod interview;
pub mod profile;
