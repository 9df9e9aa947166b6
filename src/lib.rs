//! Medicare delay check: Part B and Part D enrollment-timing questionnaires.

pub mod batch;
pub mod channels;
pub mod config;
pub mod engine;
pub mod error;
pub mod report;
pub mod wizard;
