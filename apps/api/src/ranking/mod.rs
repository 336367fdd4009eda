// Ranking: score every application for a job, persist, and order.

pub mod aggregator;
pub mod handlers;

pub use aggregator::{RankedResult, Ranker};
