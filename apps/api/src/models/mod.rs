pub mod application;
pub mod job;

pub use application::{ApplicationRecord, ApplicationRow, CandidateRow, NewApplication, ScorePatch};
pub use job::JobRow;
