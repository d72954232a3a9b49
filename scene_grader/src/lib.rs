//! Grading of scene-simulation assignments.
//!
//! A submission is copied next to the assignment's starter code, built, and run against every
//! scene of the assignment's asset directories. An oracle judges each run; the results are shown
//! to the student and, once confirmed, stored with the submission.

pub mod admin;
pub mod config;
pub mod creative;
pub mod discovery;
pub mod error;
pub mod grader;
pub mod input;
pub mod interchange;
pub mod logger;
pub mod report;
pub mod scratch;
pub mod store;
pub mod submit;

mod utils;

pub use config::Config;
pub use error::{GraderError, Result};
pub use grader::score::Score;
pub use grader::{Grader, GradingReport};
pub use submit::{SubmissionOutcome, Submitter};
