pub mod submissions;

pub use submissions::{DisabledStore, PgSubmissionStore, SubmissionStore};
