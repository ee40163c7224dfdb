//! Background job scheduling.

mod tokio_registration_scheduler;

pub use tokio_registration_scheduler::{RetryPolicy, TokioRegistrationScheduler};
