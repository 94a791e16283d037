pub mod decoder;
pub mod etl;
pub mod recorder;
pub mod sync_client;
pub mod transform;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::domain::model::Record;
pub use crate::domain::ports::{ConfigProvider, ContactClient, OutcomeRecorder, Storage};
pub use crate::utils::error::Result;
