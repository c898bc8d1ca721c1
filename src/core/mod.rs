pub mod collector;

pub use crate::domain::model::RegistrationStatus;
pub use crate::domain::ports::{ConfigProvider, PageFetcher};
pub use crate::utils::error::Result;
pub use collector::{build_target_url, RegistrationCollector, LABEL_NAMES, METRIC_HELP, METRIC_NAME};
