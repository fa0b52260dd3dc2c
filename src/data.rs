mod class_result;
mod pipeline_config;
mod prediction_summary;
mod status;
mod time_calc;

pub use class_result::{ClassResult, ResultSet};
pub use pipeline_config::PipelineConfig;
pub use prediction_summary::PredictionSummary;
pub use status::{status_of, Status};
pub use time_calc::TimeCalc;
