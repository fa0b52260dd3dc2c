mod leaf_box;
mod leaf_class;
mod leaf_detection;
mod inference_device;
mod model_config;

pub use leaf_box::*;
pub use leaf_class::*;
pub use leaf_detection::*;
pub use inference_device::*;
pub use model_config::*;
