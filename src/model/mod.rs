pub mod model_metadata;
pub mod model_storage;
pub mod config;

pub use model_metadata::ModelMetadata;
pub use model_storage::{load_model, map_model_file, read_package, save_model_package, ModelSource, DEFAULT_MODEL_FILE};
pub use config::{ClassifierConfig, ModelSettings};
