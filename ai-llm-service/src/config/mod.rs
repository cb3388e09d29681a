pub mod completion_config;
pub mod default_config;
pub mod model_catalog;
