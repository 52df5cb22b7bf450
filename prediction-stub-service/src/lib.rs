pub mod features;
pub mod service;

pub use features::{FeatureError, HousingFeatures};
pub use service::{AppState, create_app};
