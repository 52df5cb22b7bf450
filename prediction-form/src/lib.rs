pub mod alert;
pub mod endpoint;
pub mod error;
pub mod form;
pub mod render;
pub mod schema;
pub mod state;

// Re-export commonly used types
pub use alert::{AlertSink, RecordingAlerts};
pub use endpoint::{
    DEFAULT_ENDPOINT, HttpPredictionEndpoint, PredictionEndpoint, PredictionResponse,
};
pub use error::{FormError, Result};
pub use form::{EditOutcome, FormStatus, PredictionForm, SubmitOutcome};
pub use render::{field_prompt, format_prediction, render_form, render_result};
pub use schema::{ErrorPolicy, FieldKind, FieldSpec, FormSchema, Rule, SelectOption};
pub use state::FormState;
