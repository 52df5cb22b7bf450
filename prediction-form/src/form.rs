//! `PredictionForm` – one form component driven by a [`FormSchema`].
//!
//! The form owns the current [`FormState`] snapshot and the last stored
//! prediction. Edits swap in a new snapshot; [`PredictionForm::submit`] runs
//! the submit pipeline:
//!
//! 1. required-field check (nothing is sent if a required field is empty)
//! 2. non-negative check (a negative value raises an alert and aborts)
//! 3. one POST of the snapshot to the endpoint
//! 4. the response is applied according to the schema's [`ErrorPolicy`]
//!
//! Transport failures are logged and otherwise swallowed. The handle is
//! `Clone`, so overlapping submissions are possible; whichever response
//! arrives last is the one left on screen.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::{
    alert::AlertSink,
    endpoint::{PredictionEndpoint, PredictionResponse},
    error::Result,
    schema::{ErrorPolicy, FieldKind, FormSchema, Rule},
    state::FormState,
};

/// Result of a single field edit
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// The new value is now in the state
    Applied,
    /// The value was refused and the state is unchanged
    Refused(String),
}

/// Result of a submission attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A price was received and stored
    Predicted(f64),
    /// The response carried neither a usable price nor a handled error
    NoPrediction,
    /// Required fields were empty; nothing was sent
    MissingRequired(Vec<String>),
    /// A field failed validation; an alert was raised and nothing was sent
    Rejected(String),
    /// The endpoint reported an error, which was alerted
    EndpointError(String),
    /// The request failed in transit or returned an unreadable body
    TransportFailed,
}

/// Where the form is in its submit cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    Idle,
    Submitting,
    Succeeded,
    TransportFailed,
}

#[derive(Debug)]
struct FormInner {
    state: FormState,
    prediction: Option<f64>,
    status: FormStatus,
}

#[derive(Clone)]
pub struct PredictionForm {
    schema: Arc<FormSchema>,
    endpoint: Arc<dyn PredictionEndpoint>,
    alerts: Arc<dyn AlertSink>,
    inner: Arc<Mutex<FormInner>>,
}

impl PredictionForm {
    pub fn new(
        schema: FormSchema,
        endpoint: Arc<dyn PredictionEndpoint>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        let state = FormState::empty(&schema);
        Self {
            schema: Arc::new(schema),
            endpoint,
            alerts,
            inner: Arc::new(Mutex::new(FormInner {
                state,
                prediction: None,
                status: FormStatus::Idle,
            })),
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn state(&self) -> FormState {
        self.lock().state.clone()
    }

    pub fn prediction(&self) -> Option<f64> {
        self.lock().prediction
    }

    pub fn status(&self) -> FormStatus {
        self.lock().status
    }

    /// Replace one field's value.
    ///
    /// Negative numbers are refused on fields carrying [`Rule::NonNegative`],
    /// as are select values outside the option list.
    pub fn edit(&self, name: &str, value: &str) -> Result<EditOutcome> {
        let mut inner = self.lock();
        // Validates the name before any rule is looked at.
        let next = inner.state.with_value(name, value)?;

        if let Some(field) = self.schema.field(name) {
            if field.has_rule(Rule::NonNegative) && is_negative(value) {
                return Ok(EditOutcome::Refused(format!(
                    "{} cannot be negative",
                    field.label
                )));
            }
            if !field.accepts(value) {
                return Ok(EditOutcome::Refused(format!(
                    "'{}' is not an option for {}",
                    value, field.label
                )));
            }
        }

        inner.state = next;
        Ok(EditOutcome::Applied)
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let submission_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "submit",
            schema = %self.schema.name,
            submission_id = %submission_id
        );
        self.submit_snapshot().instrument(span).await
    }

    async fn submit_snapshot(&self) -> SubmitOutcome {
        let snapshot = self.state();

        let missing = self.missing_required(&snapshot);
        if !missing.is_empty() {
            info!(?missing, "Submission blocked by empty required fields");
            return SubmitOutcome::MissingRequired(missing);
        }

        if let Some(message) = self.negative_field(&snapshot) {
            warn!(%message, "Submission rejected");
            self.alerts.alert(&message);
            return SubmitOutcome::Rejected(message);
        }

        self.lock().status = FormStatus::Submitting;
        info!("Submitting prediction request");

        match self.endpoint.predict(&snapshot).await {
            Ok(response) => self.apply_response(response),
            Err(e) => {
                error!(error = %e, "Error fetching prediction");
                self.lock().status = FormStatus::TransportFailed;
                SubmitOutcome::TransportFailed
            }
        }
    }

    fn apply_response(&self, response: PredictionResponse) -> SubmitOutcome {
        let mut inner = self.lock();
        inner.status = FormStatus::Succeeded;

        if self.schema.error_policy == ErrorPolicy::AlertOnError {
            // An empty message is falsy and counts as no error.
            if let Some(message) = response.error.filter(|m| !m.is_empty()) {
                drop(inner);
                warn!(%message, "Endpoint reported an error");
                self.alerts.alert(&format!("Error: {}", message));
                return SubmitOutcome::EndpointError(message);
            }
        }

        match response.predicted_price {
            Some(price) => {
                inner.prediction = Some(price);
                info!(price, "Prediction stored");
                SubmitOutcome::Predicted(price)
            }
            None => {
                warn!("Response carried no predicted_price");
                SubmitOutcome::NoPrediction
            }
        }
    }

    fn missing_required(&self, state: &FormState) -> Vec<String> {
        self.schema
            .fields
            .iter()
            .filter(|f| f.has_rule(Rule::Required))
            .filter(|f| state.get(&f.name).is_none_or(|v| is_blank(&f.kind, v)))
            .map(|f| f.name.clone())
            .collect()
    }

    fn negative_field(&self, state: &FormState) -> Option<String> {
        self.schema
            .fields
            .iter()
            .filter(|f| f.has_rule(Rule::NonNegative))
            .find(|f| state.get(&f.name).is_some_and(is_negative))
            .map(|f| format!("{} cannot be negative", f.label))
    }

    fn lock(&self) -> MutexGuard<'_, FormInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Text inputs accept whitespace as a value; number and select inputs do not
fn is_blank(kind: &FieldKind, value: &str) -> bool {
    match kind {
        FieldKind::Text => value.is_empty(),
        FieldKind::Number | FieldKind::Select { .. } => value.trim().is_empty(),
    }
}

fn is_negative(value: &str) -> bool {
    value
        .trim()
        .parse::<f64>()
        .map(|n| n < 0.0)
        .unwrap_or(false)
}
