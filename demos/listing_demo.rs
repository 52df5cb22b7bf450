use async_trait::async_trait;
use prediction_form::{
    FormSchema, FormState, PredictionEndpoint, PredictionForm, PredictionResponse,
    RecordingAlerts, render_form, render_result,
};
use std::sync::Arc;

// The listing form driven end to end without a network:
// 1. an in-process endpoint prices a house at a flat rate per square foot
// 2. a negative edit is refused, then the form is filled and submitted
struct PerSquareFootEndpoint {
    rate: f64,
}

#[async_trait]
impl PredictionEndpoint for PerSquareFootEndpoint {
    async fn predict(&self, state: &FormState) -> prediction_form::Result<PredictionResponse> {
        let sqft = state
            .get("sqft")
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or_default();

        Ok(PredictionResponse {
            predicted_price: Some(sqft * self.rate),
            error: None,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("prediction_form=info")
        .init();

    let alerts = Arc::new(RecordingAlerts::new());
    let form = PredictionForm::new(
        FormSchema::listing(),
        Arc::new(PerSquareFootEndpoint { rate: 300.0 }),
        alerts.clone(),
    );

    // Refused: the state keeps its empty value
    println!("bedrooms=-1 -> {:?}", form.edit("bedrooms", "-1")?);

    for (name, value) in [
        ("bedrooms", "3"),
        ("bathrooms", "2"),
        ("sqft", "1500"),
        ("location", "Denver"),
    ] {
        form.edit(name, value)?;
    }

    println!("{}", render_form(form.schema(), &form.state()));

    let outcome = form.submit().await;
    println!("Outcome: {:?}", outcome);
    print!("{}", render_result(form.prediction()));

    if !alerts.messages().is_empty() {
        println!("Alerts: {:?}", alerts.messages());
    }

    Ok(())
}
