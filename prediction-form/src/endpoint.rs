use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{error::Result, state::FormState};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/predict";

/// Body returned by the prediction service.
///
/// Decoding is lenient: a numeric string counts as a price, and `error` is
/// only set when the service sent a truthy value. Neither field can make the
/// whole body unreadable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default, deserialize_with = "lenient_price")]
    pub predicted_price: Option<f64>,
    #[serde(default, deserialize_with = "truthy_error")]
    pub error: Option<String>,
}

fn lenient_price<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// `null`, `false`, `0` and `""` mean no error; anything else is kept as text
fn truthy_error<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Anything that can turn a form snapshot into a prediction response
#[async_trait]
pub trait PredictionEndpoint: Send + Sync {
    async fn predict(&self, state: &FormState) -> Result<PredictionResponse>;
}

/// POSTs the snapshot as JSON to a fixed URL. No timeout is applied.
#[derive(Clone, Debug)]
pub struct HttpPredictionEndpoint {
    client: reqwest::Client,
    url: String,
}

impl HttpPredictionEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for HttpPredictionEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl PredictionEndpoint for HttpPredictionEndpoint {
    async fn predict(&self, state: &FormState) -> Result<PredictionResponse> {
        debug!(url = %self.url, fields = state.len(), "Posting prediction request");

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .json(state)
            .send()
            .await?;

        // Error statuses still carry a JSON body with an `error` field.
        let status = response.status();
        let parsed: PredictionResponse = response.json().await?;
        debug!(status = %status, ?parsed, "Prediction response received");

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FormError, FormSchema};
    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode},
        routing::post,
    };
    use serde_json::{Value, json};

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/predict", addr)
    }

    #[tokio::test]
    async fn posts_json_body_with_json_content_type() {
        async fn echo(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
            let content_type = headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            assert_eq!(content_type, "application/json");
            assert_eq!(body["sqft"], json!("900"));
            assert_eq!(body["location"], json!(""));
            Json(json!({"predicted_price": 450000}))
        }

        let url = spawn(Router::new().route("/predict", post(echo))).await;
        let state = FormState::empty(&FormSchema::listing())
            .with_value("sqft", "900")
            .unwrap();

        let response = HttpPredictionEndpoint::new(url).predict(&state).await.unwrap();
        assert_eq!(response.predicted_price, Some(450000.0));
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn error_status_body_is_still_parsed() {
        async fn reject() -> (StatusCode, Json<Value>) {
            (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid input"})))
        }

        let url = spawn(Router::new().route("/predict", post(reject))).await;
        let state = FormState::empty(&FormSchema::housing());

        let response = HttpPredictionEndpoint::new(url).predict(&state).await.unwrap();
        assert_eq!(response.error.as_deref(), Some("invalid input"));
        assert!(response.predicted_price.is_none());
    }

    #[tokio::test]
    async fn non_json_body_is_an_invalid_response() {
        async fn html() -> &'static str {
            "<html>oops</html>"
        }

        let url = spawn(Router::new().route("/predict", post(html))).await;
        let state = FormState::empty(&FormSchema::housing());

        let err = HttpPredictionEndpoint::new(url)
            .predict(&state)
            .await
            .unwrap_err();
        assert!(matches!(err, FormError::InvalidResponse(_)));
    }

    #[test]
    fn numeric_string_price_is_accepted() {
        let parsed: PredictionResponse =
            serde_json::from_value(json!({"predicted_price": "450000"})).unwrap();
        assert_eq!(parsed.predicted_price, Some(450000.0));

        let parsed: PredictionResponse =
            serde_json::from_value(json!({"predicted_price": "n/a"})).unwrap();
        assert_eq!(parsed.predicted_price, None);
    }

    #[test]
    fn non_string_error_does_not_break_decoding() {
        let parsed: PredictionResponse =
            serde_json::from_value(json!({"predicted_price": 450000, "error": {"code": 5}}))
                .unwrap();
        assert_eq!(parsed.predicted_price, Some(450000.0));
        assert_eq!(parsed.error.as_deref(), Some(r#"{"code":5}"#));
    }

    #[test]
    fn falsy_error_values_mean_no_error() {
        for error in [json!(""), json!(null), json!(false), json!(0)] {
            let parsed: PredictionResponse =
                serde_json::from_value(json!({"predicted_price": 1, "error": error})).unwrap();
            assert!(parsed.error.is_none(), "{:?}", parsed.error);
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        // Bind then drop to get a port nothing is listening on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoint = HttpPredictionEndpoint::new(format!("http://{}/predict", addr));
        let state = FormState::empty(&FormSchema::housing());

        let err = endpoint.predict(&state).await.unwrap_err();
        assert!(matches!(err, FormError::Transport(_)));
    }
}
