use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

const NUMERIC_FIELDS: [&str; 4] = ["area", "bedrooms", "bathrooms", "stories"];
const FLAG_FIELDS: [&str; 5] = [
    "mainroad",
    "guestroom",
    "basement",
    "hotwaterheating",
    "airconditioning",
];

#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("could not convert {field} to a number: {value}")]
    NotANumber { field: &'static str, value: String },
}

/// Housing request decoded into model inputs.
/// Flags are 1 for a case-insensitive "yes", otherwise 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HousingFeatures {
    pub area: f64,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub stories: f64,
    pub mainroad: u8,
    pub guestroom: u8,
    pub basement: u8,
    pub hotwaterheating: u8,
    pub airconditioning: u8,
}

impl HousingFeatures {
    pub fn from_request(body: &Value) -> Result<Self, FeatureError> {
        let object = body.as_object().ok_or(FeatureError::NotAnObject)?;

        let mut numbers = [0.0; NUMERIC_FIELDS.len()];
        for (slot, field) in numbers.iter_mut().zip(NUMERIC_FIELDS) {
            let value = object.get(field).ok_or(FeatureError::MissingField(field))?;
            *slot = parse_number(field, value)?;
        }

        let mut flags = [0u8; FLAG_FIELDS.len()];
        for (slot, field) in flags.iter_mut().zip(FLAG_FIELDS) {
            *slot = object.get(field).map(parse_flag).unwrap_or(0);
        }

        let [area, bedrooms, bathrooms, stories] = numbers;
        let [mainroad, guestroom, basement, hotwaterheating, airconditioning] = flags;
        Ok(Self {
            area,
            bedrooms,
            bathrooms,
            stories,
            mainroad,
            guestroom,
            basement,
            hotwaterheating,
            airconditioning,
        })
    }

    /// Model input order
    pub fn to_vector(&self) -> [f64; 9] {
        [
            self.area,
            self.bedrooms,
            self.bathrooms,
            self.stories,
            f64::from(self.mainroad),
            f64::from(self.guestroom),
            f64::from(self.basement),
            f64::from(self.hotwaterheating),
            f64::from(self.airconditioning),
        ]
    }
}

fn parse_number(field: &'static str, value: &Value) -> Result<f64, FeatureError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| FeatureError::NotANumber {
        field,
        value: value.to_string(),
    })
}

fn parse_flag(value: &Value) -> u8 {
    match value {
        Value::String(s) if s.eq_ignore_ascii_case("yes") => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_strings_and_numbers_alike() {
        let body = json!({
            "area": "1200", "bedrooms": 2, "bathrooms": "1", "stories": 1,
            "mainroad": "YES", "guestroom": "no", "basement": "no",
            "hotwaterheating": "no", "airconditioning": "yes",
            "parking": "1", "prefarea": "no", "furnishingstatus": "semi-furnished"
        });

        let features = HousingFeatures::from_request(&body).unwrap();
        assert_eq!(
            features.to_vector(),
            [1200.0, 2.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn missing_flags_default_to_zero() {
        let body = json!({"area": 1, "bedrooms": 1, "bathrooms": 1, "stories": 1});
        let features = HousingFeatures::from_request(&body).unwrap();
        assert_eq!(features.mainroad, 0);
        assert_eq!(features.airconditioning, 0);
    }

    #[test]
    fn empty_object_reports_first_missing_field() {
        assert_eq!(
            HousingFeatures::from_request(&json!({})),
            Err(FeatureError::MissingField("area"))
        );
    }

    #[test]
    fn unparseable_number_is_rejected() {
        let body = json!({"area": 1, "bedrooms": "abc", "bathrooms": 1, "stories": 1});
        let err = HousingFeatures::from_request(&body).unwrap_err();
        assert_eq!(err.to_string(), "could not convert bedrooms to a number: \"abc\"");
    }

    #[test]
    fn arrays_are_not_requests() {
        assert_eq!(
            HousingFeatures::from_request(&json!([1, 2])),
            Err(FeatureError::NotAnObject)
        );
    }
}
