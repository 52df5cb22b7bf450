use serde::{Deserialize, Serialize};

/// A single entry in a select field's option list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Value submitted to the endpoint
    pub value: String,
    /// Text shown to the user
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// How a field is presented and edited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Numeric input, still held as the raw string the user typed
    Number,
    /// Free text input
    Text,
    /// Choice from a fixed list; an empty "Select" placeholder is always offered
    Select { options: Vec<SelectOption> },
}

/// Validation rules attached to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    /// The field must be non-empty before a submission is sent
    Required,
    /// The value must not parse as a negative number
    NonNegative,
}

/// What the form does with an `error` field in the endpoint's response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorPolicy {
    /// Alert the error and keep the previous prediction
    AlertOnError,
    /// Store `predicted_price` without looking at `error`
    IgnoreError,
}

/// Declarative description of one form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub rules: Vec<Rule>,
}

impl FieldSpec {
    pub fn number(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Number)
    }

    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn select(
        name: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self::new(name, label, FieldKind::Select { options })
    }

    fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            rules: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.rules.push(Rule::Required);
        self
    }

    pub fn non_negative(mut self) -> Self {
        self.rules.push(Rule::NonNegative);
        self
    }

    pub fn has_rule(&self, rule: Rule) -> bool {
        self.rules.contains(&rule)
    }

    /// Whether `value` is acceptable for the select's option list.
    /// The empty placeholder is always accepted; other kinds accept anything.
    pub fn accepts(&self, value: &str) -> bool {
        match &self.kind {
            FieldKind::Select { options } => {
                value.is_empty() || options.iter().any(|o| o.value == value)
            }
            FieldKind::Number | FieldKind::Text => true,
        }
    }
}

/// An ordered field list plus the behaviour that goes with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSchema {
    pub name: String,
    pub title: String,
    pub fields: Vec<FieldSpec>,
    pub error_policy: ErrorPolicy,
}

impl FormSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Look up one of the built-in schemas by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "housing" => Some(Self::housing()),
            "listing" => Some(Self::listing()),
            _ => None,
        }
    }

    /// Twelve-field housing attribute form. Response errors are alerted.
    pub fn housing() -> Self {
        let yes_no = || {
            vec![
                SelectOption::new("yes", "Yes"),
                SelectOption::new("no", "No"),
            ]
        };

        Self {
            name: "housing".to_string(),
            title: "House Price Predictor".to_string(),
            fields: vec![
                FieldSpec::number("area", "Area").required(),
                FieldSpec::number("bedrooms", "Bedrooms").required(),
                FieldSpec::number("bathrooms", "Bathrooms").required(),
                FieldSpec::number("stories", "Stories").required(),
                FieldSpec::select("mainroad", "Main Road", yes_no()).required(),
                FieldSpec::select("guestroom", "Guest Room", yes_no()).required(),
                FieldSpec::select("basement", "Basement", yes_no()).required(),
                FieldSpec::select("hotwaterheating", "Hot Water Heating", yes_no()).required(),
                FieldSpec::select("airconditioning", "Air Conditioning", yes_no()).required(),
                FieldSpec::number("parking", "Parking").required(),
                FieldSpec::select("prefarea", "Preferred Area", yes_no()).required(),
                FieldSpec::select(
                    "furnishingstatus",
                    "Furnishing Status",
                    vec![
                        SelectOption::new("furnished", "Furnished"),
                        SelectOption::new("semi-furnished", "Semi-Furnished"),
                        SelectOption::new("unfurnished", "Unfurnished"),
                    ],
                )
                .required(),
            ],
            error_policy: ErrorPolicy::AlertOnError,
        }
    }

    /// Four-field listing form with negative-number guards.
    /// The response's `error` field is not inspected.
    pub fn listing() -> Self {
        Self {
            name: "listing".to_string(),
            title: "House Price Predictor".to_string(),
            fields: vec![
                FieldSpec::number("bedrooms", "Bedrooms")
                    .required()
                    .non_negative(),
                FieldSpec::number("bathrooms", "Bathrooms")
                    .required()
                    .non_negative(),
                FieldSpec::number("sqft", "Square Feet")
                    .required()
                    .non_negative(),
                FieldSpec::text("location", "Location").required(),
            ],
            error_policy: ErrorPolicy::IgnoreError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn housing_schema_has_twelve_required_fields() {
        let schema = FormSchema::housing();
        assert_eq!(schema.fields.len(), 12);
        assert!(schema.fields.iter().all(|f| f.has_rule(Rule::Required)));
        assert!(!schema.fields.iter().any(|f| f.has_rule(Rule::NonNegative)));
        assert_eq!(schema.error_policy, ErrorPolicy::AlertOnError);
    }

    #[test]
    fn listing_schema_guards_counts_but_not_location() {
        let schema = FormSchema::listing();
        let guarded: Vec<&str> = schema
            .fields
            .iter()
            .filter(|f| f.has_rule(Rule::NonNegative))
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(guarded, vec!["bedrooms", "bathrooms", "sqft"]);
        assert_eq!(schema.error_policy, ErrorPolicy::IgnoreError);
    }

    #[test]
    fn select_accepts_placeholder_and_listed_values_only() {
        let schema = FormSchema::housing();
        let furnishing = schema.field("furnishingstatus").unwrap();
        assert!(furnishing.accepts(""));
        assert!(furnishing.accepts("semi-furnished"));
        assert!(!furnishing.accepts("maybe"));
        assert!(schema.field("area").unwrap().accepts("anything"));
    }

    #[test]
    fn by_name_resolves_builtin_schemas() {
        assert_eq!(FormSchema::by_name("listing").unwrap().fields.len(), 4);
        assert!(FormSchema::by_name("unknown").is_none());
    }
}
