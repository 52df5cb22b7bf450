//! Plain-text rendering of any [`FormSchema`] and its current state.

use std::fmt::Write;

use crate::{
    schema::{FieldKind, FormSchema, Rule},
    state::FormState,
};

/// `$` followed by the shortest decimal form of the price
pub fn format_prediction(price: f64) -> String {
    format!("${}", price)
}

/// The "Predicted Price" block. Nothing is shown before the first price, and a
/// price of zero is treated the same way.
pub fn render_result(prediction: Option<f64>) -> String {
    match prediction {
        Some(price) if price != 0.0 => format!("Predicted Price:\n{}\n", format_prediction(price)),
        _ => String::new(),
    }
}

/// One line per field, in schema order, showing label, value and choices
pub fn render_form(schema: &FormSchema, state: &FormState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", schema.title);
    let _ = writeln!(out, "{}", "=".repeat(schema.title.len()));

    for field in &schema.fields {
        let marker = if field.has_rule(Rule::Required) { "*" } else { " " };
        let value = state.get(&field.name).unwrap_or_default();
        let _ = write!(out, "{}{}: [{}]", marker, field.label, value);

        if let FieldKind::Select { options } = &field.kind {
            let choices: Vec<String> = options
                .iter()
                .map(|o| format!("{}={}", o.value, o.label))
                .collect();
            let _ = write!(out, "  (Select | {})", choices.join(" | "));
        }
        out.push('\n');
    }
    out
}

/// Prompt line for a single field, used by interactive front ends
pub fn field_prompt(schema: &FormSchema, name: &str) -> Option<String> {
    let field = schema.field(name)?;
    let hint = match &field.kind {
        FieldKind::Number => "number".to_string(),
        FieldKind::Text => "text".to_string(),
        FieldKind::Select { options } => options
            .iter()
            .map(|o| o.value.as_str())
            .collect::<Vec<_>>()
            .join("/"),
    };
    Some(format!("{} ({}): ", field.label, hint))
}
