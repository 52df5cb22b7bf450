mod prompt;

use std::io;
use std::process;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use prediction_form::{
    DEFAULT_ENDPOINT, EditOutcome, FormSchema, HttpPredictionEndpoint, PredictionForm,
    SubmitOutcome, render_form, render_result,
};
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::prompt::{TerminalAlerts, prompt_fields};

/// Which field set to present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SchemaChoice {
    /// Twelve housing attributes; endpoint errors are alerted
    Housing,
    /// Bedrooms, bathrooms, sqft and location; negative counts are refused
    Listing,
}

impl SchemaChoice {
    fn schema(self) -> FormSchema {
        match self {
            SchemaChoice::Housing => FormSchema::housing(),
            SchemaChoice::Listing => FormSchema::listing(),
        }
    }
}

/// Fill in a house price form and ask the prediction service for a price.
#[derive(Parser, Debug)]
#[command(name = "prediction-terminal", version, about = "House price prediction form")]
struct Cli {
    /// Field set to use
    #[arg(long, value_enum, default_value = "housing")]
    schema: SchemaChoice,

    /// Prediction endpoint URL (falls back to PREDICTION_ENDPOINT)
    #[arg(long)]
    endpoint: Option<String>,

    /// Prefill a field, e.g. --set bedrooms=3 (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, String)>,

    /// Submit the prefilled values without prompting
    #[arg(long)]
    no_prompt: bool,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in '{}'", raw));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Flag first, then the `PREDICTION_ENDPOINT` value, then the default URL
fn resolve_endpoint(flag: Option<String>, env: Option<String>) -> String {
    flag.or(env)
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
}

/// What the terminal does after a submission
#[derive(Debug, PartialEq)]
enum NextStep {
    /// Ask for these fields again, then resubmit
    Prompt(Vec<String>),
    /// Stop with this exit code
    Exit(i32),
    /// Print the result block and finish
    Finish,
}

fn next_step(outcome: SubmitOutcome, no_prompt: bool, schema: &FormSchema) -> NextStep {
    match outcome {
        SubmitOutcome::MissingRequired(_) | SubmitOutcome::Rejected(_) if no_prompt => {
            NextStep::Exit(2)
        }
        SubmitOutcome::MissingRequired(missing) => NextStep::Prompt(missing),
        SubmitOutcome::Rejected(_) => {
            NextStep::Prompt(schema.fields.iter().map(|f| f.name.clone()).collect())
        }
        SubmitOutcome::TransportFailed => NextStep::Exit(1),
        SubmitOutcome::Predicted(_)
        | SubmitOutcome::NoPrediction
        | SubmitOutcome::EndpointError(_) => NextStep::Finish,
    }
}

/// Logs go to stderr so they never mix with the form on stdout
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "prediction_terminal=warn,prediction_form=warn".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let endpoint = resolve_endpoint(cli.endpoint, std::env::var("PREDICTION_ENDPOINT").ok());
    debug!(%endpoint, schema = ?cli.schema, "Starting prediction form");

    let form = PredictionForm::new(
        cli.schema.schema(),
        Arc::new(HttpPredictionEndpoint::new(endpoint)),
        Arc::new(TerminalAlerts {
            interactive: !cli.no_prompt,
        }),
    );

    for (name, value) in &cli.set {
        if let EditOutcome::Refused(reason) = form.edit(name, value)? {
            anyhow::bail!("--set {}={}: {}", name, value, reason);
        }
    }

    let mut output = io::stdout();

    println!("{}", render_form(form.schema(), &form.state()));

    let mut to_ask: Vec<String> = if cli.no_prompt {
        Vec::new()
    } else {
        form.schema().fields.iter().map(|f| f.name.clone()).collect()
    };

    loop {
        // Stdin is only locked while prompting; alerts read it during submit.
        if !to_ask.is_empty()
            && !prompt_fields(&form, &to_ask, &mut io::stdin().lock(), &mut output)?
        {
            error!("Input closed before the form was complete");
            process::exit(1);
        }

        let outcome = form.submit().await;
        if let SubmitOutcome::MissingRequired(missing) = &outcome {
            println!("Please fill out: {}", missing.join(", "));
        }

        match next_step(outcome, cli.no_prompt, form.schema()) {
            NextStep::Prompt(fields) => to_ask = fields,
            NextStep::Exit(code) => process::exit(code),
            NextStep::Finish => break,
        }
    }

    print!("{}", render_result(form.prediction()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_splits_on_first_equals() {
        assert_eq!(
            parse_assignment("location=a=b").unwrap(),
            ("location".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_assignment("bedrooms=").unwrap(),
            ("bedrooms".to_string(), String::new())
        );
        assert!(parse_assignment("bedrooms").is_err());
        assert!(parse_assignment("=3").is_err());
    }

    #[test]
    fn cli_collects_repeated_sets() {
        let cli = Cli::try_parse_from([
            "prediction-terminal",
            "--schema",
            "listing",
            "--set",
            "bedrooms=3",
            "--set",
            "sqft=900",
            "--no-prompt",
        ])
        .unwrap();

        assert_eq!(cli.schema, SchemaChoice::Listing);
        assert_eq!(cli.set.len(), 2);
        assert!(cli.no_prompt);
        assert_eq!(cli.schema.schema().name, "listing");
    }

    #[test]
    fn endpoint_falls_back_from_flag_to_env_to_default() {
        let flag = Some("http://flag.test/predict".to_string());
        let env = Some("http://env.test/predict".to_string());

        assert_eq!(resolve_endpoint(flag, env.clone()), "http://flag.test/predict");
        assert_eq!(resolve_endpoint(None, env), "http://env.test/predict");
        assert_eq!(resolve_endpoint(None, None), "http://localhost:8000/predict");
    }

    #[test]
    fn no_prompt_exits_two_on_missing_or_rejected() {
        let schema = FormSchema::listing();
        let missing = SubmitOutcome::MissingRequired(vec!["sqft".to_string()]);
        let rejected = SubmitOutcome::Rejected("Bedrooms cannot be negative".to_string());

        assert_eq!(next_step(missing, true, &schema), NextStep::Exit(2));
        assert_eq!(next_step(rejected, true, &schema), NextStep::Exit(2));
        assert_eq!(
            next_step(SubmitOutcome::TransportFailed, true, &schema),
            NextStep::Exit(1)
        );
        assert_eq!(
            next_step(SubmitOutcome::Predicted(450000.0), true, &schema),
            NextStep::Finish
        );
    }

    #[test]
    fn interactive_mode_reprompts_instead_of_exiting() {
        let schema = FormSchema::listing();
        let missing = SubmitOutcome::MissingRequired(vec!["sqft".to_string()]);
        let rejected = SubmitOutcome::Rejected("Bedrooms cannot be negative".to_string());

        assert_eq!(
            next_step(missing, false, &schema),
            NextStep::Prompt(vec!["sqft".to_string()])
        );
        assert_eq!(
            next_step(rejected, false, &schema),
            NextStep::Prompt(vec![
                "bedrooms".to_string(),
                "bathrooms".to_string(),
                "sqft".to_string(),
                "location".to_string(),
            ])
        );
        assert_eq!(
            next_step(SubmitOutcome::EndpointError("bad".to_string()), false, &schema),
            NextStep::Finish
        );
    }
}
