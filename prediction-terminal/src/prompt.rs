use std::io::{self, BufRead, Write};

use prediction_form::{AlertSink, EditOutcome, PredictionForm, field_prompt};

/// Alerts go to stderr; when interactive the user must press Enter to dismiss them
pub struct TerminalAlerts {
    pub interactive: bool,
}

impl AlertSink for TerminalAlerts {
    fn alert(&self, message: &str) {
        eprintln!("! {}", message);
        if self.interactive {
            eprint!("(press Enter to continue)");
            let mut line = String::new();
            let _ = io::stdin().lock().read_line(&mut line);
        }
    }
}

/// Ask for each named field in turn. An empty answer keeps the current value.
///
/// Returns `false` if the input ran out before every field was answered.
pub fn prompt_fields<R: BufRead, W: Write>(
    form: &PredictionForm,
    names: &[String],
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<bool> {
    for name in names {
        let Some(prompt) = field_prompt(form.schema(), name) else {
            continue;
        };

        loop {
            let current = form.state().get(name).unwrap_or_default().to_string();
            if current.is_empty() {
                write!(output, "{}", prompt)?;
            } else {
                write!(output, "{}[{}] ", prompt, current)?;
            }
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(false);
            }
            let answer = line.trim();
            if answer.is_empty() {
                break;
            }

            match form.edit(name, answer)? {
                EditOutcome::Applied => break,
                EditOutcome::Refused(reason) => writeln!(output, "  {}", reason)?,
            }
        }
    }
    Ok(true)
}
