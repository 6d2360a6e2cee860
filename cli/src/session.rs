//! Line-oriented session driving both calculators
//!
//! Every line is one command, e.g. `bmi weight 70` or `tdee activity moderate`.
//! Edits are applied through the calculators, which persist their own slot
//! after each change, so quitting at any point loses nothing.

use anyhow::Result;
use health_calculators_shared::{
    units, ActivityLevel, BmiCalculator, BmiResult, Field, Gender, KeyValueStorage,
    RawInputState, TdeeCalculator, TdeeResult, Translator, UnitSystem,
};
use std::io::{BufRead, Write};
use thiserror::Error;
use tracing::{debug, info};

pub const HELP: &str = "\
Commands:
  bmi|tdee weight <value>        weight in kg (metric) or lb (imperial)
  bmi|tdee height <cm>           height in cm (metric only)
  bmi|tdee feet <value>          height feet (imperial only)
  bmi|tdee inches <value>        height inches, below 12 (imperial only)
  bmi|tdee units metric|imperial switch unit system, converting values
  bmi|tdee toggle                switch to the other unit system
  bmi|tdee submit                recompute and show the result
  bmi|tdee reset                 clear all input
  bmi|tdee show                  show input and result
  tdee age <years>               whole years, 1-120
  tdee gender male|female
  tdee activity sedentary|light|moderate|active|extra
  show                           show both calculators
  help                           this text
  quit                           leave (input is already saved)
Leave <value> out to clear a field.";

// ============================================================================
// Commands
// ============================================================================

/// Errors from reading a command line
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0} (try `help`)")]
    UnknownCommand(String),

    #[error("Unknown calculator action: {0}")]
    UnknownAction(String),

    #[error("Missing {0}")]
    MissingArgument(&'static str),

    #[error("Invalid {what}: {value}")]
    InvalidOption { what: &'static str, value: String },

    #[error("`{action}` is only available on the TDEE calculator")]
    TdeeOnly { action: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Bmi,
    Tdee,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Raw text for a numeric field; empty clears it
    Set(Field, String),
    Units(UnitSystem),
    Toggle,
    Age(String),
    Gender(Gender),
    Activity(ActivityLevel),
    Submit,
    Reset,
    Show,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Empty,
    Help,
    Quit,
    ShowAll,
    Calculator(Target, Action),
}

impl Command {
    /// Parse one input line
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(Command::Empty);
        };

        let target = match head.to_ascii_lowercase().as_str() {
            "help" | "?" => return Ok(Command::Help),
            "quit" | "exit" => return Ok(Command::Quit),
            "show" => return Ok(Command::ShowAll),
            "bmi" => Target::Bmi,
            "tdee" => Target::Tdee,
            other => return Err(CommandError::UnknownCommand(other.to_string())),
        };

        let verb = words.next().unwrap_or("show").to_ascii_lowercase();
        let arg = words.next();
        let text = arg.unwrap_or("").to_string();

        let action = match verb.as_str() {
            "weight" => Action::Set(Field::Weight, text),
            "height" | "height-cm" | "cm" => Action::Set(Field::HeightCm, text),
            "feet" | "ft" | "height-ft" => Action::Set(Field::HeightFt, text),
            "inches" | "in" | "height-in" => Action::Set(Field::HeightIn, text),
            "units" => {
                let value = arg.ok_or(CommandError::MissingArgument("unit system"))?;
                Action::Units(value.parse().map_err(|_| CommandError::InvalidOption {
                    what: "unit system",
                    value: value.to_string(),
                })?)
            }
            "toggle" => Action::Toggle,
            "submit" | "calculate" => Action::Submit,
            "reset" | "clear" => Action::Reset,
            "show" => Action::Show,
            "age" => Action::Age(text),
            "gender" => {
                let value = arg.ok_or(CommandError::MissingArgument("gender"))?;
                Action::Gender(value.parse().map_err(|_| CommandError::InvalidOption {
                    what: "gender",
                    value: value.to_string(),
                })?)
            }
            "activity" => {
                let value = arg.ok_or(CommandError::MissingArgument("activity level"))?;
                Action::Activity(value.parse().map_err(|_| CommandError::InvalidOption {
                    what: "activity level",
                    value: value.to_string(),
                })?)
            }
            other => return Err(CommandError::UnknownAction(other.to_string())),
        };

        if target == Target::Bmi {
            let tdee_only = match action {
                Action::Age(_) => Some("age"),
                Action::Gender(_) => Some("gender"),
                Action::Activity(_) => Some("activity"),
                _ => None,
            };
            if let Some(action) = tdee_only {
                return Err(CommandError::TdeeOnly { action });
            }
        }

        Ok(Command::Calculator(target, action))
    }
}

/// What the host should do after a command
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Quit,
}

// ============================================================================
// Session
// ============================================================================

pub struct Session<S: KeyValueStorage, T: Translator> {
    bmi: BmiCalculator<S>,
    tdee: TdeeCalculator<S>,
    labels: T,
}

impl<S: KeyValueStorage, T: Translator> Session<S, T> {
    pub fn new(bmi: BmiCalculator<S>, tdee: TdeeCalculator<S>, labels: T) -> Self {
        Self { bmi, tdee, labels }
    }

    pub fn bmi(&self) -> &BmiCalculator<S> {
        &self.bmi
    }

    pub fn tdee(&self) -> &TdeeCalculator<S> {
        &self.tdee
    }

    /// Parse and apply one line
    pub fn handle_line(&mut self, line: &str) -> Result<Reply, CommandError> {
        let command = Command::parse(line)?;
        debug!(?command, "Handling command");
        Ok(self.execute(command))
    }

    pub fn execute(&mut self, command: Command) -> Reply {
        match command {
            Command::Empty => Reply::Text(String::new()),
            Command::Help => Reply::Text(HELP.to_string()),
            Command::Quit => Reply::Quit,
            Command::ShowAll => {
                Reply::Text(format!("{}\n\n{}", self.render_bmi(), self.render_tdee()))
            }
            Command::Calculator(Target::Bmi, action) => Reply::Text(self.apply_bmi(action)),
            Command::Calculator(Target::Tdee, action) => Reply::Text(self.apply_tdee(action)),
        }
    }

    fn apply_bmi(&mut self, action: Action) -> String {
        let calc = &mut self.bmi;
        let changed = match action {
            Action::Set(field, text) => calc.set_field(field, &text),
            Action::Units(target) => calc.set_unit_system(target),
            Action::Toggle => calc.toggle_unit_system(),
            Action::Submit => {
                calc.submit();
                true
            }
            Action::Reset => {
                calc.reset();
                true
            }
            Action::Show => true,
            // rejected at parse time
            Action::Age(_) | Action::Gender(_) | Action::Activity(_) => false,
        };
        with_ignored_note(changed, self.render_bmi())
    }

    fn apply_tdee(&mut self, action: Action) -> String {
        let calc = &mut self.tdee;
        let changed = match action {
            Action::Set(field, text) => calc.set_field(field, &text),
            Action::Units(target) => calc.set_unit_system(target),
            Action::Toggle => calc.toggle_unit_system(),
            Action::Age(text) => calc.set_age(&text),
            Action::Gender(gender) => calc.set_gender(gender),
            Action::Activity(level) => calc.set_activity_level(level),
            Action::Submit => {
                calc.submit();
                true
            }
            Action::Reset => {
                calc.reset();
                true
            }
            Action::Show => true,
        };
        with_ignored_note(changed, self.render_tdee())
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    pub fn render_bmi(&self) -> String {
        let state = self.bmi.state();
        let mut lines = vec![format!(
            "BMI calculator [{}]",
            self.labels.translate(state.unit_system.label_key())
        )];
        lines.extend(self.render_inputs(state));

        match self.bmi.result() {
            Some(result) => lines.extend(self.render_bmi_result(result, state.unit_system)),
            None => lines.push("  Enter weight and height to see your BMI.".to_string()),
        }
        lines.join("\n")
    }

    pub fn render_tdee(&self) -> String {
        let state = self.tdee.state();
        let params = &state.params;
        let mut lines = vec![format!(
            "TDEE calculator [{}]",
            self.labels.translate(state.unit_system.label_key())
        )];
        lines.push(format!(
            "  age:      {}",
            params.age.map(|age| age.to_string()).unwrap_or_else(|| "-".to_string())
        ));
        lines.push(format!(
            "  gender:   {}",
            self.labels.translate(params.gender.label_key())
        ));
        lines.push(format!(
            "  activity: {}",
            self.labels.translate(params.activity_level.label_key())
        ));
        lines.extend(self.render_inputs(state));

        match self.tdee.result() {
            Some(result) => lines.extend(render_tdee_result(result)),
            None => lines.push(
                "  Enter age, weight and height to see your daily calories.".to_string(),
            ),
        }
        lines.join("\n")
    }

    fn render_inputs<P>(&self, state: &RawInputState<P>) -> Vec<String> {
        let system = state.unit_system;
        let weight_unit = self.labels.translate(system.weight_unit_key());
        let height = match system {
            UnitSystem::Metric => format!(
                "{} {}",
                show(state.height_cm),
                self.labels.translate(system.height_unit_key())
            ),
            UnitSystem::Imperial => {
                format!("{} ft {} in", show(state.height_ft), show(state.height_in))
            }
        };
        vec![
            format!("  weight:   {} {}", show(state.weight), weight_unit),
            format!("  height:   {}", height),
        ]
    }

    fn render_bmi_result(&self, result: &BmiResult, system: UnitSystem) -> Vec<String> {
        let (low, high) = result.healthy_weight_range_kg;
        let (low, high) = match system {
            UnitSystem::Metric => (low, high),
            UnitSystem::Imperial => (
                units::weight_to_lb(low, UnitSystem::Metric),
                units::weight_to_lb(high, UnitSystem::Metric),
            ),
        };
        vec![
            format!(
                "  BMI:      {} ({})",
                result.bmi,
                self.labels.translate(result.category.label_key())
            ),
            format!(
                "  healthy:  {} - {} {}",
                units::round_to_tenth(low),
                units::round_to_tenth(high),
                self.labels.translate(system.weight_unit_key())
            ),
        ]
    }

    /// Read commands until `quit` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        writeln!(output, "Health calculators. Type `help` for commands.")?;
        write!(output, "> ")?;
        output.flush()?;

        for line in input.lines() {
            let line = line?;
            match self.handle_line(&line) {
                Ok(Reply::Quit) => break,
                Ok(Reply::Text(text)) if text.is_empty() => {}
                Ok(Reply::Text(text)) => writeln!(output, "{}", text)?,
                Err(e) => writeln!(output, "error: {}", e)?,
            }
            write!(output, "> ")?;
            output.flush()?;
        }

        info!("Session ended");
        Ok(())
    }
}

fn render_tdee_result(result: &TdeeResult) -> Vec<String> {
    vec![
        format!("  TDEE:     {} kcal/day", result.tdee),
        format!(
            "  BMR:      {} kcal/day (x{})",
            result.bmr, result.activity_multiplier
        ),
        format!("  lose:     {} kcal/day", result.calories_for_loss),
        format!("  gain:     {} kcal/day", result.calories_for_gain),
    ]
}

fn show(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn with_ignored_note(changed: bool, rendered: String) -> String {
    if changed {
        rendered
    } else {
        format!("(input unchanged)\n{}", rendered)
    }
}
