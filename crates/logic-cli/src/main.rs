use clap::{Parser, Subcommand};
use logic_spec::{
    AnswerMap, LogicRule, RuleValidation, SurveySpec, check_rule_edit, get_visible_questions,
    hidden_answers, survey_schema, validate_survey,
};
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const LOG_ENV: &str = "SURVEY_LOGIC_LOG";

/// Exit status used when the input was read fine but the logic is rejected.
const REJECTED: u8 = 2;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Survey logic helper",
    long_about = "Lints conditional question logic, checks rule edits and previews which questions a set of answers shows"
)]
struct Cli {
    /// Log engine decisions to stderr (overridden by SURVEY_LOGIC_LOG).
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the questions shown for a set of answers.
    Visible {
        /// Path to the survey JSON.
        #[arg(long, value_name = "SURVEY")]
        survey: PathBuf,
        /// Optional JSON file with the respondent's current answers.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Check whether a rule may be saved on a question.
    CheckRule {
        /// Path to the survey JSON.
        #[arg(long, value_name = "SURVEY")]
        survey: PathBuf,
        /// Id of the question that would own the rule.
        #[arg(long, value_name = "ID")]
        question: String,
        /// Rule as inline JSON or a path to a JSON file.
        #[arg(long, value_name = "RULE")]
        rule: String,
        /// Emit the `{valid, error}` record as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Validate every rule in a survey.
    Lint {
        /// Path to the survey JSON.
        #[arg(long, value_name = "SURVEY")]
        survey: PathBuf,
        /// Emit the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the JSON schema for survey files.
    Schema,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Visible {
            survey,
            answers,
            json,
        } => run_visible(&survey, answers.as_deref(), json),
        Command::CheckRule {
            survey,
            question,
            rule,
            json,
        } => run_check_rule(&survey, &question, &rule, json),
        Command::Lint { survey, json } => run_lint(&survey, json),
        Command::Schema => run_schema(),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_visible(
    survey_path: &Path,
    answers_path: Option<&Path>,
    as_json: bool,
) -> CliResult<ExitCode> {
    let spec = SurveySpec::from_path(survey_path)?;
    let raw_answers = match answers_path {
        Some(path) => read_json(path)?,
        None => Value::Object(Map::new()),
    };
    let answers = AnswerMap::from_json(&spec.questions, &raw_answers);

    let visible = get_visible_questions(&spec.questions, &answers);
    let ordered: Vec<&str> = spec
        .ordered_questions()
        .into_iter()
        .map(|question| question.id.as_str())
        .filter(|id| visible.contains(*id))
        .collect();
    let stale = hidden_answers(&spec.questions, &answers);
    let unknown: Vec<&str> = answers
        .keys()
        .filter(|key| spec.question(key).is_none())
        .collect();

    if as_json {
        let output = json!({
            "survey_id": spec.id,
            "visible": ordered,
            "hidden_answers": stale,
            "unknown_answers": unknown,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "Visible questions ({}/{}):",
        ordered.len(),
        spec.questions.len()
    );
    for id in &ordered {
        let title = spec
            .question(id)
            .map(|question| question.title.as_str())
            .unwrap_or_default();
        println!("  {} - {}", id, title);
    }
    if !stale.is_empty() {
        println!("Hidden questions with answers: {}", stale.join(", "));
    }
    if !unknown.is_empty() {
        eprintln!("Unknown answer fields: {}", unknown.join(", "));
    }
    Ok(ExitCode::SUCCESS)
}

fn run_check_rule(
    survey_path: &Path,
    question_id: &str,
    rule_arg: &str,
    as_json: bool,
) -> CliResult<ExitCode> {
    let spec = SurveySpec::from_path(survey_path)?;
    let rule = parse_rule(rule_arg)?;
    let result = check_rule_edit(question_id, &rule, &spec.questions);
    let accepted = result.is_ok();

    if as_json {
        let record = RuleValidation::from(result);
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        match result {
            Ok(()) => println!("ok"),
            Err(err) => eprintln!("Rule rejected: {}", err),
        }
    }

    Ok(if accepted {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(REJECTED)
    })
}

fn run_lint(survey_path: &Path, as_json: bool) -> CliResult<ExitCode> {
    let spec = SurveySpec::from_path(survey_path)?;
    let report = validate_survey(&spec);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.valid {
        println!("Survey '{}' logic is valid", spec.id);
    } else {
        eprintln!("Logic issues:");
        for issue in &report.issues {
            let location = match issue.rule_index {
                Some(index) => format!("{}[rule {}]", issue.question_id, index),
                None => issue.question_id.clone(),
            };
            eprintln!("  {}: {} ({})", location, issue.message, issue.code);
        }
    }

    Ok(if report.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(REJECTED)
    })
}

fn run_schema() -> CliResult<ExitCode> {
    println!("{}", serde_json::to_string_pretty(&survey_schema())?);
    Ok(ExitCode::SUCCESS)
}

fn read_json(path: &Path) -> CliResult<Value> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
    Ok(serde_json::from_str(&raw)?)
}

/// Accepts either inline JSON or a path to a JSON file.
fn parse_rule(arg: &str) -> CliResult<LogicRule> {
    let trimmed = arg.trim_start();
    let value: Value = if trimmed.starts_with('{') {
        serde_json::from_str(trimmed)?
    } else {
        read_json(Path::new(arg))?
    };
    serde_json::from_value(value).map_err(|err| format!("invalid rule: {}", err).into())
}
