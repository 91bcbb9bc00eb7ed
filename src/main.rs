//! hemotriage: one-shot assessment of a submitted lab form.
//!
//! Reads a JSON object of form fields (`HAEMATOCRIT_status`, ..., `age`,
//! `gender`) from the file given as the first argument, or from stdin, and
//! prints the assessment report as JSON.
//!
//! ```bash
//! echo '{"MCV_status": "85", "age": "25", "gender": "M"}' | hemotriage
//! ```

use std::collections::HashMap;
use std::io::Read;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hemotriage::adapters::{form, load_classifier};
use hemotriage::config::{AppConfig, LogMode};
use hemotriage::{AssessmentService, HemotriageError, PredictionPipeline, RangeValidator};

/// Accept both `"85"` and `85` for field values.
fn read_fields(source: Option<&str>) -> hemotriage::Result<HashMap<String, String>> {
    let mut raw = String::new();
    match source {
        Some(path) => raw = std::fs::read_to_string(path)?,
        None => {
            std::io::stdin().read_to_string(&mut raw)?;
        }
    }

    let values: HashMap<String, serde_json::Value> = serde_json::from_str(&raw)?;
    let mut fields = HashMap::with_capacity(values.len());
    for (key, value) in values {
        let text = match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Null => continue,
            other => {
                return Err(HemotriageError::Form(form::FormError::InvalidNumber {
                    field: key,
                    value: other.to_string(),
                }))
            }
        };
        fields.insert(key, text);
    }
    Ok(fields)
}

fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    let (writer, _guard) = match config.log_mode {
        LogMode::File => {
            if let Some(parent) = config.log_file.parent() {
                // Best-effort: a missing directory surfaces when opening the file.
                let _ = std::fs::create_dir_all(parent);
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.log_file)
                .with_context(|| format!("opening log file {:?}", config.log_file))?;
            tracing_appender::non_blocking(file)
        }
        LogMode::Stderr => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    tracing::info!("Starting hemotriage...");

    // Load once; a missing model only disables predictions.
    let classifier = load_classifier(&config.model_path, config.verify_model_digest);
    let service = AssessmentService::new(
        RangeValidator::standard(),
        PredictionPipeline::new(classifier),
    );

    let source = std::env::args().nth(1);
    let fields = read_fields(source.as_deref()).context("reading form fields")?;

    let panel = form::parse_panel(&fields)?;
    let demographics = form::parse_demographics(&fields, &config.demographics_policy)?;

    let assessment = service.assess(&panel, &demographics);
    println!("{}", serde_json::to_string_pretty(&assessment.report())?);

    Ok(())
}
