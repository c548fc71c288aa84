//! Task-prompt rendering from per-entity feature rows.

use std::fs;
use std::path::{Path, PathBuf};

use tera::{Context, Tera};
use thiserror::Error;

use cohort_core::config::PromptConfig;
use cohort_core::FeatureRow;

const TASK_TEMPLATE: &str = "task";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("could not read template file `{path}`: {source}")]
    ReadTemplate { path: PathBuf, source: std::io::Error },
    #[error("prompt template is malformed: {0}")]
    Template(#[from] tera::Error),
}

/// Renders the segmentation task prompt for one entity at a time.
///
/// The task template is registered with a [`Tera`] instance once, at
/// construction; syntax errors and unreadable template files fail the
/// constructor. Rendering itself only fails when the template references a
/// placeholder outside the nine documented ones - a configuration error,
/// not a data error. Missing or malformed row fields always resolve to
/// their documented defaults, so any `FeatureRow` renders.
#[derive(Clone, Debug)]
pub struct PromptBuilder {
    tera: Tera,
    system_prompt: String,
}

impl PromptBuilder {
    /// Builds from literal template text. `system_prompt` is stored
    /// trimmed; pass `None` when the model takes no system instruction.
    pub fn new(task_template: &str, system_prompt: Option<&str>) -> Result<Self, PromptError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TASK_TEMPLATE, task_template)?;

        Ok(Self { tera, system_prompt: system_prompt.unwrap_or_default().trim().to_string() })
    }

    /// Builds from template files. Both reads happen here, once; the
    /// contents are cached for the lifetime of the builder.
    pub fn from_files(task_path: &Path, system_path: Option<&Path>) -> Result<Self, PromptError> {
        let task_template = read_template(task_path)?;
        let system_prompt = match system_path {
            Some(path) => Some(read_template(path)?),
            None => None,
        };

        Self::new(&task_template, system_prompt.as_deref())
    }

    /// Builds from the `[prompts]` config section, preferring inline text
    /// over file paths (the config layer rejects having both).
    pub fn from_config(config: &PromptConfig) -> Result<Self, PromptError> {
        let task_template = match (&config.task_template, &config.task_path) {
            (Some(template), _) => template.clone(),
            (None, Some(path)) => read_template(path)?,
            (None, None) => String::new(),
        };
        let system_prompt = match (&config.system_prompt, &config.system_path) {
            (Some(prompt), _) => Some(prompt.clone()),
            (None, Some(path)) => Some(read_template(path)?),
            (None, None) => None,
        };

        Self::new(&task_template, system_prompt.as_deref())
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Substitutes all nine placeholders with coerced row values:
    /// `ID`, `INDUSTRY`, `EMPLOYEE_RANGE`, `ALEXA_RANK` as verbatim text
    /// (empty when absent), `P` as a float defaulting to 0.0, and the four
    /// 30-day counters as rounded integers defaulting to 0.
    pub fn render(&self, row: &FeatureRow) -> Result<String, PromptError> {
        let mut context = Context::new();
        context.insert("ID", &row.text(&["id"]));
        context.insert("INDUSTRY", &row.text(&["INDUSTRY"]));
        context.insert("EMPLOYEE_RANGE", &row.text(&["EMPLOYEE_RANGE"]));
        context.insert("ALEXA_RANK", &row.text(&["ALEXA_RANK"]));
        context.insert("P", &row.num(&["P_CONVERT_30D", "P"], 0.0));
        context.insert("DEALS_30", &row.int(&["DEALS_30", "ACTIONS_CRM_DEALS_30D_SUM"], 0));
        context.insert("EMAIL_30", &row.int(&["EMAIL_30", "ACTIONS_EMAIL_30D_SUM"], 0));
        context.insert("UDEALS_30", &row.int(&["UDEALS_30", "USERS_CRM_DEALS_30D_SUM"], 0));
        context.insert("UEMAIL_30", &row.int(&["UEMAIL_30", "USERS_EMAIL_30D_SUM"], 0));

        Ok(self.tera.render(TASK_TEMPLATE, &context)?)
    }
}

fn read_template(path: &Path) -> Result<String, PromptError> {
    fs::read_to_string(path)
        .map_err(|source| PromptError::ReadTemplate { path: path.to_path_buf(), source })
}
