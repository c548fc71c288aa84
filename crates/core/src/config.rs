use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub prompts: PromptConfig,
    pub taxonomy: TaxonomyConfig,
    pub logging: LoggingConfig,
}

/// Where the enrichment prompt text comes from: either inline strings or
/// one-time scoped file reads performed by the prompt builder's constructor.
#[derive(Clone, Debug, Default)]
pub struct PromptConfig {
    pub task_template: Option<String>,
    pub task_path: Option<PathBuf>,
    pub system_prompt: Option<String>,
    pub system_path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct TaxonomyConfig {
    pub allowed: Vec<TaxonomyEntry>,
    pub urgency: Vec<String>,
}

/// One allowed (behavior pattern, lifecycle stage, playbook focus) triple.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub behavior: String,
    pub stage: String,
    pub focus: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

const DEFAULT_ALLOWED: &[(&str, &str, &str)] = &[
    ("High Deals + Multi-user", "Pipeline-driven", "Forecasting + automation"),
    ("High Email", "Outreach-focused", "Sequences + tracking"),
    ("High Contacts only", "Early stage", "Pipeline setup"),
    ("Single-user heavy", "Expansion opportunity", "Team invites"),
    ("Multi-user low activity", "Stalled", "Reactivation"),
    ("Balanced usage", "High intent", "Direct upgrade"),
];

const DEFAULT_URGENCY: &[&str] = &["reach_out_now", "nurture", "reactivate"];

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            allowed: DEFAULT_ALLOWED
                .iter()
                .map(|(behavior, stage, focus)| TaxonomyEntry {
                    behavior: (*behavior).to_string(),
                    stage: (*stage).to_string(),
                    focus: (*focus).to_string(),
                })
                .collect(),
            urgency: DEFAULT_URGENCY.iter().map(|label| (*label).to_string()).collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("cohort.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(prompts) = patch.prompts {
            if let Some(task_template) = prompts.task_template {
                self.prompts.task_template = Some(task_template);
            }
            if let Some(task_path) = prompts.task_path {
                self.prompts.task_path = Some(task_path);
            }
            if let Some(system_prompt) = prompts.system_prompt {
                self.prompts.system_prompt = Some(system_prompt);
            }
            if let Some(system_path) = prompts.system_path {
                self.prompts.system_path = Some(system_path);
            }
        }

        if let Some(taxonomy) = patch.taxonomy {
            if let Some(allowed) = taxonomy.allowed {
                self.taxonomy.allowed = allowed;
            }
            if let Some(urgency) = taxonomy.urgency {
                self.taxonomy.urgency = urgency;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Some(value) = read_env("COHORT_PROMPT_TASK_PATH") {
            self.prompts.task_path = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("COHORT_PROMPT_SYSTEM_PATH") {
            self.prompts.system_path = Some(PathBuf::from(value));
        }

        let log_level = read_env("COHORT_LOGGING_LEVEL").or_else(|| read_env("COHORT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_prompts(&self.prompts)?;
        validate_taxonomy(&self.taxonomy)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("cohort.toml"), PathBuf::from("config/cohort.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str::<ConfigPatch>(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn validate_prompts(prompts: &PromptConfig) -> Result<(), ConfigError> {
    if prompts.task_template.is_some() && prompts.task_path.is_some() {
        return Err(ConfigError::Validation(
            "prompts.task_template and prompts.task_path are mutually exclusive".to_string(),
        ));
    }
    if prompts.system_prompt.is_some() && prompts.system_path.is_some() {
        return Err(ConfigError::Validation(
            "prompts.system_prompt and prompts.system_path are mutually exclusive".to_string(),
        ));
    }
    Ok(())
}

fn validate_taxonomy(taxonomy: &TaxonomyConfig) -> Result<(), ConfigError> {
    if taxonomy.allowed.is_empty() {
        return Err(ConfigError::Validation(
            "taxonomy.allowed must contain at least one (behavior, stage, focus) entry".to_string(),
        ));
    }

    for entry in &taxonomy.allowed {
        if entry.behavior.trim().is_empty()
            || entry.stage.trim().is_empty()
            || entry.focus.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "taxonomy.allowed entries must not contain empty labels".to_string(),
            ));
        }
    }

    if taxonomy.urgency.is_empty() {
        return Err(ConfigError::Validation(
            "taxonomy.urgency must contain at least one label".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    prompts: Option<PromptPatch>,
    taxonomy: Option<TaxonomyPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PromptPatch {
    task_template: Option<String>,
    task_path: Option<PathBuf>,
    system_prompt: Option<String>,
    system_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct TaxonomyPatch {
    allowed: Option<Vec<TaxonomyEntry>>,
    urgency: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, LoadOptions};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    #[test]
    fn defaults_carry_the_builtin_taxonomy() {
        let _guard = env_lock().lock().unwrap();
        clear_vars(&["COHORT_PROMPT_TASK_PATH", "COHORT_PROMPT_SYSTEM_PATH", "COHORT_LOG_LEVEL"]);

        let config = AppConfig::load(LoadOptions::default()).expect("defaults must validate");
        assert_eq!(config.taxonomy.allowed.len(), 6);
        assert_eq!(config.taxonomy.urgency.len(), 3);
        assert!(config.taxonomy.urgency.iter().any(|label| label == "reach_out_now"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn file_patch_overrides_defaults() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&["COHORT_PROMPT_TASK_PATH", "COHORT_LOGGING_LEVEL", "COHORT_LOG_LEVEL"]);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("cohort.toml");
        fs::write(
            &path,
            r#"
[prompts]
task_template = "Segment {{ ID }}"

[taxonomy]
allowed = [{ behavior = "High Email", stage = "Outreach-focused", focus = "Sequences + tracking" }]
urgency = ["nurture"]

[logging]
level = "warn"
"#,
        )
        .map_err(|err| err.to_string())?;

        let config =
            AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                .map_err(|err| format!("config load failed: {err}"))?;

        if config.prompts.task_template.as_deref() != Some("Segment {{ ID }}") {
            return Err("task template should come from the file".to_string());
        }
        if config.taxonomy.allowed.len() != 1 || config.taxonomy.urgency != vec!["nurture"] {
            return Err("taxonomy should come from the file".to_string());
        }
        if config.logging.level != "warn" {
            return Err("log level should come from the file".to_string());
        }
        Ok(())
    }

    #[test]
    fn env_overrides_win_over_file_values() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("COHORT_LOG_LEVEL", "debug");
        env::set_var("COHORT_PROMPT_TASK_PATH", "/tmp/task.txt");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("cohort.toml");
            fs::write(&path, "[logging]\nlevel = \"warn\"\n").map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            if config.logging.level != "debug" {
                return Err("env log level should win over the file".to_string());
            }
            if config.prompts.task_path.as_deref()
                != Some(std::path::Path::new("/tmp/task.txt"))
            {
                return Err("env task path should be applied".to_string());
            }
            Ok(())
        })();

        clear_vars(&["COHORT_LOG_LEVEL", "COHORT_PROMPT_TASK_PATH"]);
        result
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let _guard = env_lock().lock().unwrap();

        let error = AppConfig::load(LoadOptions {
            config_path: Some("/nonexistent/cohort.toml".into()),
            require_file: true,
        })
        .expect_err("a required missing file must fail");

        assert!(matches!(error, ConfigError::MissingConfigFile(_)));
    }

    #[test]
    fn empty_taxonomy_fails_validation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&["COHORT_LOGGING_LEVEL", "COHORT_LOG_LEVEL"]);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("cohort.toml");
        fs::write(&path, "[taxonomy]\nallowed = []\n").map_err(|err| err.to_string())?;

        let error = match AppConfig::load(LoadOptions {
            config_path: Some(path),
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected validation failure".to_string()),
            Err(error) => error,
        };

        match error {
            ConfigError::Validation(message) if message.contains("taxonomy.allowed") => Ok(()),
            other => Err(format!("unexpected error: {other}")),
        }
    }

    #[test]
    fn conflicting_prompt_sources_fail_validation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&["COHORT_PROMPT_TASK_PATH", "COHORT_LOGGING_LEVEL", "COHORT_LOG_LEVEL"]);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("cohort.toml");
        fs::write(
            &path,
            "[prompts]\ntask_template = \"inline\"\ntask_path = \"task.txt\"\n",
        )
        .map_err(|err| err.to_string())?;

        let error = match AppConfig::load(LoadOptions {
            config_path: Some(path),
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected validation failure".to_string()),
            Err(error) => error,
        };

        match error {
            ConfigError::Validation(message) if message.contains("mutually exclusive") => Ok(()),
            other => Err(format!("unexpected error: {other}")),
        }
    }
}
