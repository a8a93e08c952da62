//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::app::filter::{DEFAULT_PATHS, DEFAULT_PREFIXES};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".treesift/config.toml";

/// Layered configuration loaded from defaults, user, workspace, explicit file, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub input: Input,
    #[serde(default)]
    pub rule: Rule,
    #[serde(default)]
    pub output: Output,
}

/// Input settings. An unset path falls back to `tree_client.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Input {
    #[serde(default)]
    path: Option<String>,
}

impl Input {
    fn default_path() -> String {
        "tree_client.json".into()
    }

    pub fn path(&self) -> String {
        self.path.clone().unwrap_or_else(Self::default_path)
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = Some(path.into());
    }
}

/// Inclusion rule settings. Unset fields fall back to the built-in rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Rule {
    #[serde(default)]
    prefixes: Option<Vec<String>>,
    #[serde(default)]
    paths: Option<Vec<String>>,
    #[serde(default)]
    globs: Option<Vec<String>>,
}

impl Rule {
    pub fn prefixes(&self) -> Vec<String> {
        self.prefixes
            .clone()
            .unwrap_or_else(|| DEFAULT_PREFIXES.iter().map(|s| s.to_string()).collect())
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths
            .clone()
            .unwrap_or_else(|| DEFAULT_PATHS.iter().map(|s| s.to_string()).collect())
    }

    pub fn globs(&self) -> Vec<String> {
        self.globs.clone().unwrap_or_default()
    }

    /// Replace the whole rule, as done for command line overrides.
    pub fn replace(&mut self, prefixes: Vec<String>, paths: Vec<String>, globs: Vec<String>) {
        self.prefixes = Some(prefixes);
        self.paths = Some(paths);
        self.globs = Some(globs);
    }
}

/// Rendering settings. Unset fields fall back to two-space indentation and ASCII escaping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Output {
    #[serde(default)]
    indent: Option<usize>,
    #[serde(default)]
    ensure_ascii: Option<bool>,
}

impl Output {
    fn default_indent() -> usize {
        2
    }

    fn default_ensure_ascii() -> bool {
        true
    }

    pub fn indent(&self) -> usize {
        self.indent.unwrap_or_else(Self::default_indent)
    }

    pub fn ensure_ascii(&self) -> bool {
        self.ensure_ascii
            .unwrap_or_else(Self::default_ensure_ascii)
    }

    pub fn set_indent(&mut self, indent: usize) {
        self.indent = Some(indent);
    }

    pub fn set_ensure_ascii(&mut self, ensure_ascii: bool) {
        self.ensure_ascii = Some(ensure_ascii);
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    input: Option<String>,
    indent: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            input: env::var("TREESIFT_INPUT").ok(),
            indent: env::var("TREESIFT_INDENT").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(input: &str, indent: &str) -> Self {
        Self {
            input: Some(input.to_owned()),
            indent: Some(indent.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, an optional
    /// explicit file, and env overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, explicit, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        explicit: Option<&Path>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            tracing::debug!(path = %global_path.display(), "loading global config");
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            tracing::debug!(path = %workspace_path.display(), "loading workspace config");
            layers.push(Self::from_file(&workspace_path)?);
        }

        if let Some(explicit_path) = explicit {
            tracing::debug!(path = %explicit_path.display(), "loading explicit config");
            layers.push(Self::from_file(explicit_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            input: merge_input(self.input, other.input),
            rule: merge_rule(self.rule, other.rule),
            output: merge_output(self.output, other.output),
        }
    }
}

fn merge_input(mut base: Input, overlay: Input) -> Input {
    if let Some(value) = overlay.path {
        base.path = Some(value);
    }
    base
}

fn merge_rule(mut base: Rule, overlay: Rule) -> Rule {
    if let Some(value) = overlay.prefixes {
        base.prefixes = Some(value);
    }
    if let Some(value) = overlay.paths {
        base.paths = Some(value);
    }
    if let Some(value) = overlay.globs {
        base.globs = Some(value);
    }
    base
}

fn merge_output(mut base: Output, overlay: Output) -> Output {
    if let Some(value) = overlay.indent {
        base.indent = Some(value);
    }
    if let Some(value) = overlay.ensure_ascii {
        base.ensure_ascii = Some(value);
    }
    base
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("treesift/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(input) = env.input.filter(|value| !value.is_empty()) {
        config.input.set_path(input);
    }
    if let Some(raw) = env.indent {
        match raw.trim().parse::<usize>() {
            Ok(indent) => config.output.indent = Some(indent),
            Err(err) => {
                tracing::warn!(value = %raw, error = %err, "ignoring invalid TREESIFT_INDENT")
            }
        }
    }
    config
}
