//! Selecting tree entries by path.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::domain::model::{FilteredMapping, TreeDocument};
use crate::infra::config::Config;

pub const DEFAULT_PREFIXES: &[&str] = &["src/components/ui/"];
pub const DEFAULT_PATHS: &[&str] = &["src/lib/utils.ts"];

/// Decides which paths are kept.
///
/// A path is included when it starts with any prefix, equals any exact path, or matches any glob.
#[derive(Debug, Clone)]
pub struct InclusionRule {
    prefixes: Vec<String>,
    paths: Vec<String>,
    globs: Vec<String>,
    glob_set: GlobSet,
}

impl Default for InclusionRule {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_PREFIXES.iter().map(|s| s.to_string()).collect(),
            paths: DEFAULT_PATHS.iter().map(|s| s.to_string()).collect(),
            globs: Vec::new(),
            glob_set: GlobSet::empty(),
        }
    }
}

impl InclusionRule {
    pub fn new(prefixes: Vec<String>, paths: Vec<String>, globs: Vec<String>) -> Result<Self> {
        let glob_set = build_glob_set(&globs)?;
        Ok(Self {
            prefixes,
            paths,
            globs,
            glob_set,
        })
    }

    /// Build the rule described by the `[rule]` configuration section.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.rule.prefixes(),
            config.rule.paths(),
            config.rule.globs(),
        )
    }

    pub fn matches(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
            || self.paths.iter().any(|exact| exact == path)
            || (!self.globs.is_empty() && self.glob_set.is_match(path))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn globs(&self) -> &[String] {
        &self.globs
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .with_context(|| format!("invalid inclusion glob: {pattern}"))?;
        builder.add(glob);
    }
    builder.build().context("failed to compile inclusion globs")
}

/// Projects a tree listing onto the `path -> sha` pairs accepted by an [`InclusionRule`].
#[derive(Debug, Clone, Default)]
pub struct TreeFilter {
    rule: InclusionRule,
}

impl TreeFilter {
    pub fn new(rule: InclusionRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> &InclusionRule {
        &self.rule
    }

    pub fn apply(&self, document: &TreeDocument) -> FilteredMapping {
        let mut mapping = FilteredMapping::new();
        for entry in &document.tree {
            if !self.rule.matches(&entry.path) {
                continue;
            }
            if let Some(previous) = mapping.insert(entry.path.as_str(), entry.sha.as_str()) {
                tracing::debug!(path = %entry.path, previous = %previous, sha = %entry.sha, "duplicate path overwritten");
            }
        }

        tracing::info!(
            entries = document.tree.len(),
            matched = mapping.len(),
            "filtered tree listing"
        );
        mapping
    }
}
