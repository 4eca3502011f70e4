//! Pattern library for regex-based recognition

use crate::anonymization::models::EntityType;
use anyhow::{Context, Result};
use regex::{Match, Regex};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Pattern definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct PatternDefinition {
    /// Entity type emitted for matches
    pub entity_type: String,
    /// Confidence score (0.0 - 1.0)
    pub score: f32,
    /// Regex patterns for this entry
    pub patterns: Vec<String>,
    /// Languages the patterns apply to (empty = all)
    #[serde(default)]
    pub languages: Vec<String>,
    /// Capture group the span covers (whole match when absent)
    #[serde(default)]
    pub group: Option<usize>,
}

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Name of the library entry the pattern came from
    pub name: String,
    /// Compiled regex
    pub regex: Regex,
    /// Entity type emitted for matches
    pub entity_type: EntityType,
    /// Confidence score
    pub score: f32,
    /// Languages the pattern applies to (empty = all)
    pub languages: Vec<String>,
    /// Capture group reported as the span, 0 for the whole match
    pub group: usize,
}

impl CompiledPattern {
    /// True if the pattern should run for `language`
    pub fn applies_to(&self, language: &str) -> bool {
        self.languages.is_empty()
            || self
                .languages
                .iter()
                .any(|l| l.eq_ignore_ascii_case(language))
    }

    /// Regions of `text` this pattern flags
    ///
    /// Matches where the configured group did not participate are skipped.
    pub fn matches<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = Match<'a>> + 'a> {
        if self.group == 0 {
            Box::new(self.regex.find_iter(text))
        } else {
            let group = self.group;
            Box::new(
                self.regex
                    .captures_iter(text)
                    .filter_map(move |caps| caps.get(group)),
            )
        }
    }
}

/// Pattern library container
#[derive(Debug, Deserialize)]
struct PatternLibrary {
    patterns: BTreeMap<String, PatternDefinition>,
}

/// Compiled pattern registry
///
/// Entries are compiled in name order, so detection output is stable from
/// run to run.
#[derive(Debug)]
pub struct PatternRegistry {
    patterns: Vec<CompiledPattern>,
}

impl PatternRegistry {
    /// Create a new pattern registry from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read pattern library: {}",
                path.as_ref().display()
            )
        })?;

        Self::from_toml(&content)
    }

    /// Create a pattern registry from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: PatternLibrary =
            toml::from_str(content).context("Failed to parse pattern library TOML")?;

        let mut patterns = Vec::new();

        for (name, def) in library.patterns {
            if def.entity_type.trim().is_empty() {
                anyhow::bail!("Pattern '{name}' has an empty entity_type");
            }
            if !(0.0..=1.0).contains(&def.score) {
                anyhow::bail!(
                    "Pattern '{name}' has score {} outside [0, 1]",
                    def.score
                );
            }
            if def.patterns.is_empty() {
                anyhow::bail!("Pattern '{name}' defines no regexes");
            }

            let group = def.group.unwrap_or(0);

            for pattern_str in &def.patterns {
                let regex = Regex::new(pattern_str)
                    .with_context(|| format!("Invalid regex in pattern '{name}': {pattern_str}"))?;

                // captures_len counts the implicit whole-match group
                if group >= regex.captures_len() {
                    anyhow::bail!(
                        "Pattern '{name}' selects group {group} but '{pattern_str}' has only {} capture groups",
                        regex.captures_len() - 1
                    );
                }

                patterns.push(CompiledPattern {
                    name: name.clone(),
                    regex,
                    entity_type: EntityType::new(def.entity_type.trim()),
                    score: def.score,
                    languages: def.languages.clone(),
                    group,
                });
            }
        }

        Ok(Self { patterns })
    }

    /// Create a default pattern registry with built-in patterns
    pub fn default_patterns() -> Result<Self> {
        let default_toml = include_str!("../../../../patterns/recognizers.toml");
        Self::from_toml(default_toml)
    }

    /// Get all patterns
    pub fn all_patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Get patterns emitting a specific entity type
    pub fn patterns_for(&self, entity_type: &str) -> Vec<&CompiledPattern> {
        self.patterns
            .iter()
            .filter(|p| p.entity_type.as_str() == entity_type)
            .collect()
    }

    /// Distinct entity types this registry can emit
    pub fn entity_types(&self) -> Vec<EntityType> {
        self.patterns
            .iter()
            .map(|p| p.entity_type.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
