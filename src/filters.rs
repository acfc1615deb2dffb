//! Filter configurations and named presets
//!
//! A [`FilterConfig`] decides which architecture sections the assembly engine
//! emits. Tags that were never explicitly set count as enabled: toggling a
//! section off is always explicit, omission means "on".

use crate::templates::Tag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Total mapping from [`Tag`] to enabled/disabled.
///
/// Serializes as a JSON object of tag name to bool. Keys absent from the
/// object are treated as enabled on read back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterConfig {
    flags: BTreeMap<Tag, bool>,
}

impl FilterConfig {
    /// Empty configuration. Every tag reads as enabled until set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a tag is enabled. Unset tags default to `true`.
    pub fn is_enabled(&self, tag: Tag) -> bool {
        *self.flags.get(&tag).unwrap_or(&true)
    }

    /// Explicitly set a tag.
    pub fn set(&mut self, tag: Tag, enabled: bool) {
        self.flags.insert(tag, enabled);
    }

    /// Builder-style set, used by tests and the CLI.
    pub fn with(mut self, tag: Tag, enabled: bool) -> Self {
        self.set(tag, enabled);
        self
    }

    /// The same configuration with every tag spelled out explicitly.
    ///
    /// API responses echo the resolved configuration; normalizing first means
    /// callers see all nine tags rather than whatever subset they sent.
    pub fn normalized(&self) -> Self {
        let mut full = Self::new();
        for tag in Tag::ALL {
            full.set(tag, self.is_enabled(tag));
        }
        full
    }

    /// Tags currently enabled, in canonical order.
    pub fn enabled_tags(&self) -> Vec<Tag> {
        Tag::ALL
            .into_iter()
            .filter(|t| self.is_enabled(*t))
            .collect()
    }
}

/// Error for a preset name outside the fixed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPreset(pub String);

impl std::fmt::Display for UnknownPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown preset '{}' (expected one of: {})",
            self.0,
            PRESET_NAMES.join(", ")
        )
    }
}

impl std::error::Error for UnknownPreset {}

/// Preset names in their fixed display order.
pub const PRESET_NAMES: [&str; 5] = ["all_on", "all_off", "rag_agents", "ds_pipeline", "governance"];

/// Ordered preset names.
pub fn preset_names() -> &'static [&'static str] {
    &PRESET_NAMES
}

/// Retrieve a named preset as a fresh configuration.
///
/// Presets are built on every call, so mutating the returned value never
/// changes what a later retrieval sees.
pub fn preset(name: &str) -> Result<FilterConfig, UnknownPreset> {
    let config = match name {
        "all_on" => explicit(|_| true),
        "all_off" => explicit(|_| false),
        "rag_agents" => explicit(|tag| tag != Tag::Ds),
        "ds_pipeline" => explicit(|tag| !matches!(tag, Tag::Api | Tag::Orchestrator)),
        "governance" => explicit(|tag| tag != Tag::Ds),
        other => return Err(UnknownPreset(other.to_string())),
    };
    Ok(config)
}

/// All presets with their definitions, in display order.
pub fn all_presets() -> Vec<(&'static str, FilterConfig)> {
    PRESET_NAMES
        .iter()
        .map(|name| (*name, preset(name).expect("fixed preset name")))
        .collect()
}

fn explicit(enabled: impl Fn(Tag) -> bool) -> FilterConfig {
    let mut config = FilterConfig::new();
    for tag in Tag::ALL {
        config.set(tag, enabled(tag));
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_tags_default_to_enabled() {
        let config = FilterConfig::new();
        for tag in Tag::ALL {
            assert!(config.is_enabled(tag));
        }
    }

    #[test]
    fn test_explicit_false_wins_over_default() {
        let config = FilterConfig::new().with(Tag::Obs, false);
        assert!(!config.is_enabled(Tag::Obs));
        // Unrelated tags stay enabled
        assert!(config.is_enabled(Tag::Api));
    }

    #[test]
    fn test_serde_omitted_key_means_enabled() {
        let config: FilterConfig = serde_json::from_str(r#"{"agents":false}"#).unwrap();
        assert!(!config.is_enabled(Tag::Agents));
        assert!(config.is_enabled(Tag::Retrieval));
    }

    #[test]
    fn test_serde_rejects_unknown_tag_key() {
        let result: Result<FilterConfig, _> = serde_json::from_str(r#"{"frontend":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_normalized_spells_out_all_tags() {
        let config = FilterConfig::new().with(Tag::Ds, false);
        let json = serde_json::to_value(config.normalized()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 9);
        assert_eq!(obj["ds"], serde_json::json!(false));
        assert_eq!(obj["api"], serde_json::json!(true));
    }

    #[test]
    fn test_preset_names_order() {
        assert_eq!(
            preset_names(),
            &["all_on", "all_off", "rag_agents", "ds_pipeline", "governance"]
        );
    }

    #[test]
    fn test_preset_definitions() {
        let all_on = preset("all_on").unwrap();
        assert!(Tag::ALL.into_iter().all(|t| all_on.is_enabled(t)));

        let all_off = preset("all_off").unwrap();
        assert!(Tag::ALL.into_iter().all(|t| !all_off.is_enabled(t)));

        let rag = preset("rag_agents").unwrap();
        assert!(!rag.is_enabled(Tag::Ds));
        assert!(rag.is_enabled(Tag::Retrieval));

        let ds = preset("ds_pipeline").unwrap();
        assert!(!ds.is_enabled(Tag::Api));
        assert!(!ds.is_enabled(Tag::Orchestrator));
        assert!(ds.is_enabled(Tag::Ds));
        assert!(ds.is_enabled(Tag::Governance));

        let gov = preset("governance").unwrap();
        assert!(gov.is_enabled(Tag::Governance));
        assert!(!gov.is_enabled(Tag::Ds));
    }

    #[test]
    fn test_unknown_preset() {
        let err = preset("everything").unwrap_err();
        assert_eq!(err.0, "everything");
    }

    #[test]
    fn test_presets_are_copy_on_read() {
        let mut first = preset("all_on").unwrap();
        first.set(Tag::Api, false);

        let second = preset("all_on").unwrap();
        assert!(second.is_enabled(Tag::Api));
    }
}
