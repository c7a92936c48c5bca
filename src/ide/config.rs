//! Analysis configuration.
//!
//! A plain value handed to [`AnalysisHost`](super::AnalysisHost) and from
//! there to every analyzer. Front ends resolve it however they like; with
//! the `serde` feature it can be read from any serde format.

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct AnalysisConfig {
    pub completion: CompletionConfig,
    pub inlay_hints: InlayHintsConfig,
    pub analyzers: AnalyzersConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct CompletionConfig {
    /// Complete view and group fields as `QUALIFIER.FIELD`.
    pub qualify: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct InlayHintsConfig {
    pub show_assignment_target_type: bool,
    pub show_skipped_parameter: bool,
}

impl Default for InlayHintsConfig {
    fn default() -> Self {
        Self {
            show_assignment_target_type: false,
            show_skipped_parameter: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct AnalyzersConfig {
    /// Analyzer ids that do not run.
    pub disabled: Vec<String>,
}

impl AnalyzersConfig {
    pub fn is_enabled(&self, id: &str) -> bool {
        !self.disabled.iter().any(|d| d.eq_ignore_ascii_case(id))
    }
}

impl AnalysisConfig {
    /// Disables an analyzer by id.
    pub fn with_disabled(mut self, id: impl Into<String>) -> Self {
        self.analyzers.disabled.push(id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert!(!config.completion.qualify);
        assert!(config.inlay_hints.show_skipped_parameter);
        assert!(config.analyzers.is_enabled("unused-variable"));
    }

    #[test]
    fn test_disabled_analyzers() {
        let config = AnalysisConfig::default().with_disabled("Empty-Body");
        assert!(!config.analyzers.is_enabled("empty-body"));
        assert!(config.analyzers.is_enabled("self-assignment"));
    }
}
