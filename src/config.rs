//! Pass configuration loaded from JSON, CSV or the plain rule text format.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::transpiler::{MergeAdjacentGates, RawRule, RewriteRule, RuleTable};

fn default_preset() -> String {
    "default".to_string()
}

/// JSON configuration of the merge pass.
///
/// ```json
/// { "preset": "clifford_t", "verify_rules": true, "max_sweeps": null }
/// ```
///
/// When `rules` is present it replaces the preset entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
    /// Built-in table name, see [`RuleTable::preset`].
    pub preset: String,
    /// Explicit rules.
    pub rules: Option<Vec<RawRule>>,
    /// Check each rule against gate unitaries before running.
    pub verify_rules: bool,
    /// Upper bound on full sweeps.
    pub max_sweeps: Option<usize>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            rules: None,
            verify_rules: true,
            max_sweeps: None,
        }
    }
}

impl MergeConfig {
    /// Parses a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The rule table this config describes, verified if requested.
    pub fn rule_table(&self) -> Result<RuleTable, ConfigError> {
        let table = match &self.rules {
            Some(raw) => RuleTable::from_rules(
                raw.iter()
                    .cloned()
                    .map(RewriteRule::try_from)
                    .collect::<Result<Vec<_>, _>>()?,
            )?,
            None => RuleTable::preset(&self.preset)?,
        };
        if self.verify_rules {
            table.verify()?;
        }
        Ok(table)
    }

    /// Builds the configured pass.
    pub fn build(&self) -> Result<MergeAdjacentGates, ConfigError> {
        let pass = MergeAdjacentGates::new(self.rule_table()?);
        Ok(match self.max_sweeps {
            Some(max) => pass.with_max_sweeps(max),
            None => pass,
        })
    }
}

/// Loads a merge pass from a file.
///
/// `.json` files are read as [`MergeConfig`], `.csv` files as a rule table
/// with a `first,second,replacement` header, anything else as the text rule
/// format. Rule tables from CSV and text are verified before use.
pub fn load_pass(path: &Path) -> Result<MergeAdjacentGates, ConfigError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    debug!("Loading merge config from {}", path.display());
    match extension.as_deref() {
        Some("json") => MergeConfig::from_json_str(&std::fs::read_to_string(path)?)?.build(),
        Some("csv") => {
            let table = RuleTable::from_csv_reader(File::open(path)?)?;
            table.verify()?;
            Ok(MergeAdjacentGates::new(table))
        }
        _ => {
            let table = RuleTable::parse_text(&std::fs::read_to_string(path)?)?;
            table.verify()?;
            Ok(MergeAdjacentGates::new(table))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::GateKind;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = MergeConfig::from_json_str("{}").unwrap();
        assert_eq!(config, MergeConfig::default());
        assert_eq!(config.rule_table().unwrap(), RuleTable::default());
    }

    #[test]
    fn test_preset_and_max_sweeps() {
        let config =
            MergeConfig::from_json_str(r#"{ "preset": "clifford_t", "max_sweeps": 3 }"#).unwrap();
        let pass = config.build().unwrap();
        assert_eq!(pass.rules(), &RuleTable::clifford_t());
        assert_eq!(pass.max_sweeps(), Some(3));
    }

    #[test]
    fn test_explicit_rules_replace_preset() {
        let config = MergeConfig::from_json_str(
            r#"{ "preset": "clifford_t",
                 "rules": [ { "first": "sx", "second": "sx", "replacement": "x" } ] }"#,
        )
        .unwrap();
        let table = config.rule_table().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.match_pair(GateKind::SX, GateKind::SX), Some(GateKind::X));
        assert_eq!(table.match_pair(GateKind::T, GateKind::T), None);
    }

    #[test]
    fn test_unknown_kind_is_config_error() {
        let config = MergeConfig::from_json_str(
            r#"{ "rules": [ { "first": "t", "second": "t", "replacement": "sqrtz" } ] }"#,
        )
        .unwrap();
        assert!(matches!(
            config.rule_table(),
            Err(ConfigError::UnsupportedKind(ref n)) if n == "sqrtz"
        ));
    }

    #[test]
    fn test_verification_can_be_disabled() {
        let json = r#"{ "verify_rules": VERIFY,
                        "rules": [ { "first": "t", "second": "t", "replacement": "z" } ] }"#;
        let strict = MergeConfig::from_json_str(&json.replace("VERIFY", "true")).unwrap();
        assert!(matches!(
            strict.rule_table(),
            Err(ConfigError::NotEquivalent { .. })
        ));
        let lax = MergeConfig::from_json_str(&json.replace("VERIFY", "false")).unwrap();
        assert!(lax.rule_table().is_ok());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(
            MergeConfig::from_json_str(r#"{ "presets": "default" }"#),
            Err(ConfigError::Json(_))
        ));
    }

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("q-peephole-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_pass_by_extension() {
        let text = write_temp("rules.txt", "t t -> s\ns s -> z\n");
        assert_eq!(load_pass(&text).unwrap().rules().len(), 2);

        let csv = write_temp("rules.csv", "first,second,replacement\ntdg,tdg,sdg\n");
        assert_eq!(
            load_pass(&csv)
                .unwrap()
                .rules()
                .match_pair(GateKind::Tdg, GateKind::Tdg),
            Some(GateKind::Sdg)
        );

        let json = write_temp("merge.json", r#"{ "preset": "clifford_t" }"#);
        assert_eq!(load_pass(&json).unwrap().rules().len(), 6);

        let missing = std::env::temp_dir().join("q-peephole-does-not-exist.json");
        assert!(matches!(load_pass(&missing), Err(ConfigError::Io(_))));
    }
}
