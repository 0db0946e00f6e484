//! Rewrite rule engine: a fixed table of `(gate, gate) -> gate` merges.

use std::collections::BTreeMap;
use std::io::Read;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{alpha1, alphanumeric1, space0, space1},
    combinator::{opt, recognize},
    multi::many0,
    sequence::{pair, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};

use crate::dag::{GateGraph, NodeId};
use crate::error::{ConfigError, StructuralError, StructuralResult};
use crate::ir::matrix::{equivalent_up_to_phase, single_qubit_unitary};
use crate::ir::{GateKind, Operation};

use super::scanner::Candidate;

/// `first` followed directly by `second` on one qubit equals `replacement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RewriteRule {
    /// Earlier gate.
    pub first: GateKind,
    /// Later gate.
    pub second: GateKind,
    /// The gate both are merged into.
    pub replacement: GateKind,
}

impl RewriteRule {
    /// Builds a rule from gate names.
    pub fn parse(first: &str, second: &str, replacement: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            first: first.parse()?,
            second: second.parse()?,
            replacement: replacement.parse()?,
        })
    }
}

/// A rule as it appears in CSV and JSON configs, before name resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRule {
    /// Earlier gate name.
    pub first: String,
    /// Later gate name.
    pub second: String,
    /// Replacement gate name.
    pub replacement: String,
}

impl TryFrom<RawRule> for RewriteRule {
    type Error = ConfigError;

    fn try_from(raw: RawRule) -> Result<Self, Self::Error> {
        RewriteRule::parse(&raw.first, &raw.second, &raw.replacement)
    }
}

const DEFAULT_RULES: [(GateKind, GateKind, GateKind); 2] = [
    (GateKind::T, GateKind::T, GateKind::S),
    (GateKind::Tdg, GateKind::Tdg, GateKind::Sdg),
];

const CLIFFORD_T_EXTRA_RULES: [(GateKind, GateKind, GateKind); 4] = [
    (GateKind::S, GateKind::S, GateKind::Z),
    (GateKind::Sdg, GateKind::Sdg, GateKind::Z),
    (GateKind::SX, GateKind::SX, GateKind::X),
    (GateKind::SXdg, GateKind::SXdg, GateKind::X),
];

/// Immutable lookup table of merge rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: BTreeMap<(GateKind, GateKind), GateKind>,
}

impl Default for RuleTable {
    /// `T T -> S` and `Tdg Tdg -> Sdg`.
    fn default() -> Self {
        Self::from_triples(&DEFAULT_RULES)
    }
}

impl RuleTable {
    /// A table with no rules; the pass becomes a no-op.
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// The default rules plus `S S -> Z`, `Sdg Sdg -> Z`, `SX SX -> X` and
    /// `SXdg SXdg -> X`.
    pub fn clifford_t() -> Self {
        let mut table = Self::default();
        for &(first, second, replacement) in &CLIFFORD_T_EXTRA_RULES {
            table.rules.insert((first, second), replacement);
        }
        table
    }

    /// Looks up a built-in table by name (`default`, `clifford_t`, `none`).
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default()),
            "clifford_t" | "clifford-t" => Ok(Self::clifford_t()),
            "none" | "empty" => Ok(Self::empty()),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    fn from_triples(triples: &[(GateKind, GateKind, GateKind)]) -> Self {
        Self {
            rules: triples
                .iter()
                .map(|&(first, second, replacement)| ((first, second), replacement))
                .collect(),
        }
    }

    /// Builds a table, rejecting rules on gates that cannot be merged and
    /// pairs mapped to two different replacements. Exact duplicates are
    /// accepted.
    pub fn from_rules<I>(rules: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = RewriteRule>,
    {
        let mut table = Self::empty();
        for rule in rules {
            for kind in [rule.first, rule.second, rule.replacement] {
                if !kind.is_fixed_single_qubit() {
                    return Err(ConfigError::NonMergeableKind(kind));
                }
            }
            match table.rules.get(&(rule.first, rule.second)) {
                Some(&existing) if existing != rule.replacement => {
                    return Err(ConfigError::ConflictingRule {
                        first: rule.first,
                        second: rule.second,
                        existing,
                        replacement: rule.replacement,
                    });
                }
                _ => {
                    table
                        .rules
                        .insert((rule.first, rule.second), rule.replacement);
                }
            }
        }
        Ok(table)
    }

    /// Parses the line format `first second -> replacement`.
    ///
    /// Blank lines and `//` comments are ignored.
    ///
    /// ```
    /// use q_peephole::ir::GateKind;
    /// use q_peephole::transpiler::RuleTable;
    ///
    /// let table = RuleTable::parse_text("t t -> s // sqrt\ns s -> z").unwrap();
    /// assert_eq!(table.match_pair(GateKind::S, GateKind::S), Some(GateKind::Z));
    /// ```
    pub fn parse_text(input: &str) -> Result<Self, ConfigError> {
        let mut rules = Vec::new();
        for (idx, line) in input.lines().enumerate() {
            let syntax = |message: &str| ConfigError::Syntax {
                line: idx + 1,
                message: message.to_string(),
            };
            let (rest, parsed) =
                rule_line(line).map_err(|_| syntax("expected 'first second -> replacement'"))?;
            if !rest.trim().is_empty() {
                return Err(syntax("unexpected trailing input"));
            }
            if let Some((first, second, replacement)) = parsed {
                rules.push(RewriteRule::parse(first, second, replacement)?);
            }
        }
        Self::from_rules(rules)
    }

    /// Reads CSV with the header `first,second,replacement`.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);
        let mut rules = Vec::new();
        for record in csv.deserialize::<RawRule>() {
            rules.push(RewriteRule::try_from(record?)?);
        }
        Self::from_rules(rules)
    }

    /// Replacement for `first` directly followed by `second`, if any.
    pub fn match_pair(&self, first: GateKind, second: GateKind) -> Option<GateKind> {
        self.rules.get(&(first, second)).copied()
    }

    /// All rules, sorted by pair.
    pub fn rules(&self) -> Vec<RewriteRule> {
        self.rules
            .iter()
            .map(|(&(first, second), &replacement)| RewriteRule {
                first,
                second,
                replacement,
            })
            .collect()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if the table has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Checks every rule against the gates' unitaries, up to global phase.
    pub fn verify(&self) -> Result<(), ConfigError> {
        for rule in self.rules() {
            let not_equivalent = || ConfigError::NotEquivalent {
                first: rule.first,
                second: rule.second,
                replacement: rule.replacement,
            };
            let unitary = |kind| single_qubit_unitary(kind, &[]).ok_or_else(not_equivalent);
            // Circuit order is right-to-left in matrix order.
            let product = unitary(rule.second)? * unitary(rule.first)?;
            if !equivalent_up_to_phase(&product, &unitary(rule.replacement)?) {
                return Err(not_equivalent());
            }
        }
        Ok(())
    }

    /// Replaces `first` and `second` by a single `replacement` gate.
    ///
    /// The new gate inherits `first`'s predecessor and `second`'s successor.
    /// Nothing is changed if the nodes are not two single-qubit gates
    /// adjacent on the same qubit.
    pub fn apply(
        &self,
        graph: &mut GateGraph,
        first: NodeId,
        second: NodeId,
        replacement: GateKind,
    ) -> StructuralResult<NodeId> {
        let (_, qubit) = graph
            .operation(first)
            .and_then(Operation::fixed_single_qubit)
            .ok_or(StructuralError::InvalidNode)?;
        graph.replace_pair(
            first,
            second,
            qubit,
            Operation::gate(replacement, vec![qubit]),
        )
    }

    /// Replacement for a scanned pair, if both nodes are parameterless
    /// single-qubit gates on `candidate.qubit` and a rule covers them.
    pub fn match_candidate(&self, graph: &GateGraph, candidate: Candidate) -> Option<GateKind> {
        let single = |node| {
            graph
                .operation(node)
                .and_then(Operation::fixed_single_qubit)
                .filter(|&(_, q)| q == candidate.qubit)
                .map(|(kind, _)| kind)
        };
        self.match_pair(single(candidate.first)?, single(candidate.second)?)
    }
}

// --- Text format ---

fn gate_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("//"), take_while(|_: char| true)))(input)
}

type ParsedRule<'a> = Option<(&'a str, &'a str, &'a str)>;

fn rule_line(input: &str) -> IResult<&str, ParsedRule<'_>> {
    let (input, _) = space0(input)?;
    if input.is_empty() {
        return Ok((input, None));
    }
    if let Ok((rest, _)) = comment(input) {
        return Ok((rest, None));
    }
    let (input, (first, _, second, _, _, _, replacement, _)) = tuple((
        gate_name, space1, gate_name, space0, tag("->"), space0, gate_name, space0,
    ))(input)?;
    let (input, _) = opt(comment)(input)?;
    Ok((input, Some((first, second, replacement))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = RuleTable::default();
        assert_eq!(table.len(), 2);
        assert_eq!(table.match_pair(GateKind::T, GateKind::T), Some(GateKind::S));
        assert_eq!(
            table.match_pair(GateKind::Tdg, GateKind::Tdg),
            Some(GateKind::Sdg)
        );
        assert_eq!(table.match_pair(GateKind::S, GateKind::S), None);
        assert_eq!(table.match_pair(GateKind::T, GateKind::Tdg), None);
    }

    #[test]
    fn test_presets_verify() {
        RuleTable::default().verify().unwrap();
        RuleTable::clifford_t().verify().unwrap();
        assert_eq!(RuleTable::preset("clifford_t").unwrap().len(), 6);
        assert!(RuleTable::preset("none").unwrap().is_empty());
        assert!(matches!(
            RuleTable::preset("fancy"),
            Err(ConfigError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_verify_rejects_wrong_identity() {
        let table = RuleTable::from_rules([RewriteRule {
            first: GateKind::T,
            second: GateKind::T,
            replacement: GateKind::Z,
        }])
        .unwrap();
        assert!(matches!(
            table.verify(),
            Err(ConfigError::NotEquivalent { .. })
        ));
    }

    #[test]
    fn test_from_rules_rejects_multi_qubit_and_parametric() {
        let err = RuleTable::from_rules([RewriteRule {
            first: GateKind::CX,
            second: GateKind::CX,
            replacement: GateKind::ID,
        }])
        .unwrap_err();
        assert!(matches!(err, ConfigError::NonMergeableKind(GateKind::CX)));

        let err = RuleTable::from_rules([RewriteRule {
            first: GateKind::RZ,
            second: GateKind::RZ,
            replacement: GateKind::RZ,
        }])
        .unwrap_err();
        assert!(matches!(err, ConfigError::NonMergeableKind(GateKind::RZ)));
    }

    #[test]
    fn test_from_rules_conflict() {
        let rule = |replacement| RewriteRule {
            first: GateKind::T,
            second: GateKind::T,
            replacement,
        };
        assert!(RuleTable::from_rules([rule(GateKind::S), rule(GateKind::S)]).is_ok());
        assert!(matches!(
            RuleTable::from_rules([rule(GateKind::S), rule(GateKind::Z)]),
            Err(ConfigError::ConflictingRule { .. })
        ));
    }

    #[test]
    fn test_parse_text() {
        let table = RuleTable::parse_text(
            "// Clifford+T merges\n\
             t t -> s\n\
             \n\
               tdg   tdg->sdg   // inverse\n",
        )
        .unwrap();
        assert_eq!(table, RuleTable::default());
    }

    #[test]
    fn test_parse_text_unknown_kind() {
        let err = RuleTable::parse_text("t t -> s\nt foo -> s").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedKind(ref n) if n == "foo"));
    }

    #[test]
    fn test_parse_text_syntax_error_reports_line() {
        let err = RuleTable::parse_text("t t -> s\nt t s").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax { line: 2, .. }));

        let err = RuleTable::parse_text("t t -> s extra").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_csv() {
        let data = "first,second,replacement\n# comment\nt, t, s\ns,s,z\n";
        let table = RuleTable::from_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.match_pair(GateKind::S, GateKind::S), Some(GateKind::Z));

        let bad = "first,second,replacement\nt,t,bogus\n";
        assert!(matches!(
            RuleTable::from_csv_reader(bad.as_bytes()),
            Err(ConfigError::UnsupportedKind(_))
        ));

        let short = "first,second,replacement\nt,t\n";
        assert!(matches!(
            RuleTable::from_csv_reader(short.as_bytes()),
            Err(ConfigError::Csv(_))
        ));
    }

    #[test]
    fn test_match_and_apply_merge_pair() {
        let mut graph = GateGraph::new(1, 0);
        let a = graph.insert(GateKind::T, vec![0]).unwrap();
        let b = graph.insert(GateKind::T, vec![0]).unwrap();
        let candidate = Candidate {
            first: a,
            second: b,
            qubit: 0,
        };
        let table = RuleTable::default();
        let replacement = table.match_candidate(&graph, candidate).unwrap();
        assert_eq!(replacement, GateKind::S);
        let node = table.apply(&mut graph, a, b, replacement).unwrap();
        assert_eq!(
            graph.operation(node),
            Some(&Operation::gate(GateKind::S, vec![0]))
        );
        assert_eq!(graph.num_ops(), 1);
    }

    #[test]
    fn test_match_candidate_ignores_unmatched_and_multi_qubit() {
        let mut graph = GateGraph::new(2, 0);
        let t = graph.insert(GateKind::T, vec![0]).unwrap();
        let h = graph.insert(GateKind::H, vec![0]).unwrap();
        let cx = graph.insert(GateKind::CX, vec![0, 1]).unwrap();
        let table = RuleTable::clifford_t();

        let miss = Candidate {
            first: t,
            second: h,
            qubit: 0,
        };
        assert_eq!(table.match_candidate(&graph, miss), None);
        let multi = Candidate {
            first: h,
            second: cx,
            qubit: 0,
        };
        assert_eq!(table.match_candidate(&graph, multi), None);
        assert_eq!(graph.num_ops(), 3);
    }

    #[test]
    fn test_apply_rejects_non_adjacent() {
        let mut graph = GateGraph::new(1, 0);
        let a = graph.insert(GateKind::T, vec![0]).unwrap();
        graph.insert(GateKind::H, vec![0]).unwrap();
        let b = graph.insert(GateKind::T, vec![0]).unwrap();
        let err = RuleTable::default()
            .apply(&mut graph, a, b, GateKind::S)
            .unwrap_err();
        assert_eq!(err, StructuralError::NotAdjacent { qubit: 0 });
        assert_eq!(graph.num_ops(), 3);
    }
}
