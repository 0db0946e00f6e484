//! Pass driver: merges adjacent gates until no rule applies.

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::dag::GateGraph;
use crate::error::{StructuralResult, TranspileResult};
use crate::ir::{Circuit, GateKind};

use super::pass::Pass;
use super::rules::RuleTable;
use super::scanner::{AdjacencyScanner, Candidate};

/// Statistics reported after a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Gate count before the run.
    pub gates_before: usize,
    /// Gate count after the run.
    pub gates_after: usize,
    /// Number of pairs merged.
    pub merges: usize,
    /// Number of full sweeps over all qubits.
    pub sweeps: usize,
}

/// Driver states. Every rewrite removes one node, so the machine reaches
/// `Done` after at most as many rewrites as the graph has operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Asking the scanner for the next candidate.
    Scanning,
    /// A candidate matched a rule.
    Rewriting(Candidate, GateKind),
    /// A sweep finished without any rewrite.
    Done,
}

/// Peephole pass that replaces adjacent gate pairs according to a
/// [`RuleTable`], e.g. `T T -> S`.
///
/// After a merge the scan continues with the pair starting at the new gate,
/// and sweeps repeat until one makes no change: four `T` gates become two
/// `S` gates, and a single `Z` if the table also has `S S -> Z`.
#[derive(Debug, Clone, Default)]
pub struct MergeAdjacentGates {
    rules: RuleTable,
    max_sweeps: Option<usize>,
}

impl MergeAdjacentGates {
    /// Creates the pass with the given rules.
    pub fn new(rules: RuleTable) -> Self {
        Self {
            rules,
            max_sweeps: None,
        }
    }

    /// Stops after `sweeps` full sweeps even if rewrites are still happening.
    pub fn with_max_sweeps(mut self, sweeps: usize) -> Self {
        self.max_sweeps = Some(sweeps);
        self
    }

    /// The rule table in use.
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// The sweep cap, if any.
    pub fn max_sweeps(&self) -> Option<usize> {
        self.max_sweeps
    }

    /// Runs the pass on a graph in place.
    #[instrument(skip_all, fields(rules = self.rules.len()))]
    pub fn run_on_graph(&self, graph: &mut GateGraph) -> StructuralResult<MergeStats> {
        let mut stats = MergeStats {
            gates_before: graph.gate_count(),
            ..MergeStats::default()
        };
        info!(
            "Merging adjacent gates on {} qubits, {} gates",
            graph.num_qubits(),
            stats.gates_before
        );

        let mut scanner = AdjacencyScanner::new();
        let mut sweep_merges = 0;
        let mut state = DriverState::Scanning;
        loop {
            state = match state {
                DriverState::Scanning => match scanner.next_pair(graph) {
                    Some(candidate) => match self.rules.match_candidate(graph, candidate) {
                        Some(replacement) => DriverState::Rewriting(candidate, replacement),
                        None => DriverState::Scanning,
                    },
                    None => {
                        stats.sweeps += 1;
                        debug!(sweep = stats.sweeps, merges = sweep_merges, "sweep finished");
                        let capped = self.max_sweeps.is_some_and(|max| stats.sweeps >= max);
                        if sweep_merges == 0 || capped {
                            DriverState::Done
                        } else {
                            sweep_merges = 0;
                            scanner.reset();
                            DriverState::Scanning
                        }
                    }
                },
                DriverState::Rewriting(candidate, replacement) => {
                    let node =
                        self.rules
                            .apply(graph, candidate.first, candidate.second, replacement)?;
                    debug!(qubit = candidate.qubit, "merged pair into {}", replacement);
                    stats.merges += 1;
                    sweep_merges += 1;
                    scanner.resume_after_rewrite(node, candidate.qubit);
                    DriverState::Scanning
                }
                DriverState::Done => break,
            };
        }

        stats.gates_after = graph.gate_count();
        info!(
            "Merge pass completed: {} -> {} gates, {} merges in {} sweeps",
            stats.gates_before, stats.gates_after, stats.merges, stats.sweeps
        );
        Ok(stats)
    }

    /// Loads the circuit, runs the pass and unloads the result.
    pub fn optimize(&self, circuit: &Circuit) -> TranspileResult<(Circuit, MergeStats)> {
        let mut graph = GateGraph::load(circuit)?;
        let stats = self.run_on_graph(&mut graph)?;
        Ok((graph.unload()?, stats))
    }
}

impl Pass for MergeAdjacentGates {
    fn name(&self) -> &str {
        "MergeAdjacentGates"
    }

    fn run(&self, circuit: &Circuit) -> TranspileResult<Circuit> {
        self.optimize(circuit).map(|(circuit, _)| circuit)
    }
}
