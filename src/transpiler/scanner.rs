//! Adjacency scanner.
//!
//! Walks qubit timelines in index order, left to right, and yields every
//! pair of operations that sit next to each other on a qubit. The scanner
//! only stores a cursor, never a borrow of the graph, so the caller may
//! rewrite the graph between two calls to [`AdjacencyScanner::next_pair`].

use tracing::trace;

use crate::dag::{GateGraph, NodeId, Wire};

/// Two operations adjacent on `qubit`'s timeline, `first` before `second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// The earlier operation.
    pub first: NodeId,
    /// The operation directly after `first` on `qubit`.
    pub second: NodeId,
    /// The shared qubit.
    pub qubit: usize,
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    qubit: usize,
    /// Last node visited on `qubit`; starts at the wire's `In` node.
    at: Option<NodeId>,
}

/// Lazy, restartable source of candidate pairs.
#[derive(Debug, Clone)]
pub struct AdjacencyScanner {
    cursor: Cursor,
}

impl Default for AdjacencyScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl AdjacencyScanner {
    /// A scanner positioned before the first operation on qubit 0.
    pub fn new() -> Self {
        Self {
            cursor: Cursor { qubit: 0, at: None },
        }
    }

    /// Restarts from qubit 0.
    pub fn reset(&mut self) {
        self.cursor = Cursor { qubit: 0, at: None };
    }

    /// The next adjacent pair, or `None` once every qubit has been walked.
    pub fn next_pair(&mut self, graph: &GateGraph) -> Option<Candidate> {
        while self.cursor.qubit < graph.num_qubits() {
            let qubit = self.cursor.qubit;
            let wire = Wire::Qubit(qubit);
            let at = match self.cursor.at {
                Some(node) => node,
                None => match graph.qubit_input(qubit) {
                    Some(input) => input,
                    None => break,
                },
            };

            match graph.next_on_wire(at, wire) {
                Some(next) if graph.is_op(next) => {
                    self.cursor.at = Some(next);
                    if graph.is_op(at) {
                        trace!(qubit, ?at, ?next, "candidate pair");
                        return Some(Candidate {
                            first: at,
                            second: next,
                            qubit,
                        });
                    }
                }
                // end of this wire
                _ => {
                    self.cursor = Cursor {
                        qubit: qubit + 1,
                        at: None,
                    };
                }
            }
        }
        None
    }

    /// Repositions the cursor after `replacement` was written in place of a
    /// pair on `qubit`.
    ///
    /// The next candidate is (replacement, successor), so a merge that makes
    /// a new pair further along the wire fires in the same sweep. A pair
    /// ending at the replacement is only seen by the next sweep.
    pub fn resume_after_rewrite(&mut self, replacement: NodeId, qubit: usize) {
        self.cursor = Cursor {
            qubit,
            at: Some(replacement),
        };
    }
}
