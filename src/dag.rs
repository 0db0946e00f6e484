//! Directed acyclic gate graph.
//!
//! Every qubit and classical bit is a wire running from an `In` boundary
//! node to an `Out` boundary node. Operation nodes sit on the wires they
//! touch, and each edge is labelled with the wire it carries, so the nodes
//! on one wire always form a single chain: the wire's timeline.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, NodeIndexable};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::error::{StructuralError, StructuralResult};
use crate::ir::{Circuit, GateKind, Operation};

/// Node index type for the gate graph.
pub type NodeId = NodeIndex<u32>;

/// A wire of the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wire {
    /// A quantum wire.
    Qubit(usize),
    /// A classical wire.
    Clbit(usize),
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wire::Qubit(q) => write!(f, "q[{}]", q),
            Wire::Clbit(c) => write!(f, "c[{}]", c),
        }
    }
}

/// An operation node together with its sequence key.
#[derive(Debug, Clone, PartialEq)]
pub struct OpNode {
    /// The operation.
    pub op: Operation,
    /// Program-order key; unload emits ready nodes in ascending key order.
    pub position: u64,
}

/// A node of the gate graph.
#[derive(Debug, Clone, PartialEq)]
pub enum DagNode {
    /// Start of a wire.
    In(Wire),
    /// End of a wire.
    Out(Wire),
    /// An operation.
    Op(OpNode),
}

impl DagNode {
    /// The operation, if this is an operation node.
    #[inline]
    pub fn operation(&self) -> Option<&Operation> {
        match self {
            DagNode::Op(node) => Some(&node.op),
            _ => None,
        }
    }
}

/// Neighbour of an operation on one qubit's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighbor {
    /// Another operation node.
    Node(NodeId),
    /// The start or end of the wire.
    Boundary,
}

impl Neighbor {
    /// The neighbouring operation, if any.
    pub fn node(self) -> Option<NodeId> {
        match self {
            Neighbor::Node(id) => Some(id),
            Neighbor::Boundary => None,
        }
    }
}

fn wires_of(op: &Operation) -> Vec<Wire> {
    op.qubits()
        .iter()
        .map(|&q| Wire::Qubit(q))
        .chain(op.cbits().iter().map(|&c| Wire::Clbit(c)))
        .collect()
}

/// DAG form of a circuit.
///
/// All mutations touch only the edges of the wires an operation acts on, so
/// they cost O(arity).
#[derive(Debug, Clone)]
pub struct GateGraph {
    graph: StableDiGraph<DagNode, Wire>,
    /// `(In, Out)` node per qubit.
    qubit_io: Vec<(NodeId, NodeId)>,
    /// `(In, Out)` node per classical bit.
    clbit_io: Vec<(NodeId, NodeId)>,
    next_position: u64,
}

impl GateGraph {
    /// An empty graph with the given number of wires.
    pub fn new(num_qubits: usize, num_cbits: usize) -> Self {
        let mut graph = StableDiGraph::default();
        let mut io = |wire: Wire| {
            let input = graph.add_node(DagNode::In(wire));
            let output = graph.add_node(DagNode::Out(wire));
            graph.add_edge(input, output, wire);
            (input, output)
        };
        let qubit_io = (0..num_qubits).map(|q| io(Wire::Qubit(q))).collect();
        let clbit_io = (0..num_cbits).map(|c| io(Wire::Clbit(c))).collect();
        Self {
            graph,
            qubit_io,
            clbit_io,
            next_position: 0,
        }
    }

    /// Builds the graph from a circuit's declared operation order.
    pub fn load(circuit: &Circuit) -> StructuralResult<Self> {
        let mut dag = Self::new(circuit.num_qubits, circuit.num_cbits);
        for op in &circuit.operations {
            dag.insert_op(op.clone())?;
        }
        Ok(dag)
    }

    /// Re-linearises the graph into a circuit.
    ///
    /// Ready operations are emitted in ascending sequence key, so a graph
    /// loaded from a circuit and left untouched unloads to that circuit.
    pub fn unload(&self) -> StructuralResult<Circuit> {
        self.validate()?;

        let mut in_degree: Vec<usize> = vec![0; self.graph.node_bound()];
        for node in self.graph.node_indices() {
            in_degree[node.index()] = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .count();
        }

        let key = |node: NodeId| match &self.graph[node] {
            DagNode::Op(op) => op.position,
            _ => 0,
        };
        let mut ready: BinaryHeap<Reverse<(u64, NodeId)>> = self
            .graph
            .node_indices()
            .filter(|n| in_degree[n.index()] == 0)
            .map(|n| Reverse((key(n), n)))
            .collect();

        let mut circuit = Circuit::new(self.num_qubits(), self.num_cbits());
        let mut visited = 0;
        while let Some(Reverse((_, node))) = ready.pop() {
            visited += 1;
            if let DagNode::Op(op) = &self.graph[node] {
                circuit.add_op(op.op.clone());
            }
            for edge in self.graph.edges_directed(node, Direction::Outgoing) {
                let target = edge.target();
                in_degree[target.index()] -= 1;
                if in_degree[target.index()] == 0 {
                    ready.push(Reverse((key(target), target)));
                }
            }
        }

        if visited != self.graph.node_count() {
            return Err(StructuralError::Cycle);
        }
        Ok(circuit)
    }

    /// Number of qubit wires.
    pub fn num_qubits(&self) -> usize {
        self.qubit_io.len()
    }

    /// Number of classical wires.
    pub fn num_cbits(&self) -> usize {
        self.clbit_io.len()
    }

    /// Number of operation nodes.
    pub fn num_ops(&self) -> usize {
        self.graph.node_count() - 2 * (self.qubit_io.len() + self.clbit_io.len())
    }

    /// Number of gate nodes.
    pub fn gate_count(&self) -> usize {
        self.op_nodes()
            .filter(|(_, op)| matches!(op, Operation::Gate { .. }))
            .count()
    }

    /// Iterates over operation nodes in arbitrary order.
    pub fn op_nodes(&self) -> impl Iterator<Item = (NodeId, &Operation)> + '_ {
        self.graph
            .node_indices()
            .filter_map(|n| self.graph[n].operation().map(|op| (n, op)))
    }

    /// The operation stored at `node`.
    pub fn operation(&self, node: NodeId) -> Option<&Operation> {
        self.graph.node_weight(node).and_then(DagNode::operation)
    }

    /// Appends a parameterless gate at the end of its qubits' timelines.
    pub fn insert(&mut self, kind: GateKind, qubits: Vec<usize>) -> StructuralResult<NodeId> {
        self.insert_op(Operation::gate(kind, qubits))
    }

    /// Appends any operation at the end of the wires it touches.
    pub fn insert_op(&mut self, op: Operation) -> StructuralResult<NodeId> {
        self.check_operation(&op)?;
        let wires = wires_of(&op);

        let mut links = Vec::with_capacity(wires.len());
        for &wire in &wires {
            let output = self.io(wire)?.1;
            let (edge, pred) = self.incoming_on(output, wire)?;
            links.push((wire, edge, pred, output));
        }

        let position = self.next_position;
        self.next_position += 1;
        let node = self.graph.add_node(DagNode::Op(OpNode { op, position }));
        for (wire, edge, pred, output) in links {
            self.graph.remove_edge(edge);
            self.graph.add_edge(pred, node, wire);
            self.graph.add_edge(node, output, wire);
        }
        Ok(node)
    }

    /// Removes an operation, joining its neighbours directly on every wire.
    pub fn remove(&mut self, node: NodeId) -> StructuralResult<Operation> {
        let wires = wires_of(self.operation(node).ok_or(StructuralError::InvalidNode)?);
        let mut links = Vec::with_capacity(wires.len());
        for wire in wires {
            let (_, pred) = self.incoming_on(node, wire)?;
            let (_, succ) = self.outgoing_on(node, wire)?;
            links.push((wire, pred, succ));
        }

        let removed = self.graph.remove_node(node);
        for (wire, pred, succ) in links {
            self.graph.add_edge(pred, succ, wire);
        }
        match removed {
            Some(DagNode::Op(op)) => Ok(op.op),
            _ => Err(StructuralError::InvalidNode),
        }
    }

    /// Replaces two neighbouring single-qubit operations by one.
    ///
    /// `first` must be directly followed by `second` on `qubit`, and both
    /// (as well as `replacement`) must act on `qubit` alone. The new node
    /// takes `first`'s place: its predecessor is `first`'s predecessor and
    /// its successor is `second`'s successor. Every precondition is checked
    /// before the graph is touched.
    pub fn replace_pair(
        &mut self,
        first: NodeId,
        second: NodeId,
        qubit: usize,
        replacement: Operation,
    ) -> StructuralResult<NodeId> {
        let wire = Wire::Qubit(qubit);
        let single_on_qubit = |op: Option<&Operation>| {
            op.is_some_and(|op| op.qubits() == [qubit] && op.cbits().is_empty())
        };
        if !single_on_qubit(self.operation(first))
            || !single_on_qubit(self.operation(second))
            || !single_on_qubit(Some(&replacement))
        {
            return Err(StructuralError::NotAdjacent { qubit });
        }
        self.check_operation(&replacement)?;

        let (_, between) = self.outgoing_on(first, wire)?;
        if between != second {
            return Err(StructuralError::NotAdjacent { qubit });
        }
        let (_, pred) = self.incoming_on(first, wire)?;
        let (_, succ) = self.outgoing_on(second, wire)?;
        let position = match &self.graph[first] {
            DagNode::Op(op) => op.position,
            _ => return Err(StructuralError::InvalidNode),
        };

        self.graph.remove_node(first);
        self.graph.remove_node(second);
        let node = self.graph.add_node(DagNode::Op(OpNode {
            op: replacement,
            position,
        }));
        self.graph.add_edge(pred, node, wire);
        self.graph.add_edge(node, succ, wire);
        Ok(node)
    }

    /// The operation before `node` on `qubit`'s timeline.
    pub fn predecessor(&self, node: NodeId, qubit: usize) -> StructuralResult<Neighbor> {
        self.check_touches(node, qubit)?;
        let (_, pred) = self.incoming_on(node, Wire::Qubit(qubit))?;
        Ok(self.as_neighbor(pred))
    }

    /// The operation after `node` on `qubit`'s timeline.
    pub fn successor(&self, node: NodeId, qubit: usize) -> StructuralResult<Neighbor> {
        self.check_touches(node, qubit)?;
        let (_, succ) = self.outgoing_on(node, Wire::Qubit(qubit))?;
        Ok(self.as_neighbor(succ))
    }

    /// Operations acting on `qubit`, in timeline order.
    pub fn timeline(&self, qubit: usize) -> StructuralResult<Vec<NodeId>> {
        let wire = Wire::Qubit(qubit);
        let (input, output) = self.io(wire)?;
        let mut nodes = Vec::new();
        let mut current = input;
        loop {
            let (_, next) = self.outgoing_on(current, wire)?;
            if next == output {
                return Ok(nodes);
            }
            if nodes.len() >= self.graph.node_count() {
                return Err(StructuralError::Cycle);
            }
            nodes.push(next);
            current = next;
        }
    }

    /// Checks that every wire is a single chain from `In` to `Out` and that
    /// every operation sits on exactly the wires it touches.
    pub fn validate(&self) -> StructuralResult<()> {
        let wires = (0..self.num_qubits())
            .map(Wire::Qubit)
            .chain((0..self.num_cbits()).map(Wire::Clbit));
        for wire in wires {
            let broken = |reason: &str| StructuralError::BrokenTimeline {
                wire: wire.to_string(),
                reason: reason.to_string(),
            };
            let (input, output) = self.io(wire)?;
            let mut current = input;
            let mut steps = 0;
            while current != output {
                if steps > self.graph.node_count() {
                    return Err(StructuralError::Cycle);
                }
                let mut next = self
                    .graph
                    .edges_directed(current, Direction::Outgoing)
                    .filter(|e| *e.weight() == wire);
                current = match (next.next(), next.next()) {
                    (Some(edge), None) => edge.target(),
                    (None, _) => return Err(broken("dangling link")),
                    (Some(_), Some(_)) => return Err(broken("timeline branches")),
                };
                match &self.graph[current] {
                    DagNode::Op(op) if !wires_of(&op.op).contains(&wire) => {
                        return Err(broken("operation does not act on this wire"));
                    }
                    DagNode::In(_) => return Err(broken("reached an input node")),
                    DagNode::Out(w) if *w != wire => {
                        return Err(broken("ends at another wire's output"));
                    }
                    _ => {}
                }
                steps += 1;
            }
        }

        for (node, op) in self.op_nodes() {
            let expected = wires_of(op).len();
            let incoming = self.graph.edges_directed(node, Direction::Incoming).count();
            let outgoing = self.graph.edges_directed(node, Direction::Outgoing).count();
            if incoming != expected || outgoing != expected {
                return Err(StructuralError::BrokenTimeline {
                    wire: format!("{:?}", node),
                    reason: "operation has stray edges".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Next node on `wire` after `node`, boundary nodes included.
    pub(crate) fn next_on_wire(&self, node: NodeId, wire: Wire) -> Option<NodeId> {
        self.outgoing_on(node, wire).ok().map(|(_, n)| n)
    }

    /// The `In` node of a qubit.
    pub(crate) fn qubit_input(&self, qubit: usize) -> Option<NodeId> {
        self.qubit_io.get(qubit).map(|io| io.0)
    }

    /// True if `node` is an operation node.
    pub(crate) fn is_op(&self, node: NodeId) -> bool {
        matches!(self.graph.node_weight(node), Some(DagNode::Op(_)))
    }

    fn as_neighbor(&self, node: NodeId) -> Neighbor {
        if self.is_op(node) {
            Neighbor::Node(node)
        } else {
            Neighbor::Boundary
        }
    }

    fn io(&self, wire: Wire) -> StructuralResult<(NodeId, NodeId)> {
        match wire {
            Wire::Qubit(q) => self
                .qubit_io
                .get(q)
                .copied()
                .ok_or(StructuralError::QubitOutOfRange {
                    qubit: q,
                    num_qubits: self.num_qubits(),
                }),
            Wire::Clbit(c) => self
                .clbit_io
                .get(c)
                .copied()
                .ok_or(StructuralError::ClbitOutOfRange {
                    cbit: c,
                    num_cbits: self.num_cbits(),
                }),
        }
    }

    fn incoming_on(
        &self,
        node: NodeId,
        wire: Wire,
    ) -> StructuralResult<(EdgeIndex<u32>, NodeId)> {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .find(|e| *e.weight() == wire)
            .map(|e| (e.id(), e.source()))
            .ok_or_else(|| StructuralError::BrokenTimeline {
                wire: wire.to_string(),
                reason: "missing predecessor".to_string(),
            })
    }

    fn outgoing_on(
        &self,
        node: NodeId,
        wire: Wire,
    ) -> StructuralResult<(EdgeIndex<u32>, NodeId)> {
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .find(|e| *e.weight() == wire)
            .map(|e| (e.id(), e.target()))
            .ok_or_else(|| StructuralError::BrokenTimeline {
                wire: wire.to_string(),
                reason: "missing successor".to_string(),
            })
    }

    fn check_touches(&self, node: NodeId, qubit: usize) -> StructuralResult<()> {
        let op = self.operation(node).ok_or(StructuralError::InvalidNode)?;
        if op.qubits().contains(&qubit) {
            Ok(())
        } else {
            Err(StructuralError::InvalidNode)
        }
    }

    fn check_operation(&self, op: &Operation) -> StructuralResult<()> {
        if let Operation::Gate {
            kind,
            qubits,
            params,
        } = op
        {
            if qubits.len() != kind.num_qubits() {
                return Err(StructuralError::ArityMismatch {
                    kind: *kind,
                    expected: kind.num_qubits(),
                    got: qubits.len(),
                });
            }
            if params.len() != kind.num_params() {
                return Err(StructuralError::ParamCountMismatch {
                    kind: *kind,
                    expected: kind.num_params(),
                    got: params.len(),
                });
            }
        }

        let qubits = op.qubits();
        for (i, &qubit) in qubits.iter().enumerate() {
            if qubit >= self.num_qubits() {
                return Err(StructuralError::QubitOutOfRange {
                    qubit,
                    num_qubits: self.num_qubits(),
                });
            }
            if qubits[..i].contains(&qubit) {
                return Err(StructuralError::DuplicateQubit { qubit });
            }
        }
        for &cbit in op.cbits() {
            if cbit >= self.num_cbits() {
                return Err(StructuralError::ClbitOutOfRange {
                    cbit,
                    num_cbits: self.num_cbits(),
                });
            }
        }
        Ok(())
    }
}
