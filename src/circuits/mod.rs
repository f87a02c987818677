// src/circuits/mod.rs

//! Ordered gate sequences and the builder used to assemble them.
//!
//! A `Circuit` is the unit handed to the simulator: the memory experiment
//! composes one from the sampled logical state, the encode/recovery ansatz
//! circuits and the noise sites, in order.

use crate::core::{QubitId, Result};
use crate::operations::Gate;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// An ordered sequence of gates applied to a set of qubits.
#[derive(Clone, PartialEq)] // PartialEq useful for testing circuits
pub struct Circuit {
    /// The unique set of qubits involved across all gates in this circuit.
    qubits: HashSet<QubitId>,

    /// The ordered gate sequence defining the circuit.
    gates: Vec<Gate>,
}

impl Circuit {
    /// Creates a new, empty circuit.
    pub fn new() -> Self {
        Self {
            qubits: HashSet::new(),
            gates: Vec::new(),
        }
    }

    /// Appends a single gate, registering the qubits it touches.
    pub fn add_gate(&mut self, gate: Gate) {
        for qubit in gate.involved_qubits() {
            self.qubits.insert(qubit);
        }
        self.gates.push(gate);
    }

    /// Appends multiple gates from an iterator.
    pub fn add_gates<I>(&mut self, gates: I)
    where
        I: IntoIterator<Item = Gate>,
    {
        for gate in gates {
            self.add_gate(gate);
        }
    }

    /// Appends every gate of another circuit, in order.
    pub fn add_circuit(&mut self, other: &Circuit) {
        self.add_gates(other.gates.iter().cloned());
    }

    /// The set of unique qubit ids involved in this circuit.
    pub fn qubits(&self) -> &HashSet<QubitId> {
        &self.qubits
    }

    /// Number of distinct qubits the circuit touches.
    pub fn qubit_count(&self) -> usize {
        self.qubits.len()
    }

    /// The ordered gate sequence.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Total number of gates.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// `true` if the circuit contains no gates.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// `true` if the circuit contains at least one noise site.
    pub fn has_noise(&self) -> bool {
        self.gates.iter().any(|g| matches!(g, Gate::Noise { .. }))
    }

    /// The inverse circuit: gates reversed, each replaced by its adjoint.
    /// Used to undo the encoding (decode = encode†) and the state
    /// preparation at the end of a memory circuit.
    ///
    /// # Errors
    /// Fails if the circuit contains a noise site, which has no adjoint.
    pub fn inverse(&self) -> Result<Circuit> {
        let mut inverted = Circuit::new();
        for gate in self.gates.iter().rev() {
            inverted.add_gate(gate.adjoint()?);
        }
        Ok(inverted)
    }
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// Constructs `Circuit` instances via method chaining.
pub struct CircuitBuilder {
    circuit: Circuit,
}

impl CircuitBuilder {
    /// Creates a new, empty builder.
    pub fn new() -> Self {
        Self {
            circuit: Circuit::new(),
        }
    }

    /// Adds a single gate. Returns `self` for chaining.
    pub fn add_gate(mut self, gate: Gate) -> Self {
        self.circuit.add_gate(gate);
        self
    }

    /// Adds multiple gates from an iterator. Returns `self` for chaining.
    pub fn add_gates<I>(mut self, gates: I) -> Self
    where
        I: IntoIterator<Item = Gate>,
    {
        self.circuit.add_gates(gates);
        self
    }

    /// Splices every gate of `other` onto the end. Returns `self` for
    /// chaining.
    pub fn add_circuit(mut self, other: &Circuit) -> Self {
        self.circuit.add_circuit(other);
        self
    }

    /// Finalizes the construction and returns the built circuit.
    pub fn build(self) -> Circuit {
        self.circuit
    }
}

impl Default for CircuitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//-------------------------------------------------------------------------
// Diagram rendering
//-------------------------------------------------------------------------

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.gates.is_empty() {
            return writeln!(f, "vqec::Circuit[0 gates on 0 qubits]");
        }

        let gates = &self.gates;
        let num_gates = gates.len();

        // Sorted qubit rows for a stable diagram.
        let mut sorted_qubits: Vec<QubitId> = self.qubits.iter().cloned().collect();
        sorted_qubits.sort();
        let num_qubits = sorted_qubits.len();
        let qubit_to_row: HashMap<QubitId, usize> = sorted_qubits
            .iter()
            .enumerate()
            .map(|(i, q)| (*q, i))
            .collect();

        let max_label_width = sorted_qubits
            .iter()
            .map(|q| format!("{}", q).len())
            .max()
            .unwrap_or(0);
        let label_padding = " ".repeat(max_label_width + 2);

        const GATE_WIDTH: usize = 7; // e.g. "──Rz───"
        const WIRE: &str = "───────"; // GATE_WIDTH dashes
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        // op_grid[row][column] is the wire/gate cell; v_connect[row][column]
        // is the connector drawn below that row.
        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_gates]; num_qubits];
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_gates]; num_qubits];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total_dashes = GATE_WIDTH - slen;
                let pre_dashes = total_dashes / 2;
                let post_dashes = total_dashes - pre_dashes;
                format!(
                    "{}{}{}",
                    H_WIRE.to_string().repeat(pre_dashes),
                    symbol,
                    H_WIRE.to_string().repeat(post_dashes)
                )
            }
        }

        fn connect_rows(v_connect: &mut [Vec<char>], t: usize, r_min: usize, r_max: usize) {
            for row_vec in v_connect.iter_mut().take(r_max).skip(r_min) {
                row_vec[t] = V_WIRE;
            }
        }

        for (t, gate) in gates.iter().enumerate() {
            match gate {
                Gate::Rz { target, .. } => {
                    if let Some(r) = qubit_to_row.get(target) {
                        op_grid[*r][t] = format_gate("Rz");
                    }
                }
                Gate::Rx { target, .. } => {
                    if let Some(r) = qubit_to_row.get(target) {
                        op_grid[*r][t] = format_gate("Rx");
                    }
                }
                Gate::ControlledRz {
                    control, target, ..
                } => {
                    if let (Some(r_ctrl), Some(r_tgt)) =
                        (qubit_to_row.get(control), qubit_to_row.get(target))
                    {
                        op_grid[*r_ctrl][t] = format_gate("@");
                        op_grid[*r_tgt][t] = format_gate("Rz");
                        connect_rows(&mut v_connect, t, (*r_ctrl).min(*r_tgt), (*r_ctrl).max(*r_tgt));
                    }
                }
                Gate::Unitary { targets, label, .. } => {
                    let rows: Vec<usize> = targets
                        .iter()
                        .filter_map(|q| qubit_to_row.get(q).copied())
                        .collect();
                    for r in &rows {
                        op_grid[*r][t] = format_gate(label);
                    }
                    if let (Some(&r_min), Some(&r_max)) = (rows.iter().min(), rows.iter().max()) {
                        connect_rows(&mut v_connect, t, r_min, r_max);
                    }
                }
                Gate::Noise { targets } => {
                    for q in targets {
                        if let Some(r) = qubit_to_row.get(q) {
                            op_grid[*r][t] = format_gate("N");
                        }
                    }
                }
            }
        }

        writeln!(
            f,
            "vqec::Circuit[{} gates on {} qubits]",
            num_gates, num_qubits
        )?;
        for r in 0..num_qubits {
            let label = format!("{}: ", sorted_qubits[r]);
            write!(f, "{:<width$}", label, width = max_label_width + 2)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            if r < num_qubits - 1 {
                write!(f, "{}", label_padding)?;
                for t in 0..num_gates {
                    let connector = v_connect[r][t];
                    let padding_needed = GATE_WIDTH.saturating_sub(1);
                    let pre_pad = padding_needed / 2;
                    let post_pad = padding_needed - pre_pad;
                    write!(
                        f,
                        "{}{}{}",
                        " ".repeat(pre_pad),
                        connector,
                        " ".repeat(post_pad)
                    )?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
