//! Diagnostic output of the engine.
//!
//! The engine hands labelled text artifacts (SMT-LIB2 renderings of the
//! constraint sets it checks) to a [`DiagnosticSink`]. The default sink
//! discards them.

use crate::constraint::Constraint;
use num_rational::BigRational;
use num_traits::{One, Signed};
use oxcad_math::{Polynomial, Sign};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Receiver of diagnostic artifacts.
pub trait DiagnosticSink: Send {
    /// Check whether artifacts are wanted at all. Rendering is skipped
    /// otherwise.
    fn enabled(&self) -> bool {
        true
    }

    /// Accept one artifact.
    fn emit(&mut self, label: &str, content: &str);
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn enabled(&self) -> bool {
        false
    }

    fn emit(&mut self, _label: &str, _content: &str) {}
}

/// Sink that keeps artifacts in memory. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<(String, String)>>>,
}

impl MemorySink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collected `(label, content)` pairs in emission order.
    pub fn entries(&self) -> Vec<(String, String)> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&mut self, label: &str, content: &str) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.push((label.to_string(), content.to_string()));
    }
}

/// Sink writing each artifact to `<dir>/<prefix><n>_<label>.smt2`, with `n`
/// counting the artifacts of this sink.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    prefix: String,
    counter: usize,
}

impl DirectorySink {
    /// Write into `dir` (which must exist) with a file name prefix.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            counter: 0,
        }
    }

    /// Number of artifacts written so far.
    pub fn count(&self) -> usize {
        self.counter
    }
}

impl DiagnosticSink for DirectorySink {
    fn emit(&mut self, label: &str, content: &str) {
        let name = format!("{}{:04}_{}.smt2", self.prefix, self.counter, label);
        let path = self.dir.join(name);
        match std::fs::write(&path, content) {
            Ok(()) => self.counter += 1,
            Err(e) => warn!(path = %path.display(), error = %e, "could not write diagnostic file"),
        }
    }
}

fn smt_rational(q: &BigRational) -> String {
    let magnitude = if q.denom().is_one() {
        q.numer().abs().to_string()
    } else {
        format!("(/ {} {})", q.numer().abs(), q.denom())
    };
    if q.is_negative() {
        format!("(- {})", magnitude)
    } else {
        magnitude
    }
}

/// SMT-LIB2 term for a polynomial over the variables `x<var>`.
pub fn polynomial_to_smtlib(p: &Polynomial) -> String {
    let mut terms: Vec<String> = Vec::with_capacity(p.num_terms());
    for term in p.terms() {
        let mut factors = Vec::new();
        if !term.coeff.is_one() || term.monomial.vars().is_empty() {
            factors.push(smt_rational(&term.coeff));
        }
        for vp in term.monomial.vars() {
            for _ in 0..vp.power {
                factors.push(format!("x{}", vp.var));
            }
        }
        terms.push(if factors.len() == 1 {
            factors.remove(0)
        } else {
            format!("(* {})", factors.join(" "))
        });
    }
    match terms.len() {
        0 => "0".to_string(),
        1 => terms.remove(0),
        _ => format!("(+ {})", terms.join(" ")),
    }
}

/// SMT-LIB2 assertion for a constraint.
pub fn constraint_to_smtlib(c: &Constraint) -> String {
    let p = polynomial_to_smtlib(c.polynomial());
    let (op, negate) = match (c.sign(), c.is_negated()) {
        (Sign::Zero, false) => ("=", false),
        (Sign::Zero, true) => ("=", true),
        (Sign::Negative, false) => ("<", false),
        (Sign::Negative, true) => (">=", false),
        (Sign::Positive, false) => (">", false),
        (Sign::Positive, true) => ("<=", false),
    };
    let atom = format!("({} {} 0)", op, p);
    if negate {
        format!("(not {})", atom)
    } else {
        atom
    }
}

/// A complete SMT-LIB2 script asserting the conjunction of `constraints`.
pub fn to_smtlib(constraints: &[Constraint]) -> String {
    let mut vars: Vec<u32> = constraints.iter().flat_map(Constraint::variables).collect();
    vars.sort_unstable();
    vars.dedup();

    let mut out = String::from("(set-logic QF_NRA)\n");
    for v in &vars {
        let _ = writeln!(out, "(declare-fun x{} () Real)", v);
    }
    let atoms: Vec<String> = constraints.iter().map(constraint_to_smtlib).collect();
    match atoms.len() {
        0 => out.push_str("(assert true)\n"),
        1 => {
            let _ = writeln!(out, "(assert {})", atoms[0]);
        }
        _ => {
            let _ = writeln!(out, "(assert (and {}))", atoms.join(" "));
        }
    }
    out.push_str("(check-sat)\n");
    out
}
