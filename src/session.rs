//! One synthesis session: a shared DAG and catalogs, many functions.
//!
//! ```
//! use anf_synth::session::SynthesisSession;
//!
//! let mut session = SynthesisSession::default();
//! let f = session.process("x0x1x2x3 + x0x1x2 + x4");
//! assert!(session.verify("x0x1x2x3 + x0x1x2 + x4", &f));
//! let g = session.process("x3x2x1x0 + x2x1x0");
//! assert!(g.patterns[0].reused);
//! assert_eq!(g.patterns[0].output, f.patterns[0].output);
//! ```

use log::{debug, info};

use crate::catalog::{pattern_signature, PatternCatalog, XorCatalog};
use crate::config::SessionConfig;
use crate::dag::GateDag;
use crate::index::{DegreeIndex, TermState};
use crate::ledger::{DepthLedger, EntryTag};
use crate::merge::{merge_all, MergeOutcome};
use crate::pattern::{PatternKind, PatternMatch};
use crate::signal::Signal;
use crate::synth::{emit_leftovers, synthesize, Synthesized};
use crate::varset::VarSet;

/// A pattern applied while processing one function.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AppliedPattern {
    pub kind: PatternKind,
    pub signature: String,
    /// Source text of the consumed terms: high, middles, low.
    pub terms: Vec<String>,
    pub output: Signal,
    pub depth: u32,
    /// Whether the output was borrowed from the catalog.
    pub reused: bool,
}

/// Term accounting for one function.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct TermStats {
    pub total: usize,
    /// Terms taken by patterns.
    pub consumed: usize,
    /// Terms handed to the leftover stage.
    pub leftover: usize,
    /// Leftover items (terms or residue) that cancelled in pairs.
    pub cancelled: usize,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FunctionResult {
    pub output: Signal,
    pub depth: u32,
    pub patterns: Vec<AppliedPattern>,
    pub stats: TermStats,
    /// Residue monomials emitted by the applied patterns.
    pub residue: Vec<VarSet>,
    /// Number of ledger entries that were merged.
    pub ledger_entries: usize,
    /// Gate nodes added to the DAG by this function.
    pub nodes_created: usize,
    pub merge: MergeOutcome,
}

/// Owns the gate DAG and both reuse catalogs for a batch of functions.
///
/// Functions are processed strictly one after another. Everything a
/// function builds stays in the DAG and the catalogs, where later
/// functions can reuse it.
#[derive(Debug, Clone)]
pub struct SynthesisSession {
    config: SessionConfig,
    dag: GateDag,
    patterns: PatternCatalog,
    xors: XorCatalog,
    functions: usize,
}

impl SynthesisSession {
    pub fn new(config: SessionConfig) -> Self {
        let dag = GateDag::new(config.table_bits);
        Self {
            config,
            dag,
            patterns: PatternCatalog::new(),
            xors: XorCatalog::new(),
            functions: 0,
        }
    }
}

impl Default for SynthesisSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

// Getters
impl SynthesisSession {
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn dag(&self) -> &GateDag {
        &self.dag
    }

    pub fn pattern_catalog(&self) -> &PatternCatalog {
        &self.patterns
    }

    pub fn xor_catalog(&self) -> &XorCatalog {
        &self.xors
    }

    /// Number of functions processed so far.
    pub fn functions(&self) -> usize {
        self.functions
    }
}

struct Run {
    ledger: DepthLedger,
    residue: Vec<VarSet>,
    applied: Vec<AppliedPattern>,
}

impl SynthesisSession {
    /// Synthesizes a polynomial given as text.
    pub fn process(&mut self, polynomial: &str) -> FunctionResult {
        self.process_index(DegreeIndex::group_by_degree(polynomial))
    }

    /// Synthesizes the function whose terms are in `index`.
    pub fn process_index(&mut self, mut index: DegreeIndex) -> FunctionResult {
        let nodes_before = self.dag.len();
        let mut run = Run {
            ledger: DepthLedger::new(),
            residue: Vec::new(),
            applied: Vec::new(),
        };

        let schedule = self.config.schedule.clone();
        for step in schedule {
            debug!("Running {}", step);
            if self.config.reuse_patterns {
                for signature in self.patterns.signatures(step.kind()) {
                    if let Some((m, result)) = self.patterns.try_reuse_pattern(&signature, &mut index) {
                        self.record(&mut run, &index, &m, result, signature, true);
                    }
                }
            }
            while let Some(m) = step.find(&index) {
                index.claim(&m.terms());
                let result = synthesize(&mut self.dag, &index, &m);
                let signature = self.patterns.remember_pattern(&index, &m, &result);
                self.record(&mut run, &index, &m, result, signature, false);
            }
        }

        let Run {
            mut ledger,
            residue,
            applied,
        } = run;
        let report = emit_leftovers(&mut self.dag, &mut index, &residue, &mut ledger);
        let stats = TermStats {
            total: index.len(),
            consumed: index.count(TermState::Consumed),
            leftover: index.count(TermState::Leftover),
            cancelled: report.cancelled,
        };
        let ledger_entries = ledger.len();
        let merge = merge_all(ledger, &mut self.dag, &mut self.xors, self.config.reuse_xor_merges);

        self.functions += 1;
        let result = FunctionResult {
            output: merge.output,
            depth: merge.depth,
            patterns: applied,
            stats,
            residue,
            ledger_entries,
            nodes_created: self.dag.len() - nodes_before,
            merge,
        };
        info!(
            "Function #{}: output {} at depth {}, {} patterns ({} reused), {}/{} terms consumed, {} new nodes",
            self.functions,
            result.output,
            result.depth,
            result.patterns.len(),
            result.patterns.iter().filter(|p| p.reused).count(),
            stats.consumed,
            stats.total,
            result.nodes_created
        );
        result
    }

    fn record(
        &self,
        run: &mut Run,
        index: &DegreeIndex,
        m: &PatternMatch,
        result: Synthesized,
        signature: String,
        reused: bool,
    ) {
        debug_assert_eq!(signature, pattern_signature(index, m));
        let kind = m.kind();
        run.ledger.push(
            result.depth,
            result.output,
            EntryTag::Pattern { kind, reused },
            Some(self.dag.expression(result.output)),
        );
        run.residue.extend(result.residue);
        run.applied.push(AppliedPattern {
            kind,
            signature,
            terms: m.terms().into_iter().map(|id| index.term(id).text().to_string()).collect(),
            output: result.output,
            depth: result.depth,
            reused,
        });
    }

    /// Checks the synthesized output against the polynomial over every
    /// input assignment.
    ///
    /// # Panics
    ///
    /// Panics if the polynomial or the output's support reaches past
    /// [`MAX_VARS`][crate::eval::MAX_VARS] variables.
    pub fn verify(&self, polynomial: &str, result: &FunctionResult) -> bool {
        self.verify_index(&DegreeIndex::group_by_degree(polynomial), result)
    }

    /// Like [`verify`][Self::verify], for an already parsed polynomial.
    ///
    /// # Panics
    ///
    /// Same limit as [`verify`][Self::verify].
    pub fn verify_index(&self, index: &DegreeIndex, result: &FunctionResult) -> bool {
        let num_vars = index.num_vars().max(self.dag.support_size(result.output));
        self.dag.truth_table(result.output, num_vars) == index.truth_table(num_vars)
    }
}
