//! # anf-synth: shared-gate synthesis of GF(2) polynomials
//!
//! **`anf-synth`** turns Boolean functions given in algebraic normal form (a XOR of
//! monomials) into a circuit of NOT, 2-input AND and 2-input XOR gates, sharing every
//! structurally identical gate across all the functions of a batch.
//!
//! ## How it works
//!
//! For each function the engine:
//!
//! 1. parses the monomials and groups them by degree ([`index`]);
//! 2. repeatedly searches for factoring patterns such as `x0x1x2x3 + x0x1x2 = x0x1x2 (x3 + 1)`
//!    ([`pattern`]) and builds a NOT/AND subtree for each match ([`synth`]);
//! 3. builds the remaining monomials as plain AND trees;
//! 4. XORs all results together in depth order ([`merge`]).
//!
//! Gates live in a hash-consed [`GateDag`][crate::dag::GateDag]: asking twice for the same
//! operation returns the same node. Two catalogs ([`catalog`]) remember matched patterns and
//! XOR merges by canonical expression, so a later function can borrow gates built for an
//! earlier one without searching again.
//!
//! ## Basic Usage
//!
//! ```rust
//! use anf_synth::session::SynthesisSession;
//!
//! let mut session = SynthesisSession::default();
//! let poly = "x0x1x2x3 + x0x1x2 + x4x5 + 1";
//! let result = session.process(poly);
//!
//! println!("output {} at depth {}", result.output, result.depth);
//! assert!(session.verify(poly, &result));
//!
//! for node in session.dag().nodes() {
//!     println!("{} = {} {:?} : {}", node.name(), node.kind(), node.operands(), node.expression);
//! }
//! ```
//!
//! ## Core Components
//!
//! - **[`session`]**: The entry point. [`SynthesisSession`][crate::session::SynthesisSession] owns
//!   the DAG and the catalogs and runs the per-function pipeline.
//! - **[`dag`]**: The shared gate store and AND-tree builder.
//! - **[`expr`]**: Canonical forms of algebraic expressions, used for every reuse key.
//! - **[`eval`]**: Truth tables for checking a circuit against its polynomial.

pub mod catalog;
pub mod config;
pub mod dag;
pub mod debug;
pub mod eval;
pub mod expr;
pub mod gate;
pub mod index;
pub mod ledger;
pub mod merge;
pub mod pattern;
pub mod session;
pub mod signal;
pub mod synth;
pub mod table;
pub mod term;
pub mod types;
pub mod utils;
pub mod varset;
