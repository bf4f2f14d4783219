//! Optional graph export (spec §2 "graph visualization", explicitly an
//! external collaborator, not core).
//!
//! The original implementation calls `graph.add_edge(...)` only inside
//! `backwards_chain`, and only for a rule that actually proved its goal
//! (`examples/original_source/main.py`'s `backwards_chain`), then pops up a
//! `networkx`/`matplotlib` window of the result. That GUI dependency has no
//! idiomatic-Rust equivalent worth pulling in for a CLI tool, so this
//! collaborator instead writes the same resolution trace as a Graphviz DOT
//! description — viewable with any `dot` renderer, and trivially diffable
//! in a terminal.

use std::io::{self, Write};

use crate::session::Session;

/// Writes a DOT graph with one edge `premise_symbol -> goal` for every
/// symbol that actually contributed to a successful [`Session::resolve`]
/// call made so far — not a static dump of every declared rule. A rule that
/// was never exercised, or that lost to an earlier rule in the same
/// premise list, contributes no edges.
pub fn export_dot<W: Write>(session: &Session<'_>, out: &mut W) -> io::Result<()> {
    writeln!(out, "digraph expert_system {{")?;
    for (premise, goal) in &session.resolution_trace {
        writeln!(out, "  {premise} -> {goal};")?;
    }
    writeln!(out, "}}")
}
