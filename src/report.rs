//! Result reporter (spec §4.5).

use std::io::{self, Write};

use crate::ast::Symbol;
use crate::session::Session;

/// Resolves each symbol in `queries`, in order, and writes one
/// `"SYMBOL: true|false"` line per query to `out`.
pub fn report<W: Write>(
    session: &mut Session<'_>,
    queries: &[Symbol],
    out: &mut W,
) -> io::Result<()> {
    for &symbol in queries {
        let value = session.resolve(symbol);
        writeln!(out, "{symbol}: {value}")?;
    }
    Ok(())
}

/// Same as [`report`], but returns the formatted lines instead of writing
/// them, for callers (e.g. the REPL) that want to inspect results before
/// printing.
pub fn report_lines(session: &mut Session<'_>, queries: &[Symbol]) -> Vec<String> {
    queries
        .iter()
        .map(|&symbol| {
            let value = session.resolve(symbol);
            format!("{symbol}: {value}")
        })
        .collect()
}
