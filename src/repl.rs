//! Interactive mode (spec §6 "Interactive mode (collaborator)").
//!
//! Continues the teacher's `main.rs` use of `reedline` for line editing.
//! Each line is parsed as a single item-stream and folded into the running
//! [`Session`]; `QUIT`/`EXIT` end the session, `RESET` restores the fact
//! table to its post-file-load state. Diagnostics from skipped rules are
//! printed inline, alongside that line's query results.

use bumpalo::Bump;
use reedline::{DefaultPrompt, Reedline, Signal};

use crate::ast::parse;
use crate::lexer::tokenize;
use crate::report::report_lines;
use crate::session::Session;

pub fn run<'a>(arena: &'a Bump, session: &mut Session<'a>) {
    let mut line_editor = Reedline::create();
    let prompt = DefaultPrompt::default();

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(buffer)) => {
                let line = buffer.trim();
                if line.is_empty() {
                    continue;
                }
                match line.to_ascii_uppercase().as_str() {
                    "QUIT" | "EXIT" => break,
                    "RESET" => {
                        session.reset();
                        continue;
                    }
                    _ => {}
                }

                session.purge_false();

                let mut source = line.to_string();
                source.push('\n');

                let tokens = match tokenize(&source) {
                    Ok(t) => t,
                    Err(e) => {
                        eprintln!("{e}");
                        continue;
                    }
                };
                let items = match parse(&tokens, arena) {
                    Ok(items) => items,
                    Err(e) => {
                        eprintln!("{e}");
                        continue;
                    }
                };
                let (queries, diagnostics) = session.load_items(items);
                for diagnostic in &diagnostics {
                    println!("{diagnostic}");
                }
                for line in report_lines(session, &queries) {
                    println!("{line}");
                }
            }
            Ok(Signal::CtrlC) | Ok(Signal::CtrlD) => break,
            Err(err) => {
                eprintln!("{err}");
                break;
            }
        }
    }
}
