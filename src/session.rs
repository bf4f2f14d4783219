//! Knowledge-base builder and session state (spec §3, §4.3, §9 "mutable
//! global state" redesign flag).
//!
//! A [`Session`] is the explicit, reentrant stand-in for the source
//! implementation's module-level globals (`FACTS`, `RULE_GRAPH`, `QUERY`):
//! everything resolution needs is a field on this struct, threaded
//! explicitly instead of hidden behind global state.

use std::collections::HashMap;

use tracing::warn;

use crate::ast::{Expression, Item, Rule, RuleKind, Symbol};
use crate::error::Diagnostic;

/// The rule graph: a multimap from a conclusion symbol to every premise
/// expression that can derive it. Insertion order is preserved (a `Vec`,
/// not a set) since rule-iteration order is part of the resolver's
/// determinism contract (spec §4.4).
pub type RuleGraph<'a> = HashMap<Symbol, Vec<&'a Expression<'a>>>;

/// Mutable resolution state threaded through the whole program.
pub struct Session<'a> {
    pub facts: HashMap<Symbol, bool>,
    pub rule_graph: RuleGraph<'a>,
    /// Snapshot of `facts` right after the source file was loaded, used to
    /// serve the REPL's `RESET` control word (spec §6).
    pub initial_facts: HashMap<Symbol, bool>,
    /// Edges `(premise_symbol, goal)` recorded by [`Session::resolve`] for
    /// every symbol that actually contributed to a successful derivation —
    /// mirroring the original's `graph.add_edge(...)` calls inside
    /// `backwards_chain`, which only fire for a rule that proved its goal.
    /// Consumed by [`crate::graph::export_dot`].
    pub resolution_trace: Vec<(Symbol, Symbol)>,
}

impl<'a> Session<'a> {
    pub fn new() -> Self {
        Self {
            facts: HashMap::new(),
            rule_graph: HashMap::new(),
            initial_facts: HashMap::new(),
            resolution_trace: Vec::new(),
        }
    }

    /// Folds parsed items into this session's fact table and rule graph.
    ///
    /// Returns the ordered list of symbols queried by this batch of items
    /// (duplicates preserved, per spec §3), alongside every [`Diagnostic`]
    /// raised while doing so. Unsupported rule shapes are logged via
    /// `tracing::warn!` *and* collected here rather than returned as a hard
    /// error, matching spec §4.3/§7: the rule is dropped, processing
    /// continues, but batch-mode and REPL callers can still surface exactly
    /// which rules were skipped.
    pub fn load_items(&mut self, items: Vec<Item<'a>>) -> (Vec<Symbol>, Vec<Diagnostic>) {
        let mut queries = Vec::new();
        let mut diagnostics = Vec::new();
        for item in items {
            match item {
                Item::Fact(symbols) => {
                    for s in symbols {
                        self.facts.insert(s, true);
                    }
                }
                Item::Query(symbols) => queries.extend(symbols),
                Item::Rule(rule) => diagnostics.extend(self.insert_rule(rule)),
            }
        }
        (queries, diagnostics)
    }

    /// Records the current fact table as the post-load baseline for `RESET`.
    pub fn checkpoint(&mut self) {
        self.initial_facts = self.facts.clone();
    }

    /// Restores `facts` to the last checkpoint and discards the resolution
    /// trace accumulated since then, since the facts it was derived from no
    /// longer hold.
    pub fn reset(&mut self) {
        self.facts = self.initial_facts.clone();
        self.resolution_trace.clear();
    }

    /// Purges every `false`-valued entry from the fact table so rules
    /// learned since can promote those symbols to `true` (spec §6,
    /// interactive-mode between-line behavior). Asserted-true facts are
    /// retained.
    pub fn purge_false(&mut self) {
        self.facts.retain(|_, &mut v| v);
    }

    fn insert_rule(&mut self, rule: Rule<'a>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        let Some(conclusion_symbols) = flatten_conjunction(rule.conclusion) else {
            let diagnostic = Diagnostic::UnsupportedRuleShape(format!(
                "conclusion of a {:?} rule is not a conjunction of symbols, skipping rule",
                rule.kind
            ));
            warn!("{diagnostic}");
            diagnostics.push(diagnostic);
            return diagnostics;
        };

        for c in &conclusion_symbols {
            self.rule_graph.entry(*c).or_default().push(rule.premise);
        }

        if rule.kind == RuleKind::Iff {
            match flatten_conjunction(rule.premise) {
                Some(premise_symbols) => {
                    for p in &premise_symbols {
                        self.rule_graph.entry(*p).or_default().push(rule.conclusion);
                    }
                }
                None => {
                    let diagnostic = Diagnostic::UnsupportedRuleShape(
                        "IFF premise is not a conjunction of symbols, skipping reverse direction"
                            .to_string(),
                    );
                    warn!("{diagnostic}");
                    diagnostics.push(diagnostic);
                }
            }
        }

        diagnostics
    }
}

impl<'a> Default for Session<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// Flattens a nested conjunction of `Sym` leaves into an ordered list of
/// symbols. Returns `None` if the expression contains anything other than
/// `And` and `Sym` nodes (spec §3: the conclusion invariant).
fn flatten_conjunction(expr: &Expression<'_>) -> Option<Vec<Symbol>> {
    match expr {
        Expression::Sym(s) => Some(vec![*s]),
        Expression::And(l, r) => {
            let mut left = flatten_conjunction(l)?;
            let right = flatten_conjunction(r)?;
            left.extend(right);
            Some(left)
        }
        Expression::Not(_) | Expression::Or(_, _) | Expression::Xor(_, _) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse;
    use crate::lexer::tokenize;
    use bumpalo::Bump;

    fn build<'a>(arena: &'a Bump, source: &str) -> (Session<'a>, Vec<Symbol>, Vec<Diagnostic>) {
        let tokens = tokenize(source).unwrap();
        let items = parse(&tokens, arena).unwrap();
        let mut session = Session::new();
        let (queries, diagnostics) = session.load_items(items);
        (session, queries, diagnostics)
    }

    #[test]
    fn fact_lines_union() {
        let arena = Bump::new();
        let (session, ..) = build(&arena, "= A\n= B\n");
        assert_eq!(session.facts.get(&Symbol('A')), Some(&true));
        assert_eq!(session.facts.get(&Symbol('B')), Some(&true));
    }

    #[test]
    fn implies_indexes_each_conclusion_symbol() {
        let arena = Bump::new();
        let (session, ..) = build(&arena, "A => B + C\n");
        assert_eq!(session.rule_graph.get(&Symbol('B')).unwrap().len(), 1);
        assert_eq!(session.rule_graph.get(&Symbol('C')).unwrap().len(), 1);
    }

    #[test]
    fn unsupported_conclusion_shape_is_skipped() {
        let arena = Bump::new();
        let (session, _, diagnostics) = build(&arena, "A => B | C\n");
        assert!(session.rule_graph.get(&Symbol('B')).is_none());
        assert!(session.rule_graph.get(&Symbol('C')).is_none());
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            diagnostics[0],
            Diagnostic::UnsupportedRuleShape(_)
        ));
    }

    #[test]
    fn iff_inserts_both_directions_when_both_sides_are_conjunctions() {
        let arena = Bump::new();
        let (session, _, diagnostics) = build(&arena, "A <=> B\n");
        assert_eq!(session.rule_graph.get(&Symbol('B')).unwrap().len(), 1);
        assert_eq!(session.rule_graph.get(&Symbol('A')).unwrap().len(), 1);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn iff_falls_back_to_forward_only_when_premise_is_not_a_conjunction() {
        let arena = Bump::new();
        let (session, _, diagnostics) = build(&arena, "A | B <=> C\n");
        assert_eq!(session.rule_graph.get(&Symbol('C')).unwrap().len(), 1);
        assert!(session.rule_graph.get(&Symbol('A')).is_none());
        assert!(session.rule_graph.get(&Symbol('B')).is_none());
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            diagnostics[0],
            Diagnostic::UnsupportedRuleShape(_)
        ));
    }

    #[test]
    fn query_list_preserves_order_and_duplicates() {
        let arena = Bump::new();
        let (_, queries, _) = build(&arena, "? B A B\n");
        assert_eq!(queries, vec![Symbol('B'), Symbol('A'), Symbol('B')]);
    }

    #[test]
    fn purge_false_keeps_true_and_drops_false() {
        let arena = Bump::new();
        let (mut session, ..) = build(&arena, "= A\n");
        session.facts.insert(Symbol('Z'), false);
        session.purge_false();
        assert_eq!(session.facts.get(&Symbol('A')), Some(&true));
        assert_eq!(session.facts.get(&Symbol('Z')), None);
    }

    #[test]
    fn reset_discards_the_resolution_trace() {
        let arena = Bump::new();
        let (mut session, ..) = build(&arena, "= A\n");
        session.checkpoint();
        session.resolution_trace.push((Symbol('A'), Symbol('B')));
        session.reset();
        assert!(session.resolution_trace.is_empty());
    }
}
