//! Backward-chaining resolver (spec §4.4).
//!
//! Split from [`crate::session`] into its own module the way the teacher
//! keeps `reasoning`'s `assert_fact`/`query_entailment` pair separate from
//! the data it operates over — these are inherent methods on [`Session`],
//! just declared in a different file.

use std::collections::BTreeSet;

use crate::ast::{collect_symbols, Expression, Symbol};
use crate::session::Session;

impl<'a> Session<'a> {
    /// Returns whether `goal` is provable given the current facts and rule
    /// graph, memoizing the result into `facts` as it goes.
    ///
    /// The sentinel `false` written before recursing (step 2) is both the
    /// memo entry and the cycle breaker: a goal that recursively depends on
    /// itself observes that `false` at step 1 of the re-entrant call and
    /// returns immediately, rather than recursing forever.
    ///
    /// A rule that successfully proves `goal` has every symbol in its
    /// premise recorded into `resolution_trace` as an edge to `goal`,
    /// mirroring the original's `graph.add_edge(...)` calls inside
    /// `backwards_chain`, which only fire for a rule that actually fired.
    pub fn resolve(&mut self, goal: Symbol) -> bool {
        if let Some(&value) = self.facts.get(&goal) {
            return value;
        }

        self.facts.insert(goal, false);

        let premises: Vec<&'a Expression<'a>> = self
            .rule_graph
            .get(&goal)
            .cloned()
            .unwrap_or_default();

        for premise in premises {
            if self.eval(premise) {
                self.facts.insert(goal, true);
                let mut deps = BTreeSet::new();
                collect_symbols(premise, &mut deps);
                for dep in deps {
                    self.resolution_trace.push((dep, goal));
                }
                break;
            }
        }

        self.facts[&goal]
    }

    /// Structural evaluation of an expression tree, resolving `Sym` leaves
    /// through [`Session::resolve`]. Evaluation order is left-before-right;
    /// `And`/`Or` short-circuit, which only affects which symbols get
    /// memoized as a side effect, not the final boolean (spec §4.4).
    pub fn eval(&mut self, expr: &'a Expression<'a>) -> bool {
        match expr {
            Expression::Sym(s) => self.resolve(*s),
            Expression::Not(inner) => !self.eval(inner),
            Expression::And(l, r) => self.eval(l) && self.eval(r),
            Expression::Or(l, r) => self.eval(l) || self.eval(r),
            Expression::Xor(l, r) => self.eval(l) != self.eval(r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse;
    use crate::lexer::tokenize;
    use bumpalo::Bump;

    fn resolve_all<'a>(arena: &'a Bump, source: &str) -> (Session<'a>, Vec<(Symbol, bool)>) {
        let tokens = tokenize(source).unwrap();
        let items = parse(&tokens, arena).unwrap();
        let mut session = Session::new();
        let (queries, _) = session.load_items(items);
        let results = queries
            .iter()
            .map(|&s| (s, session.resolve(s)))
            .collect();
        (session, results)
    }

    #[test]
    fn basic_implication() {
        let arena = Bump::new();
        let (_, results) = resolve_all(&arena, "A => B\n= A\n? B\n");
        assert_eq!(results, vec![(Symbol('B'), true)]);
    }

    #[test]
    fn closed_world_false() {
        let arena = Bump::new();
        let (_, results) = resolve_all(&arena, "A => B\n=\n? B\n");
        assert_eq!(results, vec![(Symbol('B'), false)]);
    }

    #[test]
    fn conjunctive_premise_requires_all_conjuncts() {
        let arena = Bump::new();
        let (_, results) = resolve_all(&arena, "A + B => C\n= A B\n? C\n");
        assert_eq!(results, vec![(Symbol('C'), true)]);

        let arena2 = Bump::new();
        let (_, results2) = resolve_all(&arena2, "A + B => C\n= A\n? C\n");
        assert_eq!(results2, vec![(Symbol('C'), false)]);
    }

    #[test]
    fn conjunctive_conclusion_proves_every_symbol() {
        let arena = Bump::new();
        let (_, results) = resolve_all(&arena, "A => B + C\n= A\n? B C\n");
        assert_eq!(results, vec![(Symbol('B'), true), (Symbol('C'), true)]);
    }

    #[test]
    fn cycle_terminates_false() {
        let arena = Bump::new();
        let (_, results) = resolve_all(&arena, "A => B\nB => A\n=\n? A\n");
        assert_eq!(results, vec![(Symbol('A'), false)]);
    }

    #[test]
    fn disjunction_and_negation() {
        let arena = Bump::new();
        let (_, results) = resolve_all(&arena, "A | B => C\n!C => D\n= B\n? C D\n");
        assert_eq!(
            results,
            vec![(Symbol('C'), true), (Symbol('D'), false)]
        );
    }

    #[test]
    fn fact_dominates_rules() {
        // B is declared true directly; it is never reached through A => B's
        // premise, since facts are consulted before the rule graph at all.
        let arena = Bump::new();
        let (_, results) = resolve_all(&arena, "A => B\n= B\n? B\n");
        assert_eq!(results, vec![(Symbol('B'), true)]);
    }

    #[test]
    fn idempotent_repeated_query() {
        let arena = Bump::new();
        let mut session = Session::new();
        let tokens = tokenize("A => B\n= A\n").unwrap();
        let items = parse(&tokens, &arena).unwrap();
        session.load_items(items);
        assert_eq!(session.resolve(Symbol('B')), true);
        assert_eq!(session.resolve(Symbol('B')), true);
    }

    #[test]
    fn monotonic_within_a_session() {
        let arena = Bump::new();
        let mut session = Session::new();
        let tokens = tokenize("A => B\nB => C\n= A\n").unwrap();
        let items = parse(&tokens, &arena).unwrap();
        session.load_items(items);
        assert_eq!(session.resolve(Symbol('C')), true);
        assert_eq!(session.facts.get(&Symbol('C')), Some(&true));
    }

    #[test]
    fn resolve_traces_only_the_rule_that_actually_fired() {
        let arena = Bump::new();
        let mut session = Session::new();
        let tokens = tokenize("A + B => C\nD => C\n= A B\n").unwrap();
        let items = parse(&tokens, &arena).unwrap();
        session.load_items(items);

        assert_eq!(session.resolve(Symbol('C')), true);
        assert!(session.resolution_trace.contains(&(Symbol('A'), Symbol('C'))));
        assert!(session.resolution_trace.contains(&(Symbol('B'), Symbol('C'))));
        assert!(!session.resolution_trace.contains(&(Symbol('D'), Symbol('C'))));
    }

    #[test]
    fn unprovable_goal_leaves_no_trace() {
        let arena = Bump::new();
        let mut session = Session::new();
        let tokens = tokenize("A => B\n=\n").unwrap();
        let items = parse(&tokens, &arena).unwrap();
        session.load_items(items);

        assert_eq!(session.resolve(Symbol('B')), false);
        assert!(session.resolution_trace.is_empty());
    }
}
