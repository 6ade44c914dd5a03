use std::collections::BTreeSet;

use log::debug;

use crate::nfa::{Fragment, Nfa, Symbol};
use crate::parser::Token;

/// Compiles a parsed token tree into an NFA via Thompson construction.
///
/// Every token becomes a fragment with exactly one entry and one exit state;
/// fragments are wired into their parent with epsilon edges. Only the final
/// automaton carries the global entry and accepting markers.
pub struct Compiler {
    nfa: Nfa,
}

impl Compiler {
    /// Create a new compiler.
    pub fn new() -> Self {
        Self { nfa: Nfa::new() }
    }

    /// Compile the top-level token sequence, wrapping its fragment with the
    /// global entry and accepting states. An empty sequence compiles to an
    /// automaton accepting exactly the empty input.
    pub fn compile(mut self, tokens: &[Token]) -> Nfa {
        let fragment = self.sequence(tokens);

        let entry = self.nfa.add_state();
        self.nfa.states[entry].start = true;
        self.nfa.add_epsilon(entry, fragment.start);
        self.nfa.start = entry;

        let exit = self.nfa.add_state();
        self.nfa.states[exit].accepting = true;
        self.nfa.add_epsilon(fragment.end, exit);

        debug!("compiled {} top-level tokens into {} states", tokens.len(), self.nfa.states.len());
        self.nfa
    }

    /// Build the fragment for one token.
    fn build(&mut self, token: &Token) -> Fragment {
        match token {
            Token::Literal(byte) => self.literal(*byte),
            Token::Bracket(set) => self.bracket(set),
            Token::Or(left, right) => self.alternation(left, right),
            Token::Repeat { min, max, inner } => self.repeat(*min, *max, inner),
            Token::Sequence(tokens) => self.sequence(tokens),
        }
    }

    /// entry --byte--> exit.
    fn literal(&mut self, byte: u8) -> Fragment {
        let start = self.nfa.add_state();
        let end = self.nfa.add_state();
        self.nfa.add_transition(start, Symbol::Byte(byte), end);
        Fragment { start, end }
    }

    /// One parallel edge per member of the set.
    fn bracket(&mut self, set: &BTreeSet<u8>) -> Fragment {
        let start = self.nfa.add_state();
        let end = self.nfa.add_state();
        for &byte in set {
            self.nfa.add_transition(start, Symbol::Byte(byte), end);
        }
        Fragment { start, end }
    }

    /// Both branch fragments joined through a fresh entry and exit.
    fn alternation(&mut self, left: &[Token], right: &[Token]) -> Fragment {
        let start = self.nfa.add_state();
        let end = self.nfa.add_state();

        let left = self.sequence(left);
        let right = self.sequence(right);
        self.nfa.add_epsilon(start, left.start);
        self.nfa.add_epsilon(start, right.start);
        self.nfa.add_epsilon(left.end, end);
        self.nfa.add_epsilon(right.end, end);

        Fragment { start, end }
    }

    /// Fragments chained with epsilon edges. An empty sequence reduces to a
    /// single epsilon step.
    fn sequence(&mut self, tokens: &[Token]) -> Fragment {
        let (first, rest) = match tokens.split_first() {
            Some(split) => split,
            None => {
                let start = self.nfa.add_state();
                let end = self.nfa.add_state();
                self.nfa.add_epsilon(start, end);
                return Fragment { start, end };
            }
        };

        let mut fragment = self.build(first);
        for token in rest {
            let next = self.build(token);
            self.nfa.add_epsilon(fragment.end, next.start);
            fragment.end = next.end;
        }
        fragment
    }

    /// Unrolled repetition: chained copies of the inner fragment, early
    /// exits once the minimum is satisfied, and a single back-edge from the
    /// overall exit when the repetition is unbounded.
    ///
    /// Unrolling (rather than a single looped fragment) is what lets exact
    /// and bounded counts like `{2,5}` share this construction: the bounded
    /// case stays acyclic, and only the unbounded case gets a cycle.
    fn repeat(&mut self, min: u32, max: Option<u32>, inner: &Token) -> Fragment {
        let start = self.nfa.add_state();
        let end = self.nfa.add_state();

        if min == 0 {
            // The whole repetition may be skipped.
            self.nfa.add_epsilon(start, end);
        }

        let copy_count = match max {
            Some(max) => max,
            None if min == 0 => 1,
            None => min,
        };

        let first = self.build(inner);
        self.nfa.add_epsilon(start, first.start);
        let mut last = first;

        for copy in 2..=copy_count {
            let next = self.build(inner);
            self.nfa.add_epsilon(last.end, next.start);
            if copy > min {
                // The minimum is satisfied; stopping before this copy is
                // allowed.
                self.nfa.add_epsilon(next.start, end);
            }
            last = next;
        }

        self.nfa.add_epsilon(last.end, end);

        if max.is_none() {
            // Back-edge for indefinite repetitions beyond the unrolled
            // copies, reachable only after the last copy has been entered.
            self.nfa.add_epsilon(end, last.start);
        }

        Fragment { start, end }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfa::StateId;
    use crate::parser::parse;

    fn compile(pattern: &str) -> Nfa {
        Compiler::new().compile(&parse(pattern).unwrap())
    }

    /// Depth-first search over every edge kind.
    fn has_cycle(nfa: &Nfa) -> bool {
        fn visit(nfa: &Nfa, id: StateId, colors: &mut [u8]) -> bool {
            match colors[id] {
                1 => return true,
                2 => return false,
                _ => colors[id] = 1,
            }
            let state = &nfa.states[id];
            let targets = state.transitions.values().flatten().chain(state.epsilon.iter());
            for &next in targets.collect::<Vec<_>>() {
                if visit(nfa, next, colors) {
                    return true;
                }
            }
            colors[id] = 2;
            false
        }

        let mut colors = vec![0u8; nfa.states.len()];
        (0..nfa.states.len()).any(|id| visit(nfa, id, &mut colors))
    }

    #[test]
    fn one_entry_and_at_least_one_accepting_state() {
        for pattern in ["", "abc", "a|b|c", "(ab)+c", "[a-f]{2,5}", "a*b?c+"] {
            let nfa = compile(pattern);
            let entries: Vec<StateId> = (0..nfa.states.len())
                .filter(|&id| nfa.states[id].start)
                .collect();
            assert_eq!(entries, vec![nfa.start], "pattern {:?}", pattern);
            assert!(
                nfa.states.iter().any(|state| state.accepting),
                "pattern {:?} has no accepting state",
                pattern,
            );
        }
    }

    #[test]
    fn empty_pattern_is_a_single_epsilon_chain() {
        let nfa = compile("");
        assert_eq!(nfa.states.len(), 4);
        assert!(nfa.states.iter().all(|state| state.transitions.is_empty()));
    }

    #[test]
    fn bounded_repetition_is_acyclic() {
        for pattern in ["a{3}", "a{2,5}", "ab?c", "(ab|cd)e"] {
            assert!(!has_cycle(&compile(pattern)), "pattern {:?}", pattern);
        }
    }

    #[test]
    fn unbounded_repetition_has_a_back_edge() {
        for pattern in ["a*", "a+", "a{2,}", "(ab)+"] {
            assert!(has_cycle(&compile(pattern)), "pattern {:?}", pattern);
        }
    }

    #[test]
    fn compilation_is_deterministic() {
        for pattern in ["abc", "[a-f_.]+@[0-9]{2,3}", "a|b|c"] {
            assert_eq!(compile(pattern), compile(pattern), "pattern {:?}", pattern);
        }
    }
}
