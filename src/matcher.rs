use log::trace;

use crate::nfa::{Nfa, StateId, Symbol};

/// Recursive backtracking matcher over a compiled automaton.
///
/// Matching is whole-string: acceptance requires reaching an accepting state
/// exactly when the cursor resolves to the end-of-text sentinel, so there is
/// no substring search and no way to skip unmatched leading or trailing
/// bytes.
pub struct Matcher<'a> {
    nfa: &'a Nfa,
}

impl<'a> Matcher<'a> {
    /// Create a new matcher for the given automaton.
    pub fn new(nfa: &'a Nfa) -> Self {
        Self { nfa }
    }

    /// Whether `input` as a whole matches the automaton.
    ///
    /// The traversal explores alternatives by plain recursion and keeps no
    /// visited set, so adversarial patterns can take exponential time and
    /// deeply nested optional constructs can recurse without bound.
    pub fn is_match(&self, input: &str) -> bool {
        trace!("matching {:?} against {} states", input, self.nfa.states.len());
        self.check(self.nfa.start, input.as_bytes(), 0)
    }

    fn check(&self, id: StateId, input: &[u8], pos: usize) -> bool {
        let symbol = symbol_at(input, pos);
        let state = &self.nfa.states[id];

        if symbol == Symbol::End && state.accepting {
            return true;
        }

        // Only the first target keyed by the concrete symbol is tried:
        // construction never yields more than one live target per byte.
        if let Some(&next) = state.transitions.get(&symbol).and_then(|targets| targets.first()) {
            if self.check(next, input, pos + 1) {
                return true;
            }
        }

        for &next in &state.epsilon {
            if self.check(next, input, pos) {
                return true;
            }
            // Consuming the start-of-text sentinel happens here, and only
            // here: every epsilon target may also be entered one position
            // later, which lets backtracking cross alternation and optional
            // leading segments.
            if symbol == Symbol::Start && self.check(next, input, pos + 1) {
                return true;
            }
        }

        false
    }
}

/// Resolve the symbol at a cursor position. Position 0 sits one before the
/// first byte; every position past the input resolves to end-of-text.
fn symbol_at(input: &[u8], pos: usize) -> Symbol {
    if pos == 0 {
        Symbol::Start
    } else if pos > input.len() {
        Symbol::End
    } else {
        Symbol::Byte(input[pos - 1])
    }
}
