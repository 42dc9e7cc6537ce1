//! # Nondeterministic finite automaton
//! The NFA module includes the [Nfa] struct, the intermediate representation
//! between a parsed pattern and the executable [Dfa]. An NFA is produced by
//! [Ast::to_nfa](crate::ast::Ast::to_nfa) (Thompson construction) and
//! consumed by [Nfa::to_dfa] (subset construction).
//!
//! States live in an arena `Vec` and reference each other by index, both for
//! labeled transitions (`byte → set of states`) and for ε-transitions (taken
//! without consuming input). Loop constructs like `*` and `+` make the state
//! graph cyclic; the index encoding keeps ownership acyclic regardless.
//!
//! An NFA can match input directly through [Nfa::accepts], which simulates
//! the set of active states with a [NfaEvaluator]. Every step keeps the set
//! closed under ε-transitions, so matching never backtracks; the price is
//! that each input byte costs up to the number of active states. Converting
//! to a DFA pays that cost once per distinct state set instead of once per
//! input byte:
//!
//! ```
//! use refa::parser;
//!
//! let nfa = parser::pattern("(ab)*").unwrap().to_nfa();
//! assert!(nfa.accepts("abab"));
//! assert!(!nfa.accepts("aba"));
//!
//! let dfa = nfa.to_dfa();
//! assert!(dfa.accepts("abab"));
//! assert!(!dfa.accepts("aba"));
//! ```
//!
//! The subset construction only creates DFA states for the ε-closed state
//! sets actually reachable from the initial closure, so the exponential worst
//! case of the full powerset stays theoretical for typical patterns.

use crate::dfa::{Dfa, DfaState};
pub use eval::NfaEvaluator;
use std::collections::{HashMap, HashSet};

pub mod eval;

/// A nondeterministic finite automaton with ε-moves, a single initial state
/// and any number of accepting states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nfa {
    pub(crate) states: Vec<NfaState>,
    pub(crate) initial_state: usize,
}

/// A state in a NFA: its labeled transitions (per byte, a set of target
/// state indices), its ε-transitions, and whether it is accepting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NfaState {
    pub(crate) transitions: HashMap<u8, Vec<usize>>,
    pub(crate) epsilon_transitions: Vec<usize>,
    pub(crate) accepting: bool,
}

impl NfaState {
    /// Checks if this state is accepting
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Gets the labeled transitions of this state, as target state indices
    /// per byte
    pub fn transitions(&self) -> &HashMap<u8, Vec<usize>> {
        &self.transitions
    }

    /// Gets the ε-transitions of this state as target state indices
    pub fn epsilon_transitions(&self) -> &[usize] {
        self.epsilon_transitions.as_slice()
    }
}

impl Nfa {
    /// Checks if this automaton accepts the given input. This is equivalent
    /// to getting the evaluator, stepping it over the input and checking if
    /// it is accepting.
    pub fn accepts(&self, input: impl AsRef<[u8]>) -> bool {
        let mut eval = self.evaluator();
        eval.step_multiple(input.as_ref());
        eval.is_accepting()
    }

    /// Gets an evaluator, which is a struct that is used to evaluate inputs
    /// with the automaton
    pub fn evaluator(&self) -> NfaEvaluator<'_> {
        self.into()
    }

    /// Converts this NFA to a DFA using the subset construction. Each state
    /// of the resulting DFA corresponds to one distinct ε-closed set of NFA
    /// states reachable from the initial closure; the set is retained in the
    /// DFA state as its identity. The initial state of the result is always
    /// index 0, and the state numbering is deterministic for a given NFA.
    pub fn to_dfa(&self) -> Dfa {
        // Mapping the sorted set of NFA states to the new state index
        let mut map = HashMap::new();
        // Evaluators to explore
        let mut to_explore = vec![self.evaluator()];
        let mut states = Vec::new();

        {
            let initial = &to_explore[0];
            let key = set_to_vec(initial.current_states_idx());
            states.push(DfaState {
                accepting: initial.is_accepting(),
                nfa_states: key.clone(),
                transitions: HashMap::new(),
            });
            map.insert(key, 0usize);
        }

        // While we have non-expanded state sets
        while let Some(eval) = to_explore.pop() {
            let from = map[&set_to_vec(eval.current_states_idx())];
            for (byte, stepped) in eval.step_all() {
                if stepped.current_states_idx().is_empty() {
                    // No edge: the byte leads nowhere, rejection is implicit
                    continue;
                }
                let accepting = stepped.is_accepting();
                let key = set_to_vec(stepped.current_states_idx());
                let target = match map.get(&key) {
                    Some(&target) => target,
                    None => {
                        let target = states.len();
                        states.push(DfaState {
                            accepting,
                            nfa_states: key.clone(),
                            transitions: HashMap::new(),
                        });
                        map.insert(key, target);
                        to_explore.push(stepped);
                        target
                    }
                };
                states[from].transitions.insert(byte, target);
            }
        }

        Dfa {
            states,
            initial_state: 0,
        }
    }

    /// Gets the states of this NFA
    pub fn states(&self) -> &[NfaState] {
        self.states.as_slice()
    }

    /// Gets the initial state of this NFA
    pub fn initial_state(&self) -> &NfaState {
        &self.states[self.initial_state]
    }

    /// Gets the index of the initial state of this NFA
    pub fn initial_state_index(&self) -> usize {
        self.initial_state
    }
}

/// Converts a HashSet (which is not hashable) to a Vec (which is hashable)
/// in a deterministic way
fn set_to_vec(set: &HashSet<usize>) -> Vec<usize> {
    let mut vec = set.iter().copied().collect::<Vec<_>>();
    vec.sort_unstable();
    vec
}

#[cfg(test)]
mod tests {
    use crate::parser;

    #[test]
    fn evaluator_starts_in_the_initial_closure() {
        // (ab)* opens with ε-edges from the initial state through the loop
        // state to the accepting exit, all part of the initial closure
        let nfa = parser::pattern("(ab)*").unwrap().to_nfa();
        let eval = nfa.evaluator();
        let states = eval.current_states_idx();
        assert!(states.contains(&nfa.initial_state_index()));
        assert!(states.iter().any(|&idx| nfa.states()[idx].is_accepting()));
        assert_eq!(states.len(), 3);
    }

    #[test]
    fn nfa_matches_without_conversion() {
        let nfa = parser::pattern("a?b+c*").unwrap().to_nfa();
        for accepted in ["b", "ab", "bc", "abc", "abcc", "bcc"] {
            assert!(nfa.accepts(accepted), "{accepted:?} should be accepted");
        }
        for rejected in ["", "a", "c", "ac", "ba"] {
            assert!(!nfa.accepts(rejected), "{rejected:?} should be rejected");
        }
    }

    #[test]
    fn subset_construction_deduplicates_state_sets() {
        let dfa = parser::pattern("(a|b)*abb").unwrap().to_nfa().to_dfa();
        let sets = dfa
            .states()
            .iter()
            .map(|state| state.nfa_states().to_vec())
            .collect::<Vec<_>>();
        for (i, set) in sets.iter().enumerate() {
            for other in &sets[i + 1..] {
                assert_ne!(set, other, "two DFA states share a NFA state set");
            }
        }
    }

    #[test]
    fn dfa_accepting_flags_mirror_constituents() {
        let pattern = parser::pattern("(foo)+|bar").unwrap();
        let nfa = pattern.to_nfa();
        let dfa = nfa.to_dfa();
        for state in dfa.states() {
            let expected = state
                .nfa_states()
                .iter()
                .any(|&idx| nfa.states()[idx].is_accepting());
            assert_eq!(state.is_accepting(), expected);
        }
    }
}
