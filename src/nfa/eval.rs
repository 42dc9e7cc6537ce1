use crate::nfa::Nfa;
use std::collections::{BTreeSet, HashSet};

/// Simulation of a [Nfa] over an input: the set of states the automaton can
/// currently be in, kept closed under ε-transitions.
#[derive(Clone, Debug)]
pub struct NfaEvaluator<'a> {
    nfa: &'a Nfa,
    current_states: HashSet<usize>,
}

impl<'a> NfaEvaluator<'a> {
    pub fn is_accepting(&self) -> bool {
        self.current_states
            .iter()
            .any(|&state| self.nfa.states[state].accepting)
    }

    pub fn current_states_idx(&self) -> &HashSet<usize> {
        &self.current_states
    }

    /// The bytes on which any current state has a labeled transition, in
    /// ascending order.
    pub fn outgoing_bytes(&self) -> BTreeSet<u8> {
        self.current_states
            .iter()
            .flat_map(|&state| self.nfa.states[state].transitions.keys().copied())
            .collect()
    }

    /// Steps one clone of this evaluator for every byte in
    /// [NfaEvaluator::outgoing_bytes].
    pub fn step_all(&self) -> Vec<(u8, NfaEvaluator<'a>)> {
        self.outgoing_bytes()
            .into_iter()
            .map(|byte| {
                let mut eval = self.clone();
                eval.step(byte);
                (byte, eval)
            })
            .collect()
    }

    pub fn step(&mut self, byte: u8) {
        self.current_states = self
            .current_states
            .iter()
            .filter_map(|&state| self.nfa.states[state].transitions.get(&byte))
            .flatten()
            .copied()
            .collect();
        self.include_closure();
    }

    pub fn step_multiple(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if self.current_states.is_empty() {
                return;
            }
            self.step(byte);
        }
    }

    fn include_closure(&mut self) {
        let mut updated = true;
        let mut to_push = HashSet::new();
        while updated {
            updated = false;
            for state in self.current_states.iter() {
                for epsilon_state in self.nfa.states[*state].epsilon_transitions.iter() {
                    if !self.current_states.contains(epsilon_state) {
                        updated = true;
                        to_push.insert(*epsilon_state);
                    }
                }
            }
            self.current_states.extend(to_push.drain());
        }
    }
}

impl<'a> From<&'a Nfa> for NfaEvaluator<'a> {
    fn from(value: &'a Nfa) -> Self {
        let mut evaluator = Self {
            nfa: value,
            current_states: HashSet::new(),
        };
        evaluator.current_states.insert(value.initial_state);
        evaluator.include_closure();
        evaluator
    }
}
