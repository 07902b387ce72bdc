//! The read-only view a debugger front end works with: a finished trace, a cursor into it,
//! and what the user has selected. Nothing here mutates a `State`.

use crate::machine::{run, Trace};
use crate::state::{Pc, StackEntry, State};
use std::rc::Rc;

/// Something the user picked in the rendered state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// An entry of the signature, by index.
    SigItem(usize),
    /// A saved control entry on the stack, by stack index.
    CtlItem(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move the cursor by this many frames, clamped to the trace.
    ChangeStep(isize),
    /// Move the cursor to this frame, clamped to the trace.
    SetStep(usize),
    /// Move the cursor to the first frame executing this token-stream index.
    FindPc(usize),
    SetCurrentSel(Option<Selection>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub frame: usize,
    pub states: Rc<[State]>,
    pub selection: Option<Selection>,
}

impl AppState {
    pub fn new(input: &str, max_steps: usize) -> Self { Self::from_trace(run(State::from_input(input), max_steps)) }

    pub fn from_trace(trace: Trace) -> Self { AppState { frame: 0, states: Rc::from(trace), selection: None } }

    pub fn current(&self) -> &State { &self.states[self.frame] }

    pub fn last_frame(&self) -> usize { self.states.len().saturating_sub(1) }

    fn with_frame(&self, frame: usize) -> Self {
        AppState { frame: frame.min(self.last_frame()), states: self.states.clone(), selection: self.selection }
    }

    pub fn next_step(&self) -> Self { self.reduce(Action::ChangeStep(1)) }

    pub fn prev_step(&self) -> Self { self.reduce(Action::ChangeStep(-1)) }

    /// The dispatch function: the state after `action`, leaving `self` as it was.
    pub fn reduce(&self, action: Action) -> Self {
        match action {
            Action::ChangeStep(delta) => {
                let frame = if delta < 0 { self.frame.saturating_sub(delta.unsigned_abs()) } else { self.frame.saturating_add(delta as usize) };
                self.with_frame(frame)
            }
            Action::SetStep(frame) => self.with_frame(frame),
            Action::FindPc(index) => {
                let target = Pc::TokStream { index };
                match self.states.iter().position(|s| s.cframe.pc == target) {
                    Some(frame) => self.with_frame(frame),
                    None => self.clone(),
                }
            }
            Action::SetCurrentSel(selection) => AppState { selection, ..self.clone() },
        }
    }
}

impl State {
    /// Whether token-stream index `index` belongs to what `selection` points at.
    pub fn is_token_highlighted(&self, selection: Selection, index: usize) -> bool {
        match selection {
            Selection::SigItem(ix) => self.sig.get(ix).map(|e| e.program.contains(index)).unwrap_or(false),
            Selection::CtlItem(ix) => match self.stack.get(ix) {
                Some(StackEntry::Control(ctl)) => ctl.pc == Pc::TokStream { index },
                _ => false,
            },
        }
    }
}
