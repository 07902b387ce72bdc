use crate::errors::StepError;
use crate::expr::{mk_kind, mk_type};
use crate::name::Name;
use crate::state::{ScopeKind, State};
use crate::token::Tok;
use log::{debug, info, trace, warn};

pub mod bind;
pub mod call;
pub mod compile;
pub mod scope;

/// Default cap on the number of states in a trace. Calls are resolved by name at run time,
/// so a constant that shadows the one its own declaration calls recurses forever.
pub const MAX_STEPS: usize = 1000;

/// Every state a run went through, initial state first.
pub type Trace = Vec<State>;

/// How the program counter moves once an instruction has executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Move to the next instruction of the current frame.
    Advance,
    /// The instruction already set the program counter (a call).
    Jump,
    /// No successor state.
    Halt,
}

/// Executes one instruction against a copy of `state`.
///
/// Returns `Ok(None)` when the instruction halts the machine. On `Err`, `state` is untouched
/// and every partial update made by the failed transition is dropped with the copy.
pub fn exec_instruction(state: &State, inst: &Tok) -> Result<Option<State>, StepError> {
    let mut next = state.clone();
    match exec_in_place(&mut next, inst)? {
        Flow::Advance => {
            next.cframe.pc = next.cframe.pc.next();
            Ok(Some(next))
        }
        Flow::Jump => Ok(Some(next)),
        Flow::Halt => Ok(None),
    }
}

fn exec_in_place(state: &mut State, inst: &Tok) -> Result<Flow, StepError> {
    if state.cframe.reading_name {
        return read_name(state, inst)
    }
    match inst {
        Tok::Type => {
            state.push_data(mk_type(), mk_kind(), None);
            Ok(Flow::Advance)
        }
        Tok::Colon => {
            state.cframe.reading_name = true;
            Ok(Flow::Advance)
        }
        Tok::LParen => scope::open(state, ScopeKind::Pi),
        Tok::RParen => scope::close(state, ScopeKind::Pi, inst.raw()),
        Tok::LBrack => scope::open(state, ScopeKind::Lam),
        Tok::RBrack => scope::close(state, ScopeKind::Lam, inst.raw()),
        Tok::Arrow | Tok::Dot => bind::do_bind(state, inst),
        Tok::Grab => bind::grab(state, inst.raw()),
        Tok::Id { name } => call::exec_id(state, name),
        Tok::Ret => call::ret(state, inst.raw()),
        Tok::Eof => Ok(Flow::Halt),
    }
}

/// After `:`, whatever instruction comes next is taken literally as a name.
fn read_name(state: &mut State, inst: &Tok) -> Result<Flow, StepError> {
    if *inst == Tok::Eof {
        return Err(StepError::MissingName)
    }
    state.cframe.name = Some(Name::new(inst.raw()));
    state.cframe.reading_name = false;
    Ok(Flow::Advance)
}

/// Produces the successor of `state`, or `None` if `state` is terminal: it carries an
/// error, or its current instruction is `EOF`. A failing instruction yields one final
/// state with `error` set and the program counter left on that instruction.
pub fn step_forward(state: &State) -> Option<State> {
    if state.is_error() {
        return None
    }
    let result = state.fetch().and_then(|inst| {
        trace!("{} {}", state.cframe.pc, inst);
        exec_instruction(state, &inst)
    });
    match result {
        Ok(next) => next,
        Err(e) => {
            debug!("step at {} failed: {}", state.cframe.pc, e);
            Some(state.with_error(&e))
        }
    }
}

/// Steps from `state` until there is no successor or the trace holds `max_steps` states.
pub fn run(state: State, max_steps: usize) -> Trace {
    let max_steps = max_steps.max(1);
    let mut states = Vec::new();
    let mut state = state;
    loop {
        let next = step_forward(&state);
        states.push(state);
        match next {
            None => break,
            Some(_) if states.len() >= max_steps => {
                warn!("trace truncated after {} states", max_steps);
                return states
            }
            Some(n) => state = n,
        }
    }
    if let Some(last) = states.last() {
        match last.error.as_ref() {
            Some(e) => info!("run stopped after {} states: {}", states.len(), e),
            None => info!("run finished after {} states with {} signature entries", states.len(), last.sig.len()),
        }
    }
    states
}

/// Tokenizes `input` and runs it with the default step cap.
pub fn run_input(input: &str) -> Trace { run(State::from_input(input), MAX_STEPS) }
