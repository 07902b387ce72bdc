use crate::errors::StepError;
use crate::expr::{flatten, mk_appc, mk_appv};
use crate::machine::Flow;
use crate::name::Name;
use crate::state::{Binding, CtlEntry, MetaCtxEntry, Pc, StackEntry, State, SubFrame};

/// A bound name pushes its value in place; a signature constant is called.
pub(crate) fn exec_id(state: &mut State, name: &Name) -> Result<Flow, StepError> {
    match state.lookup(name) {
        Some(Binding::Sub { term, klass }) => {
            state.push_data(term, klass, None);
            Ok(Flow::Advance)
        }
        Some(Binding::Ctx { klass }) => {
            state.push_data(mk_appv(name.clone(), Vec::new()), klass, None);
            Ok(Flow::Advance)
        }
        Some(Binding::Sig(sig_ix)) => call(state, sig_ix),
        None => Err(StepError::NotFound(name.to_string())),
    }
}

/// Opens an argument frame, saves the caller's frame on the stack and jumps to the
/// first instruction of the callee's code.
fn call(state: &mut State, sig_ix: usize) -> Result<Flow, StepError> {
    let (cid, program) = {
        let entry = &state.sig[sig_ix];
        (entry.name.clone(), entry.program)
    };
    let origin = state.cframe.pc;
    state.meta.push(MetaCtxEntry::Sub(SubFrame { cid, sig_ix, origin, entries: Vec::new() }));
    let callee = CtlEntry::new(Pc::SigEntry { sig_ix, tok_ix: 0 }, program);
    let caller = std::mem::replace(&mut state.cframe, callee);
    state.stack.push(StackEntry::Control(caller));
    Ok(Flow::Jump)
}

/// Ends a call. The callee's code has left its result type on the stack; the call
/// produces the constant applied to the captured arguments, classified by that type.
pub(crate) fn ret(state: &mut State, during: &str) -> Result<Flow, StepError> {
    let witness = state.pop_data(during)?;
    if !witness.klass.is_classifier() {
        return Err(StepError::ExpectedClassifier { found: flatten(&witness.klass).join(" "), during: during.to_string() })
    }
    let frame = state.pop_sub(during)?;
    state.cframe = state.pop_control(during)?;
    let spine = frame.entries.into_iter().map(|e| e.term).collect();
    state.push_data(mk_appc(frame.cid, spine), witness.term, None);
    Ok(Flow::Advance)
}
