use crate::errors::StepError;
use crate::expr::{expr_equal, flatten, fold_pis};
use crate::machine::compile::compile_decl;
use crate::machine::Flow;
use crate::name::Name;
use crate::state::{CtxEntry, CtxFrame, DataEntry, MetaCtxEntry, Range, ScopeKind, SigEntry, StackEntry, State, SubEntry};
use crate::token::Tok;
use log::debug;

fn require_classifier(entry: &DataEntry, during: &str) -> Result<(), StepError> {
    if entry.klass.is_classifier() {
        Ok(())
    } else {
        Err(StepError::ExpectedClassifier { found: flatten(&entry.klass).join(" "), during: during.to_string() })
    }
}

/// `->` and `.`. The top of the metacontext decides what binding means:
///
/// + a call's argument frame: grab the next argument;
/// + the implicit declaration scope, on `.`: finish a signature entry;
/// + any other binder scope: bind a new variable;
/// + nothing, on `.`: finish a signature entry;
/// + nothing, on `->`: open the implicit declaration scope and bind into it.
pub(crate) fn do_bind(state: &mut State, inst: &Tok) -> Result<Flow, StepError> {
    let during = inst.raw();
    let is_dot = *inst == Tok::Dot;
    match state.meta.last() {
        Some(MetaCtxEntry::Sub(..)) => grab(state, during),
        Some(MetaCtxEntry::Ctx(frame)) if frame.kind == ScopeKind::Decl && is_dot => define(state, during),
        Some(MetaCtxEntry::Ctx(..)) => bind_ctx(state, during),
        None if is_dot => define(state, during),
        None => {
            let origin = state.cframe.pc;
            state.meta.push(MetaCtxEntry::Ctx(CtxFrame::new(ScopeKind::Decl, origin)));
            bind_ctx(state, during)
        }
    }
}

fn bind_ctx(state: &mut State, during: &str) -> Result<Flow, StepError> {
    let entry = state.pop_data(during)?;
    require_classifier(&entry, during)?;
    let name = state.cframe.name.take().or(entry.name);
    let pc = state.cframe.pc;
    state.top_ctx_mut(during)?.entries.push(CtxEntry { name, klass: entry.term, pc });
    Ok(Flow::Advance)
}

/// Appends a signature entry for the declaration ending at the current `.`.
fn define(state: &mut State, during: &str) -> Result<Flow, StepError> {
    let index = state.cframe.pc.tok_stream_index().ok_or_else(|| StepError::OutsideTokenStream { during: during.to_string() })?;
    let entry = state.pop_data(during)?;
    require_classifier(&entry, during)?;
    let klass = match state.meta.last() {
        Some(MetaCtxEntry::Ctx(frame)) if frame.kind == ScopeKind::Decl => {
            let frame = state.pop_ctx(ScopeKind::Decl, during)?;
            fold_pis(frame.binders(), entry.term)
        }
        _ => entry.term,
    };
    let name = state.cframe.name.take().or(entry.name).unwrap_or_else(Name::anonymous);
    let program = Range::new(state.cframe.program.first, index);
    let code = compile_decl(&state.toks[program.first..index]);
    debug!("defined {} : {} at {}..={}", name, flatten(&klass).join(" "), program.first, program.last);
    state.sig.push(SigEntry { name, klass, program, code });
    state.cframe.program = Range::new(index + 1, index + 1);
    Ok(Flow::Advance)
}

/// Takes the next argument of the call in progress.
///
/// The stack must hold, from the top: the parameter's type just elaborated by the callee,
/// the caller's control entry, and the argument the caller supplied. The argument's
/// classifier must equal the parameter's type. The control entry goes back on top so the
/// remaining parameters can reach the caller's next argument the same way.
pub(crate) fn grab(state: &mut State, during: &str) -> Result<Flow, StepError> {
    state.top_sub_mut(during)?;
    let required = state.pop_data(during)?;
    require_classifier(&required, during)?;
    let ctl = state.pop_control(during)?;
    let arg = state.pop_data(during)?;
    if !expr_equal(&arg.klass, &required.term) {
        return Err(StepError::TypeMismatch {
            expected: flatten(&required.term).join(" "),
            got: flatten(&arg.klass).join(" "),
            during: during.to_string(),
        })
    }
    let name = state.cframe.name.take().or(required.name);
    let pc = state.cframe.pc;
    state.top_sub_mut(during)?.entries.push(SubEntry { name, term: arg.term, klass: arg.klass, pc });
    state.stack.push(StackEntry::Control(ctl));
    Ok(Flow::Advance)
}
