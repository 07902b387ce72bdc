use crate::errors::StepError;
use crate::expr::{flatten, fold_lams, fold_pis};
use crate::machine::Flow;
use crate::state::{CtxFrame, MetaCtxEntry, ScopeKind, State};

pub(crate) fn open(state: &mut State, kind: ScopeKind) -> Result<Flow, StepError> {
    let origin = state.cframe.pc;
    state.meta.push(MetaCtxEntry::Ctx(CtxFrame::new(kind, origin)));
    Ok(Flow::Advance)
}

/// Closes the innermost scope, which must have been opened by the matching bracket.
///
/// A Pi scope requires its body to be a classifier and produces the folded Pi type with the
/// body's classifier. A Lambda scope accepts any body and produces the folded lambda,
/// classified by the Pi type folded over the body's classifier.
pub(crate) fn close(state: &mut State, kind: ScopeKind, during: &str) -> Result<Flow, StepError> {
    let body = state.pop_data(during)?;
    if kind == ScopeKind::Pi && !body.klass.is_classifier() {
        return Err(StepError::ExpectedClassifier { found: flatten(&body.klass).join(" "), during: during.to_string() })
    }
    let frame = state.pop_ctx(kind, during)?;
    let name = state.cframe.name.take().or(body.name);
    let (term, klass) = match kind {
        ScopeKind::Lam => (fold_lams(frame.binders(), body.term), fold_pis(frame.binders(), body.klass)),
        ScopeKind::Pi | ScopeKind::Decl => (fold_pis(frame.binders(), body.term), body.klass),
    };
    state.push_data(term, klass, name);
    Ok(Flow::Advance)
}
