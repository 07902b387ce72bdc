use crate::errors::StepError;
use crate::expr::ExprPtr;
use crate::name::Name;
use crate::parser::{parse, Program};
use crate::token::Tok;
use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// An inclusive range of token-stream indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Range {
    pub first: usize,
    pub last: usize,
}

impl Range {
    pub fn new(first: usize, last: usize) -> Self { Range { first, last } }

    pub fn contains(&self, index: usize) -> bool { index >= self.first && index <= self.last }
}

/// Where the next instruction comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "t")]
pub enum Pc {
    /// An index into the flat token stream.
    #[serde(rename = "tokstream")]
    TokStream { index: usize },
    /// An index into the compiled code of signature entry `sig_ix`.
    #[serde(rename = "sigEntry", rename_all = "camelCase")]
    SigEntry { sig_ix: usize, tok_ix: usize },
}

impl Pc {
    pub fn start() -> Self { Pc::TokStream { index: 0 } }

    pub fn next(self) -> Self {
        match self {
            Pc::TokStream { index } => Pc::TokStream { index: index + 1 },
            Pc::SigEntry { sig_ix, tok_ix } => Pc::SigEntry { sig_ix, tok_ix: tok_ix + 1 },
        }
    }

    pub fn tok_stream_index(self) -> Option<usize> {
        match self {
            Pc::TokStream { index } => Some(index),
            Pc::SigEntry { .. } => None,
        }
    }
}

impl fmt::Display for Pc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pc::TokStream { index } => write!(f, "{}", index),
            Pc::SigEntry { sig_ix, tok_ix } => write!(f, "sig[{}]:{}", sig_ix, tok_ix),
        }
    }
}

/// A finished signature constant. `program` is the declaration's range in the token
/// stream; `code` is what a call to the constant executes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigEntry {
    pub name: Name,
    pub klass: ExprPtr,
    pub program: Range,
    pub code: Rc<[Tok]>,
}

/// A variable bound by an open Pi, Lambda or declaration scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CtxEntry {
    pub name: Option<Name>,
    pub klass: ExprPtr,
    pub pc: Pc,
}

/// An argument captured by a call in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubEntry {
    pub name: Option<Name>,
    pub term: ExprPtr,
    pub klass: ExprPtr,
    pub pc: Pc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    /// Opened by `(`, closed by `)`.
    Pi,
    /// Opened by `[`, closed by `]`.
    Lam,
    /// Opened implicitly by a top-level `->`, closed by the declaration's `.`.
    Decl,
}

impl ScopeKind {
    pub fn describe(self) -> &'static str {
        match self {
            ScopeKind::Pi => "pi scope",
            ScopeKind::Lam => "lambda scope",
            ScopeKind::Decl => "declaration scope",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CtxFrame {
    pub kind: ScopeKind,
    pub origin: Pc,
    pub entries: Vec<CtxEntry>,
}

impl CtxFrame {
    pub fn new(kind: ScopeKind, origin: Pc) -> Self { CtxFrame { kind, origin, entries: Vec::new() } }

    pub fn binders<'a>(&'a self) -> impl DoubleEndedIterator<Item = (Option<&'a Name>, &'a ExprPtr)> + 'a {
        self.entries.iter().map(|e| (e.name.as_ref(), &e.klass))
    }
}

/// The argument frame of one call to signature entry `sig_ix`, named `cid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubFrame {
    pub cid: Name,
    pub sig_ix: usize,
    pub origin: Pc,
    pub entries: Vec<SubEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "t", rename_all = "lowercase")]
pub enum MetaCtxEntry {
    Ctx(CtxFrame),
    Sub(SubFrame),
}

impl MetaCtxEntry {
    pub fn describe(&self) -> &'static str {
        match self {
            MetaCtxEntry::Ctx(frame) => frame.kind.describe(),
            MetaCtxEntry::Sub(..) => "sub",
        }
    }
}

/// The active cursor: where execution is, which declaration range it is in,
/// and the name read by the most recent `:` that has not been used yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CtlEntry {
    pub pc: Pc,
    pub program: Range,
    pub name: Option<Name>,
    pub reading_name: bool,
}

impl CtlEntry {
    pub fn new(pc: Pc, program: Range) -> Self { CtlEntry { pc, program, name: None, reading_name: false } }
}

/// A value together with its classifier. `name` carries a name read inside a scope
/// out to the binder that will consume the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataEntry {
    pub term: ExprPtr,
    pub klass: ExprPtr,
    pub name: Option<Name>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "t", rename_all = "lowercase")]
pub enum StackEntry {
    Data(DataEntry),
    /// The caller's frame, saved by a call and restored by the matching `ret`.
    Control(CtlEntry),
}

/// What an identifier resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// An argument of a call in progress.
    Sub { term: ExprPtr, klass: ExprPtr },
    /// A variable bound by an open scope.
    Ctx { klass: ExprPtr },
    /// A signature constant, by index.
    Sig(usize),
}

/// One complete snapshot of the machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub cframe: CtlEntry,
    pub sig: Vec<SigEntry>,
    pub meta: Vec<MetaCtxEntry>,
    pub stack: Vec<StackEntry>,
    pub toks: Rc<[Tok]>,
    pub orig_toks: Rc<[Vec<Tok>]>,
    pub error: Option<String>,
}

pub fn mk_state(program: Program) -> State {
    State {
        cframe: CtlEntry::new(Pc::start(), Range::new(0, 0)),
        sig: Vec::new(),
        meta: Vec::new(),
        stack: Vec::new(),
        toks: program.toks,
        orig_toks: program.orig_toks,
        error: None,
    }
}

impl State {
    pub fn from_input(input: &str) -> Self { mk_state(parse(input)) }

    pub fn is_error(&self) -> bool { self.error.is_some() }

    pub(crate) fn with_error(&self, err: &StepError) -> Self {
        let mut failed = self.clone();
        failed.error = Some(err.to_string());
        failed
    }

    /// The instruction at `pc`, if `pc` addresses one.
    pub fn instruction_at(&self, pc: Pc) -> Option<&Tok> {
        match pc {
            Pc::TokStream { index } => self.toks.get(index),
            Pc::SigEntry { sig_ix, tok_ix } => self.sig.get(sig_ix).and_then(|e| e.code.get(tok_ix)),
        }
    }

    pub fn pc_is_valid(&self, pc: Pc) -> bool { self.instruction_at(pc).is_some() }

    pub(crate) fn fetch(&self) -> Result<Tok, StepError> {
        self.instruction_at(self.cframe.pc).cloned().ok_or_else(|| StepError::PcOutOfBounds(self.cframe.pc.to_string()))
    }

    pub fn sig_entry(&self, name: &str) -> Option<&SigEntry> { self.sig.iter().rev().find(|e| e.name == name) }

    pub fn control_depth(&self) -> usize { self.stack.iter().filter(|e| matches!(e, StackEntry::Control(..))).count() }

    pub(crate) fn push_data(&mut self, term: ExprPtr, klass: ExprPtr, name: Option<Name>) {
        self.stack.push(StackEntry::Data(DataEntry { term, klass, name }))
    }

    pub(crate) fn pop_data(&mut self, during: &str) -> Result<DataEntry, StepError> {
        match self.stack.pop() {
            None => Err(StepError::stack_underflow(during)),
            Some(StackEntry::Data(d)) => Ok(d),
            Some(StackEntry::Control(..)) => Err(StepError::expected_data(during)),
        }
    }

    pub(crate) fn pop_control(&mut self, during: &str) -> Result<CtlEntry, StepError> {
        match self.stack.pop() {
            None => Err(StepError::stack_underflow(during)),
            Some(StackEntry::Control(c)) => Ok(c),
            Some(StackEntry::Data(..)) => Err(StepError::expected_control(during)),
        }
    }

    pub(crate) fn pop_meta(&mut self, during: &str) -> Result<MetaCtxEntry, StepError> {
        self.meta.pop().ok_or_else(|| StepError::meta_underflow(during))
    }

    /// Pops the top frame, which must be a binder scope of the given kind.
    pub(crate) fn pop_ctx(&mut self, kind: ScopeKind, during: &str) -> Result<CtxFrame, StepError> {
        match self.pop_meta(during)? {
            MetaCtxEntry::Ctx(frame) if frame.kind == kind => Ok(frame),
            owise => Err(StepError::meta_mismatch(kind.describe(), owise.describe(), during)),
        }
    }

    pub(crate) fn pop_sub(&mut self, during: &str) -> Result<SubFrame, StepError> {
        match self.pop_meta(during)? {
            MetaCtxEntry::Sub(frame) => Ok(frame),
            owise => Err(StepError::meta_mismatch("sub", owise.describe(), during)),
        }
    }

    pub(crate) fn top_ctx_mut(&mut self, during: &str) -> Result<&mut CtxFrame, StepError> {
        match self.meta.last_mut() {
            None => Err(StepError::meta_underflow(during)),
            Some(MetaCtxEntry::Ctx(frame)) => Ok(frame),
            Some(owise) => Err(StepError::meta_mismatch("ctx", owise.describe(), during)),
        }
    }

    pub(crate) fn top_sub_mut(&mut self, during: &str) -> Result<&mut SubFrame, StepError> {
        match self.meta.last_mut() {
            None => Err(StepError::meta_underflow(during)),
            Some(MetaCtxEntry::Sub(frame)) => Ok(frame),
            Some(owise) => Err(StepError::meta_mismatch("sub", owise.describe(), during)),
        }
    }

    /// Resolves `name` against the open scopes, newest frame and newest entry first,
    /// then against the signature, newest entry first.
    ///
    /// Inside a signature entry's code only the scopes of the current call are visible:
    /// the walk ends at the newest argument frame, so the caller's binders never leak in.
    pub fn lookup(&self, name: &Name) -> Option<Binding> {
        let in_call = matches!(self.cframe.pc, Pc::SigEntry { .. });
        for frame in self.meta.iter().rev() {
            match frame {
                MetaCtxEntry::Sub(sub) => {
                    if let Some(e) = sub.entries.iter().rev().find(|e| e.name.as_ref() == Some(name)) {
                        return Some(Binding::Sub { term: e.term.clone(), klass: e.klass.clone() })
                    }
                    if in_call {
                        break
                    }
                }
                MetaCtxEntry::Ctx(ctx) => {
                    if let Some(e) = ctx.entries.iter().rev().find(|e| e.name.as_ref() == Some(name)) {
                        return Some(Binding::Ctx { klass: e.klass.clone() })
                    }
                }
            }
        }
        self.sig.iter().rposition(|e| e.name == *name).map(Binding::Sig)
    }
}
