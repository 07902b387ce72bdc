use crate::name::{Name, ANON};
use serde::Serialize;
use std::rc::Rc;

use Expr::*;

pub type ExprPtr = Rc<Expr>;

/// Terms and types share one syntax. `Kind` classifies `Type`, and nothing classifies `Kind`.
///
/// Application spines are stored in parameter order: `spine[0]` is the argument for the
/// head's first parameter. Since the first parameter grabs the value nearest the top of the
/// stack, the postfix source `x s y b` elaborates to `b·(y, s·(x))`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "t", rename_all = "lowercase")]
pub enum Expr {
    Type,
    Kind,
    Pi {
        name: Option<Name>,
        a: ExprPtr,
        b: ExprPtr,
    },
    Lam {
        name: Option<Name>,
        a: ExprPtr,
        m: ExprPtr,
    },
    AppC {
        cid: Name,
        spine: Vec<ExprPtr>,
    },
    AppV {
        head: Name,
        spine: Vec<ExprPtr>,
    },
}

pub fn mk_type() -> ExprPtr { Rc::new(Type) }

pub fn mk_kind() -> ExprPtr { Rc::new(Kind) }

pub fn mk_pi(name: Option<Name>, a: ExprPtr, b: ExprPtr) -> ExprPtr { Rc::new(Pi { name, a, b }) }

pub fn mk_lam(name: Option<Name>, a: ExprPtr, m: ExprPtr) -> ExprPtr { Rc::new(Lam { name, a, m }) }

pub fn mk_appc(cid: Name, spine: Vec<ExprPtr>) -> ExprPtr { Rc::new(AppC { cid, spine }) }

pub fn mk_appv(head: Name, spine: Vec<ExprPtr>) -> ExprPtr { Rc::new(AppV { head, spine }) }

/// A constant applied to nothing.
pub fn mk_const(cid: &str) -> ExprPtr { mk_appc(Name::new(cid), Vec::new()) }

impl Expr {
    /// `Type` and `Kind` are the only things allowed to classify a binder's domain
    /// or a signature entry's declared type.
    pub fn is_classifier(&self) -> bool { matches!(self, Type | Kind) }

    pub fn binder_name(&self) -> Option<&Name> {
        match self {
            Pi { name, .. } | Lam { name, .. } => name.as_ref(),
            _ => None,
        }
    }
}

/// Serializes an expression into the atom sequence used as an equality oracle.
///
/// Applications emit their (reversed) spine followed by the head, so the output reads like
/// the postfix source that produced the term. Binders emit a marker and the literal `_`
/// in place of their bound name, while occurrences of a bound variable still emit the
/// variable's own name. That asymmetry is why this is not alpha-equivalence: terms that
/// differ only by a binder's name can compare unequal, and a variable captured by an inner
/// binder of the same name can compare equal to a genuinely bound one.
pub fn flatten(e: &Expr) -> Vec<String> {
    let mut out = Vec::new();
    flatten_into(e, &mut out);
    out
}

fn flatten_into(e: &Expr, out: &mut Vec<String>) {
    match e {
        Type => out.push("type".to_string()),
        Kind => out.push("kind".to_string()),
        Pi { a, b, .. } => {
            out.push("pi".to_string());
            out.push(ANON.to_string());
            flatten_into(a, out);
            flatten_into(b, out);
        }
        Lam { a, m, .. } => {
            out.push("lam".to_string());
            out.push(ANON.to_string());
            flatten_into(a, out);
            flatten_into(m, out);
        }
        AppC { cid: head, spine } | AppV { head, spine } => {
            for arg in spine.iter().rev() {
                flatten_into(arg, out);
            }
            out.push(head.to_string());
        }
    }
}

/// Two expressions are equal iff their flattened forms are equal as strings.
pub fn expr_equal(e1: &Expr, e2: &Expr) -> bool { flatten(e1).join(" ") == flatten(e2).join(" ") }

/// Wraps `body` in one `Pi` per binder, first binder outermost.
pub fn fold_pis<'a, I>(binders: I, body: ExprPtr) -> ExprPtr
where
    I: DoubleEndedIterator<Item = (Option<&'a Name>, &'a ExprPtr)>, {
    binders.rev().fold(body, |acc, (name, a)| mk_pi(name.cloned(), a.clone(), acc))
}

/// Wraps `body` in one `Lam` per binder, first binder outermost.
pub fn fold_lams<'a, I>(binders: I, body: ExprPtr) -> ExprPtr
where
    I: DoubleEndedIterator<Item = (Option<&'a Name>, &'a ExprPtr)>, {
    binders.rev().fold(body, |acc, (name, a)| mk_lam(name.cloned(), a.clone(), acc))
}
