use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// The placeholder used for binders and signature entries that were never given a name.
pub const ANON: &str = "_";

/// An identifier naming a signature constant or a bound variable.
///
/// Names are compared by their text; the `Rc` only makes the many snapshot copies
/// the trace keeps around cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Name(Rc<str>);

impl Name {
    pub fn new(s: &str) -> Self { Name(Rc::from(s)) }

    pub fn anonymous() -> Self { Name::new(ANON) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for Name {
    fn from(s: &str) -> Name { Name::new(s) }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool { self.as_str() == other }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool { self.as_str() == *other }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Renders an optional binder name, using the anonymous placeholder when absent.
pub fn name_or_anon(name: Option<&Name>) -> &str { name.map(Name::as_str).unwrap_or(ANON) }
