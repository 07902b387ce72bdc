use crate::expr::{Expr, Expr::*};
use crate::name::name_or_anon;
use crate::state::{CtlEntry, MetaCtxEntry, SigEntry, StackEntry, State};
use crate::token::Tok;
use serde::Deserialize;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct PpOptions {
    /// Use `→`, `Π`, `λ`, `·` and friends instead of their ASCII spellings.
    #[serde(default)]
    pub unicode: bool,
}

/// Renders machine values as plain text, one line per item.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrettyPrinter {
    pub options: PpOptions,
}

impl PrettyPrinter {
    pub fn new(options: PpOptions) -> Self { PrettyPrinter { options } }

    pub fn tok(&self, tok: &Tok) -> String {
        if !self.options.unicode {
            return tok.raw().to_string()
        }
        match tok {
            Tok::Type => "*".to_string(),
            Tok::Arrow => "→".to_string(),
            Tok::Grab => "▷".to_string(),
            Tok::Ret => "⤶".to_string(),
            owise => owise.raw().to_string(),
        }
    }

    pub fn code(&self, code: &[Tok]) -> String { code.iter().map(|t| self.tok(t)).collect::<Vec<_>>().join(" ") }

    fn app(&self, head: &str, spine: &[crate::expr::ExprPtr]) -> String {
        if spine.is_empty() {
            head.to_string()
        } else {
            let args = spine.iter().map(|e| self.expr(e)).collect::<Vec<_>>().join(", ");
            if self.options.unicode {
                format!("{}·({})", head, args)
            } else {
                format!("{}({})", head, args)
            }
        }
    }

    pub fn expr(&self, e: &Expr) -> String {
        let u = self.options.unicode;
        match e {
            Type => "type".to_string(),
            Kind => "kind".to_string(),
            Pi { name: None, a, b } => format!("({}) {} {}", self.expr(a), if u { "→" } else { "->" }, self.expr(b)),
            Pi { name: Some(n), a, b } => format!("{} {}:{}. {}", if u { "Π" } else { "Pi" }, n, self.expr(a), self.expr(b)),
            Lam { name, a, m } => {
                format!("{}{}:{}. {}", if u { "λ " } else { "\\" }, name_or_anon(name.as_ref()), self.expr(a), self.expr(m))
            }
            AppC { cid, spine } => self.app(cid.as_str(), spine),
            AppV { head, spine } => self.app(head.as_str(), spine),
        }
    }

    pub fn sig_entry(&self, entry: &SigEntry) -> String {
        format!("{} : {} [{}]", entry.name, self.expr(&entry.klass), self.code(&entry.code))
    }

    pub fn ctl_entry(&self, state: &State, ctl: &CtlEntry) -> String {
        let mut s = match state.instruction_at(ctl.pc) {
            Some(tok) => format!("{} ({})", ctl.pc, self.tok(tok)),
            None => format!("{}", ctl.pc),
        };
        if ctl.reading_name {
            s.push_str(", name: ?");
        } else if let Some(name) = ctl.name.as_ref() {
            let _ = write!(s, ", name: {}", name);
        }
        s
    }

    pub fn stack_entry(&self, state: &State, entry: &StackEntry) -> String {
        match entry {
            StackEntry::Data(d) => format!("{} : {}", self.expr(&d.term), self.expr(&d.klass)),
            StackEntry::Control(c) => format!("<return to {}>", self.ctl_entry(state, c)),
        }
    }

    pub fn meta_entry(&self, entry: &MetaCtxEntry) -> String {
        match entry {
            MetaCtxEntry::Ctx(frame) => {
                let binders = frame
                    .entries
                    .iter()
                    .map(|e| format!("{}:{}", name_or_anon(e.name.as_ref()), self.expr(&e.klass)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}({})", frame.kind.describe(), binders)
            }
            MetaCtxEntry::Sub(frame) => {
                let subs = frame
                    .entries
                    .iter()
                    .map(|e| format!("[{}/{}]:{}", self.expr(&e.term), name_or_anon(e.name.as_ref()), self.expr(&e.klass)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("sub {}({})", frame.cid, subs)
            }
        }
    }

    pub fn state(&self, state: &State) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "CONTROL: {}", self.ctl_entry(state, &state.cframe));
        if let Some(e) = state.error.as_ref() {
            let _ = writeln!(out, "ERROR: {}", e);
            return out
        }
        let _ = writeln!(out, "SIG:");
        for entry in state.sig.iter() {
            let _ = writeln!(out, "    {}", self.sig_entry(entry));
        }
        let _ = writeln!(out, "STACK:");
        for entry in state.stack.iter() {
            let _ = writeln!(out, "    {}", self.stack_entry(state, entry));
        }
        let _ = writeln!(out, "META:");
        for entry in state.meta.iter() {
            let _ = writeln!(out, "    {}", self.meta_entry(entry));
        }
        out
    }
}
