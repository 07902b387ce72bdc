use crate::token::Tok;
use std::rc::Rc;

/// A tokenized program: the flat instruction stream the machine runs, and the same
/// tokens grouped by source line for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub toks: Rc<[Tok]>,
    pub orig_toks: Rc<[Vec<Tok>]>,
}

/// Strips `#` comments from one line and splits it into surface atoms.
fn atoms(line: &str) -> impl Iterator<Item = &str> {
    let code = match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    };
    code.split_whitespace()
}

/// Tokenizes surface text. Blank lines produce no group. If the text does not already end
/// in `EOF`, a final group holding a lone `EOF` is appended so the machine always halts on
/// a real instruction.
pub fn parse(input: &str) -> Program {
    let mut groups: Vec<Vec<Tok>> =
        input.lines().map(|line| atoms(line).map(Tok::from_atom).collect::<Vec<Tok>>()).filter(|g| !g.is_empty()).collect();

    let ends_in_eof = groups.last().and_then(|g| g.last()).map(|t| *t == Tok::Eof).unwrap_or(false);
    if !ends_in_eof {
        groups.push(vec![Tok::Eof]);
    }

    let toks: Vec<Tok> = groups.iter().flatten().cloned().collect();
    Program { toks: Rc::from(toks), orig_toks: Rc::from(groups) }
}
