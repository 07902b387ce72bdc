use crate::token::Tok;
use std::rc::Rc;

/// Drops a trailing `: name`, the name the declaration's `.` consumed.
fn strip_decl_name(body: &[Tok]) -> &[Tok] {
    match body {
        [rest @ .., Tok::Colon, _] => rest,
        _ => body,
    }
}

/// If `body` is a single parenthesised scope, returns its inside.
fn outer_scope(body: &[Tok]) -> Option<&[Tok]> {
    if body.first() != Some(&Tok::LParen) {
        return None
    }
    let mut depth = 0usize;
    for (idx, tok) in body.iter().enumerate() {
        if tok.opens_scope() {
            depth += 1;
        } else if tok.closes_scope() {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return if idx + 1 == body.len() && *tok == Tok::RParen { Some(&body[1..idx]) } else { None }
            }
        }
    }
    None
}

/// Compiles the tokens of one declaration (everything before its `.`) into the code a call
/// to the declared constant executes.
///
/// The declaration's own binders are the constant's parameters, so each `->` at the
/// outermost level becomes `grab`. The code always ends in `ret`.
pub fn compile_decl(decl: &[Tok]) -> Rc<[Tok]> {
    let body = strip_decl_name(decl);
    let body = outer_scope(body).map(strip_decl_name).unwrap_or(body);

    let mut code = Vec::with_capacity(body.len() + 1);
    let mut depth = 0usize;
    for tok in body {
        if tok.opens_scope() {
            depth += 1;
        } else if tok.closes_scope() {
            depth = depth.saturating_sub(1);
        }
        if depth == 0 && *tok == Tok::Arrow {
            code.push(Tok::Grab);
        } else {
            code.push(tok.clone());
        }
    }
    code.push(Tok::Ret);
    Rc::from(code)
}
