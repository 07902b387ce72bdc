use crate::errors::StepError;
use crate::expr::Expr;
use crate::machine::{exec_instruction, run, step_forward, MAX_STEPS};
use crate::state::{Binding, MetaCtxEntry, Pc, ScopeKind, StackEntry, State};
use crate::tests::util::{flat, sig_klass, test_final, test_trace, tok_pc};
use crate::token::Tok;

fn error_of(input: &str) -> String {
    match test_final(input).error {
        Some(e) => e,
        None => panic!("expected {:?} to fail", input),
    }
}

/// Steps `input` until the program counter reaches token-stream index `index`.
fn state_at(input: &str, index: usize) -> State {
    match test_trace(input).into_iter().find(|s| s.cframe.pc == tok_pc(index)) {
        Some(s) => s,
        None => panic!("never reached {}", index),
    }
}

#[test]
fn type_pushes_type_of_kind() {
    let s0 = State::from_input("type");
    let s1 = exec_instruction(&s0, &Tok::Type).unwrap().unwrap();
    assert_eq!(s1.cframe.pc, tok_pc(1));
    match s1.stack.as_slice() {
        [StackEntry::Data(d)] => {
            assert_eq!(*d.term, Expr::Type);
            assert_eq!(*d.klass, Expr::Kind);
        }
        owise => panic!("unexpected stack {:?}", owise),
    }
}

#[test]
fn eof_halts() {
    let s0 = State::from_input("");
    assert_eq!(exec_instruction(&s0, &Tok::Eof), Ok(None));
    assert!(step_forward(&s0).is_none());
    assert_eq!(test_trace("").len(), 1);
}

#[test]
fn colon_reads_next_token_as_name() {
    let s = state_at("type : o .", 3);
    assert!(!s.cframe.reading_name);
    assert_eq!(s.cframe.name.as_ref().map(|n| n.as_str()), Some("o"));
    let s = state_at("type : o .", 2);
    assert!(s.cframe.reading_name);
}

#[test]
fn keyword_as_name() {
    let last = test_final("type : type .");
    assert_eq!(last.error, None);
    assert_eq!(last.sig[0].name, "type");
    // The keyword keeps its meaning everywhere else.
    let last = test_final("type : type . type : o .");
    assert_eq!(last.error, None);
    assert_eq!(sig_klass(&last, "o"), "type");
}

#[test]
fn missing_name() { assert_eq!(error_of("type :"), StepError::MissingName.to_string()); }

#[test]
fn failed_step_keeps_pc() {
    let trace = test_trace("type : o . bogus");
    let last = trace.last().unwrap();
    assert_eq!(last.error.as_deref(), Some("bogus not found"));
    assert_eq!(last.cframe.pc, tok_pc(4));
    let prev = &trace[trace.len() - 2];
    assert_eq!(State { error: None, ..last.clone() }, *prev);
    assert!(step_forward(last).is_none());
}

#[test]
fn failed_exec_leaves_input_alone() {
    let s0 = State::from_input(")");
    let before = s0.clone();
    assert_eq!(exec_instruction(&s0, &Tok::RParen), Err(StepError::stack_underflow(")")));
    assert_eq!(s0, before);
}

#[test]
fn close_errors() {
    assert_eq!(error_of(")"), "stack underflow during )");
    assert_eq!(error_of("type )"), "metacontext underflow during )");
    assert_eq!(error_of("( type ]"), "expected lambda scope during ], found pi scope");
    assert_eq!(error_of("[ type )"), "expected pi scope during ), found lambda scope");
    assert_eq!(error_of("type : o . o -> type )"), "expected pi scope during ), found declaration scope");
    assert_eq!(error_of("type : o . o : k . ( k )"), "expected classifier on stack during ), found o");
}

#[test]
fn lambda_body_need_not_be_a_classifier() {
    let last = test_final("type : o . o : k . [ k ]");
    assert_eq!(last.error, None);
    match last.stack.last() {
        Some(StackEntry::Data(d)) => {
            assert_eq!(flat(&d.term), "k");
            assert_eq!(flat(&d.klass), "o");
        }
        owise => panic!("unexpected top {:?}", owise),
    }
}

#[test]
fn define_errors() {
    assert_eq!(error_of("."), "stack underflow during .");
    assert_eq!(error_of("type : o . o : k . k : z ."), "expected classifier on stack during ., found o");
    assert_eq!(error_of("type : o . o : k . k -> type : z ."), "expected classifier on stack during ->, found o");
}

#[test]
fn not_found() {
    let trace = test_trace("bogus");
    assert_eq!(trace.len(), 2);
    assert_eq!(trace[1].error.as_deref(), Some("bogus not found"));
    // Names bound by a finished declaration are gone.
    assert_eq!(error_of("type : o . ( o : x ) -> type : p . x"), "x not found");
}

#[test]
fn grab_errors() {
    assert_eq!(error_of("type : o . ( o ) -> o : s . type s"), "type mismatch during grab: expected o, got kind");
    assert_eq!(error_of("type : o . ( o ) -> o : s . s"), "stack underflow during grab");
}

#[test]
fn pop_shapes() {
    let mut s = test_final("type : o . o : k . k");
    assert_eq!(s.pop_control("ret"), Err(StepError::expected_control("ret")));
    // Inside the call to `o`: the caller's control entry is on top.
    let mut s2 = test_trace("type : o . o")[5].clone();
    assert_eq!(s2.control_depth(), 1);
    assert_eq!(s2.pop_data("grab"), Err(StepError::expected_data("grab")));
    assert_eq!(s.pop_sub("ret"), Err(StepError::meta_underflow("ret")));
}

#[test]
fn pi_binders_fold_outermost_first() {
    let last = test_final("type : o . ( o : x ) -> ( o : y ) -> type : two .");
    assert_eq!(last.error, None);
    let klass = &last.sig_entry("two").unwrap().klass;
    match klass.as_ref() {
        Expr::Pi { name, b, .. } => {
            assert_eq!(name.as_ref().map(|n| n.as_str()), Some("x"));
            assert_eq!(b.binder_name().map(|n| n.as_str()), Some("y"));
        }
        owise => panic!("expected a pi, got {:?}", owise),
    }
    assert_eq!(flat(klass), "pi _ o pi _ o type");
}

#[test]
fn lambda_elaboration() {
    let last = test_final("type : o . ( o ) -> o : s . [ ( o : x ) -> x s ]");
    assert_eq!(last.error, None);
    match last.stack.as_slice() {
        [StackEntry::Data(d)] => {
            assert_eq!(flat(&d.term), "lam _ o x s");
            assert_eq!(flat(&d.klass), "pi _ o o");
            assert_eq!(d.term.binder_name().map(|n| n.as_str()), Some("x"));
        }
        owise => panic!("unexpected stack {:?}", owise),
    }
}

#[test]
fn arrow_at_top_level_opens_declaration_scope() {
    let s = state_at("type : o . o -> type : p .", 6);
    match s.meta.as_slice() {
        [MetaCtxEntry::Ctx(frame)] => {
            assert_eq!(frame.kind, ScopeKind::Decl);
            assert_eq!(frame.entries.len(), 1);
            assert_eq!(flat(&frame.entries[0].klass), "o");
        }
        owise => panic!("unexpected meta {:?}", owise),
    }
    let last = test_final("type : o . o -> type : p .");
    assert!(last.meta.is_empty());
    assert_eq!(sig_klass(&last, "p"), "pi _ o type");
}

#[test]
fn lookup_prefers_newest() {
    let s = state_at("type : o . type : o . o", 8);
    assert_eq!(s.lookup(&"o".into()), Some(Binding::Sig(1)));
    let s = step_forward(&s).unwrap();
    assert_eq!(s.cframe.pc, Pc::SigEntry { sig_ix: 1, tok_ix: 0 });
}

#[test]
fn scope_variable_shadows_constant() {
    // After the arrow `o` is the bound variable, whose type `o` is not a classifier.
    let last = test_final("type : o . ( o : o ) -> o : f .");
    assert_eq!(last.error.as_deref(), Some("expected classifier on stack during ., found o"));
}

#[test]
fn call_and_return() {
    let trace = test_trace("type : o . o : k .");
    // Frame 5 is about to run the first instruction of o's code.
    let called = &trace[5];
    assert_eq!(called.cframe.pc, Pc::SigEntry { sig_ix: 0, tok_ix: 0 });
    assert_eq!(called.control_depth(), 1);
    assert!(matches!(called.meta.as_slice(), [MetaCtxEntry::Sub(f)] if f.cid == "o" && f.entries.is_empty()));
    let returned = &trace[7];
    assert_eq!(returned.cframe.pc, tok_pc(5));
    assert!(returned.meta.is_empty());
    assert_eq!(returned.control_depth(), 0);
    match returned.stack.as_slice() {
        [StackEntry::Data(d)] => {
            assert_eq!(flat(&d.term), "o");
            assert_eq!(flat(&d.klass), "type");
        }
        owise => panic!("unexpected stack {:?}", owise),
    }
    assert_eq!(trace.len(), 11);
}

#[test]
fn grab_records_substitution() {
    let s = state_at("type : o . o : k . ( o : x ) -> type : p . k p", 19);
    // Through the call and `( o : x ) grab` in p's code.
    let s = (0..9).fold(s, |s, _| step_forward(&s).unwrap());
    assert_eq!(s.cframe.pc, Pc::SigEntry { sig_ix: 2, tok_ix: 6 });
    match s.meta.last() {
        Some(MetaCtxEntry::Sub(frame)) => {
            assert_eq!(frame.cid, "p");
            assert_eq!(frame.entries.len(), 1);
            assert_eq!(frame.entries[0].name.as_ref().map(|n| n.as_str()), Some("x"));
            assert_eq!(flat(&frame.entries[0].term), "k");
        }
        owise => panic!("unexpected meta {:?}", owise),
    }
    let last = test_final("type : o . o : k . ( o : x ) -> type : p . k p");
    match last.stack.as_slice() {
        [StackEntry::Data(d)] => {
            assert_eq!(flat(&d.term), "k p");
            assert_eq!(flat(&d.klass), "type");
        }
        owise => panic!("unexpected stack {:?}", owise),
    }
}

#[test]
fn self_call_hits_the_cap() {
    let trace = test_trace("type : o . o : o . o");
    assert_eq!(trace.len(), MAX_STEPS);
    assert!(trace.iter().all(|s| !s.is_error()));
    assert_eq!(run(State::from_input("type : o . o : o . o"), 50).len(), 50);
}

#[test]
fn run_never_returns_empty() { assert_eq!(run(State::from_input("type"), 0).len(), 1); }

#[test]
fn callee_ignores_caller_binders() {
    let prelude = "type : o . o : x . ( o ) -> type : h . x h : c1 . ";
    // The same call under a binder that shares the name of a constant c1 uses.
    for binder in ["z", "x"] {
        let input = format!("{}( type : {} ) -> c1", prelude, binder);
        let last = test_final(&input);
        assert_eq!(last.error, None, "under binder {}", binder);
        match last.stack.as_slice() {
            [StackEntry::Data(d)] => {
                assert_eq!(flat(&d.term), "c1");
                assert_eq!(flat(&d.klass), "x h");
            }
            owise => panic!("unexpected stack {:?}", owise),
        }
    }
    let trace = test_trace(&format!("{}( type : x ) -> c1", prelude));
    let caller = trace.iter().rev().find(|s| s.cframe.pc.tok_stream_index().is_some() && s.sig.len() == 4).unwrap();
    assert!(matches!(caller.lookup(&"x".into()), Some(Binding::Ctx { .. })));
    let callee = trace.iter().find(|s| s.cframe.pc == Pc::SigEntry { sig_ix: 3, tok_ix: 0 }).unwrap();
    assert_eq!(callee.lookup(&"x".into()), Some(Binding::Sig(1)));
}

#[test]
fn define_outside_token_stream() {
    let mut s = test_final("type : o . type");
    s.cframe.pc = Pc::SigEntry { sig_ix: 0, tok_ix: 0 };
    let err = exec_instruction(&s, &Tok::Dot).unwrap_err();
    assert_eq!(err, StepError::OutsideTokenStream { during: ".".to_string() });
    assert_eq!(err.to_string(), ". executed outside the token stream");
}
