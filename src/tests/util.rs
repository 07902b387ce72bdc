use crate::expr::{flatten, Expr};
use crate::machine::{run, Trace, MAX_STEPS};
use crate::state::{Pc, State};
use crate::util::{Config, TraceDestination};
use std::error::Error;
use std::path::Path;

/// The sample signature the debugger front end starts with.
pub(crate) const SAMPLE: &str = "\
( type : o ) .
( o : k ) .
( o : l ) .
( ( o ) -> o : s ) .
( ( o ) -> type : a ) .
( ( o ) -> ( o ) -> type : b ) .
( l s k b : bt ) .
( ( o : x ) -> x x b : bt2 ) .
( ( ( o ) -> o ) -> type : c ) .
( ( o : x ) -> ( o : y ) -> ( x s y b ) -> type : e ) .
EOF
";

/// A type family `p` over `o`, a constructor for it, and `q`, which takes a function
/// producing `p` of its argument.
pub(crate) const FAMILY: &str = "\
type : o .
( o : x ) -> type : p .
( o : x ) -> x p : mkp .
( ( o : x ) -> x p ) -> type : q .
";

pub(crate) fn test_trace(input: &str) -> Trace { run(State::from_input(input), MAX_STEPS) }

pub(crate) fn test_final(input: &str) -> State {
    let mut trace = test_trace(input);
    trace.pop().unwrap()
}

/// Runs `FAMILY` followed by `rest`.
pub(crate) fn test_family(rest: &str) -> State { test_final(&format!("{}{}", FAMILY, rest)) }

pub(crate) fn flat(e: &Expr) -> String { flatten(e).join(" ") }

/// The flattened declared type of the newest signature entry called `name`.
pub(crate) fn sig_klass(state: &State, name: &str) -> String {
    match state.sig_entry(name) {
        Some(entry) => flat(&entry.klass),
        None => panic!("no signature entry named {}", name),
    }
}

pub(crate) fn tok_pc(index: usize) -> Pc { Pc::TokStream { index } }

pub(crate) fn test_config_trace<A>(config_path: &Path, f: impl FnOnce(&Config, &Trace) -> A) -> Result<A, Box<dyn Error>> {
    let config = Config::try_from(config_path)?;
    let input = config.read_input()?;
    let trace = run(State::from_input(&input), config.max_steps);
    Ok(f(&config, &trace))
}

#[test]
fn check_sample() -> Result<(), Box<dyn Error>> {
    test_config_trace(Path::new("test_resources/Sample/config.json"), |config, trace| {
        assert!(trace.len() <= config.max_steps);
        let last = trace.last().unwrap();
        assert_eq!(last.error, None);
        assert_eq!(last.sig.len(), 10);
    })
}

#[test]
fn check_capture() -> Result<(), Box<dyn Error>> {
    test_config_trace(Path::new("test_resources/Capture/config.json"), |_, trace| {
        let last = trace.last().unwrap();
        assert_eq!(last.error, None);
        assert_eq!(sig_klass(last, "bad"), "pi _ o lam _ o x mkp q");
    })
}

#[test]
fn bad_config_both_inputs() {
    match Config::try_from(Path::new("test_resources/BadConfig/config.json")) {
        Err(e) => assert_eq!(
            e.to_string(),
            "incompatible config options: if an input file path is given, `use_stdin` cannot be `true`"
        ),
        Ok(..) => panic!(),
    }
}

#[test]
fn bad_config_no_input() {
    match Config::try_from(Path::new("test_resources/NoInput/config.json")) {
        Err(e) => assert_eq!(
            e.to_string(),
            "incompatible config options: must specify a path to an input file OR set `use_stdin: true`"
        ),
        Ok(..) => panic!(),
    }
}

#[test]
fn bad_config_zero_steps() {
    match Config::try_from(Path::new("test_resources/ZeroSteps/config.json")) {
        Err(e) => assert_eq!(e.to_string(), "incompatible config options: `max_steps` must be at least 1"),
        Ok(..) => panic!(),
    }
}

#[test]
fn missing_config_file() { assert!(Config::try_from(Path::new("test_resources/NoSuchDir/config.json")).is_err()); }

#[test]
fn config_defaults() -> Result<(), Box<dyn Error>> {
    let config = Config::try_from(Path::new("test_resources/Sample/config.json"))?;
    assert_eq!(config.max_steps, MAX_STEPS);
    assert!(config.print_final_state);
    assert!(!config.print_trace);
    assert!(!config.pp_options.unicode);
    assert!(config.get_trace_destination()?.is_none());
    Ok(())
}

#[test]
fn trace_to_stdout() -> Result<(), Box<dyn Error>> {
    let config = Config::try_from(Path::new("test_resources/TraceStdout/config.json"))?;
    assert!(config.trace_to_stdout);
    assert!(matches!(config.get_trace_destination()?, Some(TraceDestination::Stdout(..))));
    Ok(())
}
