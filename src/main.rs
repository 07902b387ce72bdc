use forth_elf::machine::run;
use forth_elf::pretty_printer::PrettyPrinter;
use forth_elf::state::State;
use forth_elf::util::Config;
use std::error::Error;
use std::path::Path;

fn main() -> Result<(), MainError> {
    env_logger::init();
    let mut args = std::env::args();
    let _ = args.next();
    let out = match args.next().as_ref() {
        None => Err(Box::from("This program expects a path to a configuration file.".to_string())),
        Some(p) if p == "-h" || p == "--help" => return Ok(println!("{}", HELP_LONG)),
        Some(p) => use_config(Path::new(p)),
    }
    .map_err(MainError)?;

    if let Some(msg) = out {
        println!("{}", msg);
    }
    Ok(())
}

// Returns an optional success message.
fn use_config(config_path: &Path) -> Result<Option<String>, Box<dyn Error>> {
    let cfg = Config::try_from(config_path)?;
    // Make sure the trace destination is accessible before doing any real work.
    let mut trace_destination = cfg.get_trace_destination()?;
    let input = cfg.read_input()?;
    let trace = run(State::from_input(&input), cfg.max_steps);
    let pp = PrettyPrinter::new(cfg.pp_options);

    if cfg.print_trace {
        for (frame, state) in trace.iter().enumerate() {
            println!("=== time: {}\n{}", frame, pp.state(state));
        }
    }
    let last = trace.last().ok_or("the run produced no states")?;
    if cfg.print_final_state && !cfg.print_trace {
        println!("{}", pp.state(last));
    }
    if let Some(dest) = trace_destination.as_mut() {
        dest.write_trace(&trace)?;
    }

    if let Some(e) = last.error.as_ref() {
        return Err(Box::from(format!("step {} failed: {}", trace.len() - 1, e)))
    }
    if cfg.print_success_message {
        Ok(Some(format!("Ran {} steps, defining {} signature entries", trace.len(), last.sig.len())))
    } else {
        Ok(None)
    }
}

struct MainError(Box<dyn Error>);

impl std::fmt::Debug for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}\n\n{}", self.0, HELP_SHORT) }
}

const HELP_SHORT: &str = "run with `-h` or `--help` for help";
const HELP_LONG: &str = concat!(
    "forth_elf_bin",
    " ",
    env!("CARGO_PKG_VERSION"),
    "\n\n",
    env!("CARGO_PKG_DESCRIPTION"),
    "\n\n",
    "usage: forth_elf_bin <config.json>\n\n",
    "The configuration file is JSON. Keys:\n",
    "  input_path          path to the program to run\n",
    "  use_stdin           read the program from stdin instead (default false)\n",
    "  max_steps           most states a run may produce (default 1000)\n",
    "  print_final_state   print the last state (default true)\n",
    "  print_trace         print every state (default false)\n",
    "  trace_output_path   write the whole trace as JSON to this path\n",
    "  trace_to_stdout     write the JSON trace to stdout instead (default false)\n",
    "  print_success_message\n",
    "  pp_options          {\"unicode\": bool}\n\n",
    "Set RUST_LOG=debug (or trace) for a log of every definition (or instruction)."
);
