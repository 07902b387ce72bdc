use crate::machine::{Trace, MAX_STEPS};
use crate::pretty_printer::PpOptions;
use serde::Deserialize;
use std::error::Error;
use std::fs::OpenOptions;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub(crate) const fn default_true() -> bool { true }

pub(crate) const fn default_max_steps() -> usize { MAX_STEPS }

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// The path to the program to run (if `none`, users must specify `use_stdin: true`)
    pub input_path: Option<PathBuf>,

    /// A value indicating whether the program should be read from stdin.
    #[serde(default)]
    pub use_stdin: bool,

    /// The most states a run may produce. A signature constant that calls itself
    /// never halts on its own, so this is what ends such a run.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Print the last state of the trace when the run is over.
    #[serde(default = "default_true")]
    pub print_final_state: bool,

    /// Print every state of the trace, in order.
    #[serde(default)]
    pub print_trace: bool,

    /// Optionally, a path to write the whole trace to as JSON, for consumption by a front end.
    pub trace_output_path: Option<PathBuf>,

    /// Write the JSON trace to stdout. Ignored if `trace_output_path` is given.
    #[serde(default)]
    pub trace_to_stdout: bool,

    #[serde(default)]
    pub print_success_message: bool,

    #[serde(default)]
    pub pp_options: PpOptions,
}

impl TryFrom<&Path> for Config {
    type Error = Box<dyn Error>;
    fn try_from(p: &Path) -> Result<Config, Self::Error> {
        match OpenOptions::new().read(true).truncate(false).open(p) {
            Err(e) => Err(Box::from(format!("failed to open configuration file: {:?}", e))),
            Ok(config_file) => {
                let config = serde_json::from_reader::<_, Config>(BufReader::new(config_file))?;
                if config.input_path.is_none() && !config.use_stdin {
                    return Err(Box::from("incompatible config options: must specify a path to an input file OR set `use_stdin: true`"))
                }
                if config.input_path.is_some() && config.use_stdin {
                    return Err(Box::from("incompatible config options: if an input file path is given, `use_stdin` cannot be `true`"))
                }
                if config.max_steps == 0 {
                    return Err(Box::from("incompatible config options: `max_steps` must be at least 1"))
                }
                Ok(config)
            }
        }
    }
}

pub enum TraceDestination {
    File(BufWriter<std::fs::File>),
    Stdout(BufWriter<std::io::Stdout>),
}

impl TraceDestination {
    pub fn stdout() -> Self { Self::Stdout(BufWriter::new(std::io::stdout())) }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            TraceDestination::File(f) => f,
            TraceDestination::Stdout(f) => f,
        }
    }

    pub fn write_trace(&mut self, trace: &Trace) -> Result<(), Box<dyn Error>> {
        let w = self.writer();
        serde_json::to_writer(&mut *w, trace)?;
        w.write_all(b"\n")?;
        w.flush()?;
        Ok(())
    }
}

impl Config {
    /// Opens the trace destination, so an unwritable path fails before any work is done.
    pub fn get_trace_destination(&self) -> Result<Option<TraceDestination>, Box<dyn Error>> {
        match self.trace_output_path.as_ref() {
            Some(pathbuf) => match OpenOptions::new().write(true).create(true).truncate(true).open(pathbuf) {
                Ok(file) => Ok(Some(TraceDestination::File(BufWriter::new(file)))),
                Err(e) => Err(Box::from(format!("Failed to open trace destination file: {:?}", e))),
            },
            None if self.trace_to_stdout => Ok(Some(TraceDestination::stdout())),
            None => Ok(None),
        }
    }

    pub fn read_input(&self) -> Result<String, Box<dyn Error>> {
        let mut input = String::new();
        if let Some(pathbuf) = self.input_path.as_ref() {
            match OpenOptions::new().read(true).truncate(false).open(pathbuf) {
                Ok(file) => BufReader::new(file).read_to_string(&mut input)?,
                Err(e) => return Err(Box::from(format!("Failed to open input file: {:?}", e))),
            };
        } else if self.use_stdin {
            std::io::stdin().read_to_string(&mut input)?;
        } else {
            return Err(Box::from("Configuration file must specify an input file path or \"use_stdin\": true"))
        }
        Ok(input)
    }
}
