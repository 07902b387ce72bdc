//! A single-stepping elaborator for a small dependently-typed signature language.
//!
//! A program is a flat stream of postfix tokens. Each step of the machine consumes one
//! instruction and produces a complete new [`state::State`]; [`machine::run`] collects
//! every state into a trace a debugger can scrub back and forth through.
//! ```
//! use forth_elf::machine::run_input;
//!
//! let trace = run_input("type : o .  o : k .");
//! let last = trace.last().unwrap();
//! assert!(last.error.is_none());
//! assert_eq!(last.sig.len(), 2);
//! ```

pub mod app;
pub mod errors;
pub mod expr;
pub mod machine;
pub mod name;
pub mod parser;
pub mod pretty_printer;
pub mod state;
#[cfg(test)]
mod tests;
pub mod token;
pub mod util;
