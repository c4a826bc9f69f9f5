//! Scripted presentations: instruction grammar and interpreter.

pub mod interpreter;
pub mod token;

pub use interpreter::{ActionInterpreter, RunReport, clear_screen};
pub use token::{ActionToken, Refresh};
