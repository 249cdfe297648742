//! Tortoise turtle language: parser and interpreter.
//!
//! ```
//! use tortoise_core::interpreter::Interpreter;
//!
//! let mut interp = Interpreter::new();
//! interp.run("R(4){D(50) +(90)}");
//! assert!(interp.errors.is_empty());
//! assert_eq!(interp.picture().paths().count(), 1);
//! ```

pub mod chars;
pub mod command;
pub mod error;
pub mod expr;
pub mod internals;
pub mod interpreter;
pub mod parser;
pub mod random;
pub mod token;
