//! Positional destructuring assignment with arity checking.
//!
//! The core lives in [`interpreter::destruct`]: [`unpack`] binds the elements
//! of a sequence to a list of targets, all or nothing. Around it sits a tiny
//! script language, just big enough to write unpacking examples in:
//!
//! ```text
//! source -> Lexer ==tokens==> Parser ==statements==> Engine -> Sink
//! ```

pub mod error;
pub mod frontend;
pub mod interpreter;

pub use error::{Error, Result};
pub use interpreter::destruct::{assign, unpack, ArityMismatch, Bindings, Sequence, Target};
pub use interpreter::engine::Engine;
pub use interpreter::value::Value;
