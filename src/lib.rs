//! Single value memoization.
//!
//! A [`Memo`] is built from two functions: one that produces the current dependencies, and one
//! that computes a value from them. Calling the memo recomputes the value only if the
//! dependencies changed since the last call. Memos that read other memos in their dependency
//! producer form a pull based dependency graph, nothing is ever pushed.
//!
//! ```
//! use yzal::{Memo, Var};
//!
//! let x = Var::new(3);
//! let y = Var::new(5);
//!
//! let sum = {
//!     let (x, y) = (x.clone(), y.clone());
//!     Memo::new(move || [x.get(), y.get()], |deps: &[i32]| deps[0] + deps[1])
//! };
//!
//! assert_eq!(sum.get(), 8);
//! y.set(0);
//! assert_eq!(sum.get(), 3);
//! ```

// Lets `memo!` refer to `::yzal` from inside this crate, too.
extern crate self as yzal;

mod builder;
mod dependency;
pub mod diagnostics;
mod error;
mod memo;
mod strategy;
mod value;
mod var;

pub use builder::Builder;
pub use dependency::{Dependency, IntoDeps};
pub use diagnostics::{Event, EventKind, Sink};
pub use error::ConfigError;
pub use memo::Memo;
pub use strategy::Strategy;
pub use value::Value;
pub use var::Var;
pub use yzal_macros::memo;
