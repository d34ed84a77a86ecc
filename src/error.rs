use thiserror::Error;

/// A memo could not be built because its configuration is incomplete.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("memo has no dependency producer, call `deps` or `try_deps` before `build`")]
    MissingDeps,
    #[error("memo has no result producer, call `calc` or `try_calc` before `build`")]
    MissingCalc,
}
