use crate::{
    dependency::{Dependency, IntoDeps},
    diagnostics::{self, Diagnostics, Event},
    error::ConfigError,
    memo::{CalcFn, DepsFn, Memo},
    strategy::Strategy,
};
use std::{convert::Infallible, fmt, rc::Rc};

/// Configures a [`Memo`].
///
/// ```
/// use yzal::Memo;
///
/// let area = Memo::builder()
///     .deps(|| [3.0, 4.0])
///     .calc(|deps: &[f64]| deps[0] * deps[1])
///     .strict(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(area.get(), 12.0);
/// ```
pub struct Builder<D: 'static, T: 'static, E: 'static = Infallible> {
    deps: Option<DepsFn<D, E>>,
    calc: Option<CalcFn<D, T, E>>,
    strategy: Strategy,
    diagnostics: Option<Diagnostics<T>>,
}

impl<D: Dependency, T, E> Builder<D, T, E> {
    pub(crate) fn new() -> Self {
        Builder {
            deps: None,
            calc: None,
            strategy: Strategy::default(),
            diagnostics: None,
        }
    }

    /// The producer of the dependencies, called on every invocation of the memo.
    pub fn deps<R>(mut self, deps: impl Fn() -> R + 'static) -> Self
    where
        R: IntoDeps<Item = D>,
    {
        self.deps = Some(boxed_deps(deps));
        self
    }

    /// A dependency producer that may fail. Its error is returned by [`Memo::try_get`].
    pub fn try_deps<R>(mut self, deps: impl Fn() -> Result<R, E> + 'static) -> Self
    where
        R: IntoDeps<Item = D>,
    {
        self.deps = Some(Box::new(move || deps().map(IntoDeps::into_deps)));
        self
    }

    /// The producer of the value. It receives the dependencies in the order they were produced.
    pub fn calc(mut self, calc: impl FnMut(&[D]) -> T + 'static) -> Self {
        self.calc = Some(boxed_calc(calc));
        self
    }

    /// A value producer that may fail. A failure is not cached.
    pub fn try_calc(mut self, calc: impl FnMut(&[D]) -> Result<T, E> + 'static) -> Self {
        self.calc = Some(Box::new(calc));
        self
    }

    /// `true` selects [`Strategy::Strict`], `false` (the default) [`Strategy::Structural`].
    pub fn strict(self, strict: bool) -> Self {
        self.strategy(Strategy::from_strict(strict))
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Labels the memo and logs its cache hits and misses with [`diagnostics::trace`].
    pub fn debug(self, label: impl Into<String>) -> Self
    where
        T: fmt::Debug,
    {
        self.sink(label, diagnostics::trace::<T>)
    }

    /// Labels the memo and reports its cache hits and misses to `sink`.
    pub fn sink(
        mut self,
        label: impl Into<String>,
        sink: impl Fn(&Event<'_, T>) + 'static,
    ) -> Self {
        self.diagnostics = Some(Diagnostics {
            label: label.into(),
            sink: Rc::new(sink),
        });
        self
    }

    pub fn build(self) -> Result<Memo<D, T, E>, ConfigError> {
        let deps = self.deps.ok_or(ConfigError::MissingDeps)?;
        let calc = self.calc.ok_or(ConfigError::MissingCalc)?;
        Ok(Memo::from_parts(deps, calc, self.strategy, self.diagnostics))
    }
}

pub(crate) fn boxed_deps<D, E, R>(deps: impl Fn() -> R + 'static) -> DepsFn<D, E>
where
    D: 'static,
    E: 'static,
    R: IntoDeps<Item = D>,
{
    Box::new(move || Ok(deps().into_deps()))
}

pub(crate) fn boxed_calc<D, T, E>(
    mut calc: impl FnMut(&[D]) -> T + 'static,
) -> CalcFn<D, T, E>
where
    D: 'static,
    E: 'static,
{
    Box::new(move |deps: &[D]| Ok(calc(deps)))
}
