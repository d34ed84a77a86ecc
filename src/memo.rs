use crate::{
    builder::{self, Builder},
    dependency::{Dependency, IntoDeps},
    diagnostics::{Diagnostics, EventKind},
    strategy::Strategy,
};
use std::{
    cell::{Ref, RefCell},
    convert::Infallible,
    fmt,
    rc::Rc,
};

pub(crate) type DepsFn<D, E> = Box<dyn Fn() -> Result<Vec<D>, E>>;
pub(crate) type CalcFn<D, T, E> = Box<dyn FnMut(&[D]) -> Result<T, E>>;

/// A memoized value.
///
/// Every call pulls the current dependencies and compares them with the snapshot of the
/// dependencies the cached value was computed from. The value is only recomputed if they differ.
///
/// `Memo` is a cheap to clone handle, clones share the same cache. Dependency producers may call
/// other memos, this is how memos are composed into graphs.
///
/// `E` is the error type of fallible producers, see [`Memo::try_builder`].
pub struct Memo<D: 'static, T: 'static, E: 'static = Infallible>(Rc<MemoInner<D, T, E>>);

/// Custom implementation of Clone to avoid putting a Clone requirement on the type parameters.
impl<D, T, E> Clone for Memo<D, T, E> {
    fn clone(&self) -> Self {
        Memo(self.0.clone())
    }
}

impl<D: Dependency, T> Memo<D, T> {
    /// A memo that compares its dependencies structurally.
    pub fn new<R>(deps: impl Fn() -> R + 'static, calc: impl FnMut(&[D]) -> T + 'static) -> Self
    where
        R: IntoDeps<Item = D>,
    {
        Self::from_parts(
            builder::boxed_deps(deps),
            builder::boxed_calc(calc),
            Strategy::Structural,
            None,
        )
    }

    /// A memo that compares its dependencies by identity.
    pub fn strict<R>(deps: impl Fn() -> R + 'static, calc: impl FnMut(&[D]) -> T + 'static) -> Self
    where
        R: IntoDeps<Item = D>,
    {
        Self::from_parts(
            builder::boxed_deps(deps),
            builder::boxed_calc(calc),
            Strategy::Strict,
            None,
        )
    }

    pub fn builder() -> Builder<D, T> {
        Builder::new()
    }

    /// Returns the current value, recomputing it if the dependencies changed.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }

    /// Lends the current value to `f`, recomputing it first if the dependencies changed.
    ///
    /// `f` runs while the cache is borrowed. It may read this memo again, but if that read needs
    /// to recompute (because `f` changed one of the sources), it panics.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match self.try_with(f) {
            Ok(r) => r,
            Err(never) => match never {},
        }
    }

    /// Turns the memo into a plain zero argument function.
    pub fn into_fn(self) -> impl Fn() -> T
    where
        T: Clone,
    {
        move || self.get()
    }
}

impl<D: Dependency, T, E> Memo<D, T, E> {
    /// A builder for memos with fallible producers.
    pub fn try_builder() -> Builder<D, T, E> {
        Builder::new()
    }

    pub(crate) fn from_parts(
        deps: DepsFn<D, E>,
        calc: CalcFn<D, T, E>,
        strategy: Strategy,
        diagnostics: Option<Diagnostics<T>>,
    ) -> Self {
        let inner = MemoInner {
            deps,
            calc: RefCell::new(calc),
            strategy,
            diagnostics,
            cached: RefCell::new(None),
        };
        Memo(Rc::new(inner))
    }

    /// Returns the current value, or the first error the producers returned.
    ///
    /// A failed call leaves the cache as it was, the next call tries again.
    pub fn try_get(&self) -> Result<T, E>
    where
        T: Clone,
    {
        self.try_with(T::clone)
    }

    /// Fallible [`Memo::with`]. The same borrowing rules apply to `f` and to the diagnostic sink.
    pub fn try_with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, E> {
        let inner = &*self.0;
        let deps = (inner.deps)()?;

        {
            let cached = inner.cached.borrow();
            if let Some(cached) = &*cached {
                if inner.strategy.equal(&cached.deps, &deps) {
                    inner.emit(EventKind::Cached, &cached.value);
                    return Ok(f(&cached.value));
                }
            }
        }

        let value = {
            // Hold calc exclusively, so that a memo that reads itself while computing panics
            // instead of clobbering its own cache.
            let mut calc = inner.calc.borrow_mut();
            (*calc)(&deps[..])?
        };

        // The snapshot and the value are published together, never one without the other.
        *inner.cached.borrow_mut() = Some(Cached {
            deps: inner.strategy.snapshot(deps),
            value,
        });

        let value = Ref::map(inner.cached.borrow(), |c| &c.as_ref().unwrap().value);
        inner.emit(EventKind::Computed, &*value);
        Ok(f(&*value))
    }

    /// `true` after the first successful computation.
    pub fn is_cached(&self) -> bool {
        self.0.cached.borrow().is_some()
    }

    pub fn label(&self) -> Option<&str> {
        self.0.diagnostics.as_ref().map(|d| d.label.as_str())
    }

    pub fn strategy(&self) -> Strategy {
        self.0.strategy
    }
}

impl<D, T, E> fmt::Debug for Memo<D, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = &*self.0;
        f.debug_struct("Memo")
            .field("label", &inner.diagnostics.as_ref().map(|d| d.label.as_str()))
            .field("strategy", &inner.strategy)
            .field("cached", &inner.cached.borrow().is_some())
            .finish()
    }
}

struct MemoInner<D: 'static, T: 'static, E: 'static> {
    deps: DepsFn<D, E>,
    calc: RefCell<CalcFn<D, T, E>>,
    strategy: Strategy,
    diagnostics: Option<Diagnostics<T>>,
    // `None` until the first computation succeeded.
    cached: RefCell<Option<Cached<D, T>>>,
}

impl<D, T, E> MemoInner<D, T, E> {
    fn emit(&self, kind: EventKind, value: &T) {
        if let Some(diagnostics) = &self.diagnostics {
            diagnostics.emit(kind, value);
        }
    }
}

struct Cached<D, T> {
    deps: Vec<D>,
    value: T,
}

#[cfg(test)]
mod tests {
    use super::Memo;
    use crate::{var::Var, Strategy};
    use std::{
        cell::Cell,
        panic::{self, AssertUnwindSafe},
        rc::Rc,
    };

    fn counter() -> (Rc<Cell<usize>>, impl Fn() -> usize) {
        let count = Rc::new(Cell::new(0));
        let read = {
            let count = count.clone();
            move || count.get()
        };
        (count, read)
    }

    #[test]
    fn computes_once_for_stable_deps() {
        let (count, computations) = counter();
        let m = Memo::new(
            || vec![3, 5],
            move |deps: &[i32]| {
                count.set(count.get() + 1);
                deps.iter().sum::<i32>()
            },
        );

        assert!(!m.is_cached());
        assert_eq!(m.get(), 8);
        assert_eq!(m.get(), 8);
        assert_eq!(m.get(), 8);
        assert!(m.is_cached());
        assert_eq!(computations(), 1);
    }

    #[test]
    fn recomputes_when_deps_change() {
        let (count, computations) = counter();
        let x = Var::new(1i32);
        let m = {
            let x = x.clone();
            Memo::new(
                move || x.get(),
                move |deps: &[i32]| {
                    count.set(count.get() + 1);
                    deps[0] * 10
                },
            )
        };

        assert_eq!(m.get(), 10);
        x.set(2);
        assert_eq!(m.get(), 20);
        assert_eq!(m.get(), 20);
        assert_eq!(computations(), 2);
    }

    #[test]
    fn absent_deps_compute_once() {
        let (count, computations) = counter();
        let m = Memo::new(
            || None::<i32>,
            move |deps: &[i32]| {
                count.set(count.get() + 1);
                deps.len()
            },
        );

        assert_eq!(m.get(), 0);
        assert_eq!(m.get(), 0);
        assert_eq!(computations(), 1);
    }

    #[test]
    fn empty_deps_compute_once_in_both_modes() {
        for strategy in [Strategy::Strict, Strategy::Structural] {
            let (count, computations) = counter();
            let m = Memo::builder()
                .deps(Vec::<u8>::new)
                .calc(move |_| {
                    count.set(count.get() + 1);
                    "constant"
                })
                .strategy(strategy)
                .build()
                .unwrap();

            assert_eq!(m.get(), "constant");
            assert_eq!(m.get(), "constant");
            assert_eq!(computations(), 1);
        }
    }

    #[test]
    fn varying_arity_is_passed_through() {
        let n = Var::new(1u32);
        let m = {
            let n = n.clone();
            Memo::new(move || (0..n.get()).collect::<Vec<_>>(), |deps: &[u32]| deps.len())
        };

        assert_eq!(m.get(), 1);
        n.set(4);
        assert_eq!(m.get(), 4);
    }

    #[test]
    fn failed_computation_keeps_previous_pair() {
        let (count, computations) = counter();
        let x = Var::new(2i32);
        let m = {
            let x = x.clone();
            Memo::try_builder()
                .deps(move || x.get())
                .try_calc(move |deps: &[i32]| {
                    count.set(count.get() + 1);
                    if deps[0] < 0 {
                        Err(format!("negative: {}", deps[0]))
                    } else {
                        Ok(deps[0] * 2)
                    }
                })
                .build()
                .unwrap()
        };

        assert_eq!(m.try_get(), Ok(4));

        x.set(-1);
        assert_eq!(m.try_get(), Err("negative: -1".to_owned()));
        // Still failing, and the failure was not cached.
        assert_eq!(m.try_get(), Err("negative: -1".to_owned()));
        assert_eq!(computations(), 3);

        // The old pair is still there, switching back is a cache hit.
        x.set(2);
        assert_eq!(m.try_get(), Ok(4));
        assert_eq!(computations(), 3);
    }

    #[test]
    fn panicking_computation_keeps_previous_pair() {
        let (count, computations) = counter();
        let x = Var::new(1i32);
        let m = {
            let x = x.clone();
            Memo::new(
                move || x.get(),
                move |deps: &[i32]| {
                    count.set(count.get() + 1);
                    if deps[0] < 0 {
                        panic!("negative: {}", deps[0]);
                    }
                    deps[0] * 10
                },
            )
        };

        assert_eq!(m.get(), 10);

        x.set(-1);
        assert!(panic::catch_unwind(AssertUnwindSafe(|| m.get())).is_err());
        assert!(m.is_cached());
        assert_eq!(computations(), 2);

        // The old pair survived the panic.
        x.set(1);
        assert_eq!(m.get(), 10);
        assert_eq!(computations(), 2);

        // And calc is not left borrowed.
        x.set(3);
        assert_eq!(m.get(), 30);
        assert_eq!(computations(), 3);
    }

    #[test]
    fn nan_dependency_computes_once() {
        let (count, computations) = counter();
        let m = Memo::new(
            || f64::NAN,
            move |deps: &[f64]| {
                count.set(count.get() + 1);
                deps[0].is_nan()
            },
        );

        assert!(m.get());
        assert!(m.get());
        assert!(m.get());
        assert_eq!(computations(), 1);
    }

    #[test]
    fn failing_deps_skip_calc() {
        let (count, computations) = counter();
        let fail = Var::new(true);
        let m = {
            let fail = fail.clone();
            Memo::try_builder()
                .try_deps(move || if fail.get() { Err("unavailable") } else { Ok(1) })
                .calc(move |deps: &[i32]| {
                    count.set(count.get() + 1);
                    deps[0]
                })
                .build()
                .unwrap()
        };

        assert_eq!(m.try_get(), Err("unavailable"));
        assert!(!m.is_cached());
        assert_eq!(computations(), 0);

        fail.set(false);
        assert_eq!(m.try_get(), Ok(1));
        assert_eq!(computations(), 1);
    }

    #[test]
    #[should_panic]
    fn reading_itself_while_computing_panics() {
        let slot: Rc<Cell<Option<Memo<i32, i32>>>> = Rc::new(Cell::new(None));
        let m = {
            let slot = slot.clone();
            Memo::new(
                || 1i32,
                move |_: &[i32]| match slot.take() {
                    Some(me) => me.get(),
                    None => 0,
                },
            )
        };
        slot.set(Some(m.clone()));
        m.get();
    }

    #[test]
    fn with_may_read_a_cached_value_again() {
        let m = Memo::new(|| 2i32, |deps: &[i32]| deps[0] * 2);
        assert_eq!(m.with(|v| v + m.get()), 8);
    }

    #[test]
    #[should_panic]
    fn recomputing_inside_with_panics() {
        let x = Var::new(1i32);
        let m = {
            let x = x.clone();
            Memo::new(move || x.get(), |deps: &[i32]| deps[0])
        };
        m.with(|_| {
            x.set(2);
            m.get()
        });
    }

    #[test]
    fn clones_share_the_cache() {
        let (count, computations) = counter();
        let m = Memo::new(
            || 1i32,
            move |_: &[i32]| {
                count.set(count.get() + 1);
                "value".to_owned()
            },
        );
        let m2 = m.clone();

        assert_eq!(m.get(), "value");
        assert_eq!(m2.get(), "value");
        assert_eq!(computations(), 1);
    }

    #[test]
    fn with_lends_the_value() {
        let m = Memo::new(|| [1, 2, 3], |deps: &[i32]| deps.to_vec());
        assert_eq!(m.with(|v| v.len()), 3);
        assert_eq!(m.with(|v| v[2]), 3);
    }

    #[test]
    fn into_fn() {
        let x = Var::new(2i64);
        let square = {
            let x = x.clone();
            Memo::new(move || x.get(), |deps: &[i64]| deps[0] * deps[0]).into_fn()
        };
        assert_eq!(square(), 4);
        x.set(3);
        assert_eq!(square(), 9);
    }

    #[test]
    fn debug_output() {
        let m = Memo::strict(|| 1i32, |_: &[i32]| ());
        assert_eq!(
            format!("{m:?}"),
            "Memo { label: None, strategy: Strict, cached: false }"
        );
    }
}
