use replace_with::replace_with_or_abort;
use std::{
    cell::{Ref, RefCell},
    fmt,
    rc::Rc,
};

/// A shared, mutable source value.
///
/// Vars are what dependency producers read from. Setting a var does not notify anyone, memos that
/// depend on it see the new value the next time they are called.
pub struct Var<T> {
    // Vars need to be cheaply cloned, so that we can move them into dependency producers and
    // still change them from the outside.
    inner: Rc<RefCell<T>>,
}

impl<T> Var<T> {
    pub fn new(value: T) -> Self {
        Var {
            inner: Rc::new(RefCell::new(value)),
        }
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner.borrow().clone()
    }

    pub fn get_ref(&self) -> Ref<T> {
        self.inner.borrow()
    }

    /// Replaces the value and returns the previous one.
    pub fn set(&self, value: T) -> T {
        self.inner.replace(value)
    }

    /// Changes the value in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    /// Replaces the value with one computed from it.
    ///
    /// Aborts the process if `f` panics, because there would be no value left.
    pub fn apply(&self, f: impl FnOnce(T) -> T) {
        replace_with_or_abort(&mut *self.inner.borrow_mut(), f);
    }
}

/// Custom implementation of Clone to avoid putting a Clone requirement on T.
impl<T> Clone for Var<T> {
    fn clone(&self) -> Self {
        Var {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Default> Default for Var<T> {
    fn default() -> Self {
        Var::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Var<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Var").field(&*self.inner.borrow()).finish()
    }
}
