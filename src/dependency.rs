use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

/// A value that can be stored in a dependency snapshot.
///
/// `PartialEq` is the structural comparison. On top of that every dependency knows how to compare
/// itself by identity and how to copy itself deeply:
///
/// - `identical` is what a strict cell compares with. Shared references (`Rc`) are identical only
///   if they point to the same allocation, plain values are identical if they are equal.
/// - `structurally_equal` is what a structural cell compares with. It is `PartialEq`, except that
///   floating point `NaN`s are equal to each other.
/// - `deep_clone` is what a structural cell stores. It must not share any interior mutable state
///   with `self`, otherwise mutating the source value in place would also change the snapshot.
pub trait Dependency: Clone + PartialEq {
    fn identical(&self, other: &Self) -> bool;
    fn deep_clone(&self) -> Self;

    fn structurally_equal(&self, other: &Self) -> bool {
        self == other
    }
}

macro_rules! plain_dependency {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Dependency for $ty {
                fn identical(&self, other: &Self) -> bool {
                    self == other
                }

                fn deep_clone(&self) -> Self {
                    self.clone()
                }
            }
        )*
    };
}

plain_dependency!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    String,
    &'static str,
);

macro_rules! float_dependency {
    ($($ty:ty),*) => {
        $(
            impl Dependency for $ty {
                fn identical(&self, other: &Self) -> bool {
                    self == other
                }

                fn deep_clone(&self) -> Self {
                    *self
                }

                fn structurally_equal(&self, other: &Self) -> bool {
                    self == other || (self.is_nan() && other.is_nan())
                }
            }
        )*
    };
}

float_dependency!(f32, f64);

impl<T: Dependency> Dependency for Rc<T> {
    fn identical(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }

    fn deep_clone(&self) -> Self {
        Rc::new((**self).deep_clone())
    }

    fn structurally_equal(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other) || (**self).structurally_equal(&**other)
    }
}

/// A `RefCell` has no identity of its own, it's identical if its contents are. Wrap it in an `Rc`
/// to share it.
impl<T: Dependency> Dependency for RefCell<T> {
    fn identical(&self, other: &Self) -> bool {
        self.borrow().identical(&other.borrow())
    }

    fn deep_clone(&self) -> Self {
        RefCell::new(self.borrow().deep_clone())
    }

    fn structurally_equal(&self, other: &Self) -> bool {
        self.borrow().structurally_equal(&other.borrow())
    }
}

impl<T: Dependency> Dependency for Vec<T> {
    fn identical(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.identical(b))
    }

    fn deep_clone(&self) -> Self {
        self.iter().map(Dependency::deep_clone).collect()
    }

    fn structurally_equal(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.structurally_equal(b))
    }
}

impl<T: Dependency> Dependency for Option<T> {
    fn identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.identical(b),
            (None, None) => true,
            _ => false,
        }
    }

    fn deep_clone(&self) -> Self {
        self.as_ref().map(Dependency::deep_clone)
    }

    fn structurally_equal(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.structurally_equal(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<K, V> Dependency for BTreeMap<K, V>
where
    K: Clone + Ord,
    V: Dependency,
{
    fn identical(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other)
                .all(|((ka, va), (kb, vb))| ka == kb && va.identical(vb))
    }

    fn deep_clone(&self) -> Self {
        self.iter()
            .map(|(k, v)| (k.clone(), v.deep_clone()))
            .collect()
    }

    fn structurally_equal(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other)
                .all(|((ka, va), (kb, vb))| ka == kb && va.structurally_equal(vb))
    }
}

macro_rules! tuple_dependency {
    ($($name:ident $idx:tt),+) => {
        impl<$($name: Dependency),+> Dependency for ($($name,)+) {
            fn identical(&self, other: &Self) -> bool {
                $(self.$idx.identical(&other.$idx))&&+
            }

            fn deep_clone(&self) -> Self {
                ($(self.$idx.deep_clone(),)+)
            }

            fn structurally_equal(&self, other: &Self) -> bool {
                $(self.$idx.structurally_equal(&other.$idx))&&+
            }
        }
    };
}

tuple_dependency!(A 0);
tuple_dependency!(A 0, B 1);
tuple_dependency!(A 0, B 1, C 2);
tuple_dependency!(A 0, B 1, C 2, D 3);

/// Normalizes whatever a dependency producer returns into an ordered dependency list.
///
/// - nothing (`None`, `Value::Null`) becomes an empty list,
/// - a single value becomes a one element list,
/// - a sequence (`Vec`, array, `Value::List`) is used as is.
pub trait IntoDeps {
    type Item: Dependency;

    fn into_deps(self) -> Vec<Self::Item>;
}

impl<D: Dependency> IntoDeps for Vec<D> {
    type Item = D;

    fn into_deps(self) -> Vec<D> {
        self
    }
}

impl<D: Dependency, const N: usize> IntoDeps for [D; N] {
    type Item = D;

    fn into_deps(self) -> Vec<D> {
        self.into()
    }
}

impl<D: Dependency> IntoDeps for Option<D> {
    type Item = D;

    fn into_deps(self) -> Vec<D> {
        self.into_iter().collect()
    }
}

impl<T: Dependency> IntoDeps for Rc<T> {
    type Item = Rc<T>;

    fn into_deps(self) -> Vec<Rc<T>> {
        vec![self]
    }
}

macro_rules! single_dependency {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoDeps for $ty {
                type Item = $ty;

                fn into_deps(self) -> Vec<$ty> {
                    vec![self]
                }
            }
        )*
    };
}

single_dependency!(
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    &'static str,
);
