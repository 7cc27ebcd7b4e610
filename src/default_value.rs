// vim: tw=80
//! The process-wide default value registry.
//!
//! When a call reaches no expectation with an explicit action, the engine
//! falls back to a default return value: first whatever was registered
//! here for the return type, then the type's `Default` impl (on the
//! nightly feature, where specialization can detect it).

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Mutex;

use cfg_if::cfg_if;
use lazy_static::lazy_static;

type Factory = Box<dyn Fn() -> Box<dyn Any> + Send + Sync>;

lazy_static! {
    static ref REGISTRY: Mutex<HashMap<TypeId, Factory>> =
        Mutex::new(HashMap::new());
}

/// Registers a default value for type `T`, cloned on every use.
/// Replaces any previous registration for `T`.
pub fn set<T>(value: T)
where
    T: Clone + Send + Sync + 'static,
{
    set_factory(move || value.clone());
}

/// Registers a factory producing the default value for type `T`.  Use
/// this instead of [`set`] for move-only types.
///
/// The factory runs with the registry lock held, so it must not itself
/// touch the registry.
pub fn set_factory<T, F>(f: F)
where
    T: 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    REGISTRY.lock().unwrap().insert(
        TypeId::of::<T>(),
        Box::new(move || Box::new(f())),
    );
}

/// Removes any registered default for type `T`.
pub fn clear<T: 'static>() {
    REGISTRY.lock().unwrap().remove(&TypeId::of::<T>());
}

/// Whether a default for `T` has been registered.
pub fn is_set<T: 'static>() -> bool {
    REGISTRY.lock().unwrap().contains_key(&TypeId::of::<T>())
}

/// Whether [`get`] would produce a value for `T`, registered or built in.
pub fn exists<T: BuiltInDefault>() -> bool {
    is_set::<T>() || T::built_in().is_some()
}

/// Produces the registered default for `T`, if any.  Unlike [`get`] this
/// never consults the built-in default, and so works for any type.
pub fn obtain<T: 'static>() -> Option<T> {
    let registry = REGISTRY.lock().unwrap();
    let boxed = registry.get(&TypeId::of::<T>())?();
    boxed.downcast::<T>().ok().map(|b| *b)
}

/// Produces the default for `T`: the registered one if any, the built-in
/// one otherwise.
pub fn get<T: BuiltInDefault>() -> Option<T> {
    obtain::<T>().or_else(T::built_in)
}

/// The fallback default value a type carries on its own, without any
/// registration.
pub trait BuiltInDefault: Sized + 'static {
    fn built_in() -> Option<Self>;
}

cfg_if! {
    if #[cfg(feature = "nightly")] {
        impl<T: 'static> BuiltInDefault for T {
            default fn built_in() -> Option<T> {
                None
            }
        }

        impl<T: Default + 'static> BuiltInDefault for T {
            fn built_in() -> Option<T> {
                Some(T::default())
            }
        }
    } else {
        impl<T: Default + 'static> BuiltInDefault for T {
            fn built_in() -> Option<T> {
                Some(T::default())
            }
        }
    }
}

#[doc(hidden)]
pub trait ReturnDefault<O> {
    fn return_default() -> O;
}

/// The engine's unconditional fallback for a return type with neither an
/// action nor a registered default.
#[derive(Default)]
#[doc(hidden)]
pub struct DefaultReturner<O: 'static>(PhantomData<O>);

cfg_if! {
    if #[cfg(feature = "nightly")] {
        impl<O> ReturnDefault<O> for DefaultReturner<O> {
            default fn return_default() -> O {
                panic!("Can only return default values for types that impl std::Default");
            }
        }

        impl<O: Default> ReturnDefault<O> for DefaultReturner<O> {
            fn return_default() -> O {
                O::default()
            }
        }
    } else {
        impl<O> ReturnDefault<O> for DefaultReturner<O> {
            fn return_default() -> O {
                panic!("Returning default values requires the \"nightly\" feature");
            }
        }
    }
}

/// The full fallback chain for a return type: registry first, then the
/// `Default` impl where the compiler can see one.
pub(crate) fn produce<O: 'static>() -> O {
    obtain::<O>()
        .unwrap_or_else(DefaultReturner::<O>::return_default)
}

#[cfg(test)]
mod t {
    use super::*;

    // Every test uses its own types: the registry is process-wide and
    // the test harness runs tests concurrently.

    #[test]
    fn set_and_obtain() {
        #[derive(Clone, Debug, Eq, PartialEq)]
        struct Tok(u32);
        assert!(!is_set::<Tok>());
        assert_eq!(None, obtain::<Tok>());
        set(Tok(7));
        assert!(is_set::<Tok>());
        assert_eq!(Some(Tok(7)), obtain::<Tok>());
        // Each use produces a fresh clone.
        assert_eq!(Some(Tok(7)), obtain::<Tok>());
        clear::<Tok>();
        assert!(!is_set::<Tok>());
        assert_eq!(None, obtain::<Tok>());
    }

    #[test]
    fn replacing_a_registration() {
        #[derive(Clone, Debug, Eq, PartialEq)]
        struct Tok(u32);
        set(Tok(1));
        set(Tok(2));
        assert_eq!(Some(Tok(2)), obtain::<Tok>());
        clear::<Tok>();
    }

    #[test]
    fn factories_support_move_only_types() {
        #[derive(Debug, Eq, PartialEq)]
        struct MoveOnly(u32);
        set_factory(|| MoveOnly(9));
        assert_eq!(Some(MoveOnly(9)), obtain::<MoveOnly>());
        assert_eq!(Some(MoveOnly(9)), obtain::<MoveOnly>());
        clear::<MoveOnly>();
    }

    #[test]
    fn built_in_defaults() {
        #[derive(Clone, Debug, Default, Eq, PartialEq)]
        struct Tok(u32);
        assert!(exists::<Tok>());
        assert_eq!(Some(Tok(0)), get::<Tok>());
        // A registration takes precedence over the built-in.
        set(Tok(5));
        assert_eq!(Some(Tok(5)), get::<Tok>());
        clear::<Tok>();
        assert_eq!(Some(Tok(0)), get::<Tok>());
    }

    #[cfg(feature = "nightly")]
    #[test]
    fn no_built_in_without_default() {
        struct NoDefault;
        assert!(!exists::<NoDefault>());
        assert!(get::<NoDefault>().is_none());
    }
}
