// vim: tw=80
//! Actions: what a mock method does when an expectation is dispatched.
//!
//! An [`Action`] is a type-erased, shareable unit of behavior taking the
//! call's packed argument tuple and producing the return value.  Side
//! effects use `Action<I, ()>` and compose with a final value-producing
//! step through [`do_all`].

use std::sync::{Arc, Mutex};

use fragile::Fragile;

use crate::report::{usage_error, UsageError};

pub mod composite;
pub use composite::*;

/// The behavior of an action.  Implement this for custom actions; the
/// built-in constructors cover the common cases.
pub trait ActionImpl<I, O>: Send + Sync {
    fn perform(&self, args: I) -> O;
}

enum Kind<I, O> {
    Run(Arc<dyn ActionImpl<I, O>>),
    /// Placeholder resolved by the dispatch engine into the method's
    /// default behavior.  Performing it directly is a usage error.
    DoDefault,
}

/// A shareable handle to an action over argument tuple `I` returning `O`.
pub struct Action<I, O> {
    kind: Kind<I, O>,
}

impl<I, O> Clone for Action<I, O> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            Kind::Run(a) => Kind::Run(a.clone()),
            Kind::DoDefault => Kind::DoDefault,
        };
        Action { kind }
    }
}

impl<I, O> Action<I, O> {
    pub fn new<A: ActionImpl<I, O> + 'static>(imp: A) -> Self {
        Action { kind: Kind::Run(Arc::new(imp)) }
    }

    pub(crate) fn is_do_default(&self) -> bool {
        matches!(self.kind, Kind::DoDefault)
    }

    /// Runs the action.  Must not be called on a [`do_default`] handle
    /// outside the dispatch engine.
    pub fn perform(&self, args: I) -> O {
        match &self.kind {
            Kind::Run(a) => a.perform(args),
            Kind::DoDefault => usage_error(UsageError::NestedDoDefault),
        }
    }
}

impl<I: 'static, O: 'static> Action<I, O> {
    /// Runs `self` for its side effects, then `next` for the value.
    pub fn then<O2: 'static>(self, next: Action<I, O2>) -> Action<I, O2>
    where
        I: Clone,
    {
        struct Then<I, O, O2> {
            first: Action<I, O>,
            second: Action<I, O2>,
        }
        impl<I: Clone, O, O2> ActionImpl<I, O2> for Then<I, O, O2> {
            fn perform(&self, args: I) -> O2 {
                self.first.perform(args.clone());
                self.second.perform(args)
            }
        }
        Action::new(Then { first: self, second: next })
    }

    /// Discards the action's return value, turning it into a side effect
    /// step usable inside [`do_all`].
    pub fn ignore_result(self) -> Action<I, ()> {
        struct IgnoreResult<I, O>(Action<I, O>);
        impl<I, O> ActionImpl<I, ()> for IgnoreResult<I, O> {
            fn perform(&self, args: I) {
                self.0.perform(args);
            }
        }
        Action::new(IgnoreResult(self))
    }
}

struct FnAction<F>(F);

impl<I, O, F> ActionImpl<I, O> for FnAction<F>
where
    F: Fn(I) -> O + Send + Sync,
{
    fn perform(&self, args: I) -> O {
        (self.0)(args)
    }
}

/// An action from a closure over the packed argument tuple.  The
/// `invoke*` family unpacks the tuple instead, which usually reads
/// better.
pub fn from_fn<I, O, F>(f: F) -> Action<I, O>
where
    F: Fn(I) -> O + Send + Sync + 'static,
    I: 'static,
    O: 'static,
{
    Action::new(FnAction(f))
}

/// Returns a clone of `value` on every call.
pub fn return_const<I, O>(value: O) -> Action<I, O>
where
    I: 'static,
    O: Clone + Send + Sync + 'static,
{
    struct ReturnConst<O>(O);
    impl<I, O: Clone + Send + Sync> ActionImpl<I, O> for ReturnConst<O> {
        fn perform(&self, _args: I) -> O {
            self.0.clone()
        }
    }
    Action::new(ReturnConst(value))
}

/// Returns `value` by move.  Usable at most once; a second call panics.
/// Pair it with `will_once`.
pub fn by_move<I, O>(value: O) -> Action<I, O>
where
    I: 'static,
    O: Send + 'static,
{
    struct ByMove<O>(Mutex<Option<O>>);
    impl<I, O: Send> ActionImpl<I, O> for ByMove<O> {
        fn perform(&self, _args: I) -> O {
            match self.0.lock().unwrap().take() {
                Some(v) => v,
                None => panic!(
                    "Called a method twice that was expected only once"
                ),
            }
        }
    }
    Action::new(ByMove(Mutex::new(Some(value))))
}

/// Calls `f` with the unpacked arguments and returns its result.
pub fn invoke<I, O, F>(f: F) -> Action<I, O>
where
    F: CallWith<I, Output = O> + Send + Sync + 'static,
    I: 'static,
    O: 'static,
{
    struct Invoke<F>(F);
    impl<I, O, F> ActionImpl<I, O> for Invoke<F>
    where
        F: CallWith<I, Output = O> + Send + Sync,
    {
        fn perform(&self, args: I) -> O {
            self.0.call_with(args)
        }
    }
    Action::new(Invoke(f))
}

/// Like [`invoke`] for an `FnMut` closure; calls are serialized through a
/// lock.
pub fn invoke_mut<I, O, F>(f: F) -> Action<I, O>
where
    F: CallMutWith<I, Output = O> + Send + 'static,
    I: 'static,
    O: 'static,
{
    struct InvokeMut<F>(Mutex<F>);
    impl<I, O, F> ActionImpl<I, O> for InvokeMut<F>
    where
        F: CallMutWith<I, Output = O> + Send,
    {
        fn perform(&self, args: I) -> O {
            self.0.lock().unwrap().call_mut_with(args)
        }
    }
    Action::new(InvokeMut(Mutex::new(f)))
}

/// Like [`invoke`] for an `FnOnce` closure.  Usable at most once; a
/// second call panics.  Pair it with `will_once`.
pub fn invoke_once<I, O, F>(f: F) -> Action<I, O>
where
    F: CallOnceWith<I, Output = O> + Send + 'static,
    I: 'static,
    O: 'static,
{
    struct InvokeOnce<F>(Mutex<Option<F>>);
    impl<I, O, F> ActionImpl<I, O> for InvokeOnce<F>
    where
        F: CallOnceWith<I, Output = O> + Send,
    {
        fn perform(&self, args: I) -> O {
            match self.0.lock().unwrap().take() {
                Some(f) => f.call_once_with(args),
                None => panic!(
                    "Called a method twice that was expected only once"
                ),
            }
        }
    }
    Action::new(InvokeOnce(Mutex::new(Some(f))))
}

/// Single threaded version of [`invoke`] for closures that aren't
/// `Send`.  Performing the action from any other thread panics.
pub fn invoke_st<I, O, F>(f: F) -> Action<I, O>
where
    F: CallWith<I, Output = O> + 'static,
    I: 'static,
    O: 'static,
{
    struct InvokeSt<F>(Mutex<Fragile<F>>);
    impl<I, O, F> ActionImpl<I, O> for InvokeSt<F>
    where
        F: CallWith<I, Output = O>,
    {
        fn perform(&self, args: I) -> O {
            self.0.lock().unwrap().get().call_with(args)
        }
    }
    Action::new(InvokeSt(Mutex::new(Fragile::new(f))))
}

/// Single threaded version of [`invoke_mut`].
pub fn invoke_mut_st<I, O, F>(f: F) -> Action<I, O>
where
    F: CallMutWith<I, Output = O> + 'static,
    I: 'static,
    O: 'static,
{
    struct InvokeMutSt<F>(Mutex<Fragile<F>>);
    impl<I, O, F> ActionImpl<I, O> for InvokeMutSt<F>
    where
        F: CallMutWith<I, Output = O>,
    {
        fn perform(&self, args: I) -> O {
            self.0.lock().unwrap().get_mut().call_mut_with(args)
        }
    }
    Action::new(InvokeMutSt(Mutex::new(Fragile::new(f))))
}

/// Single threaded version of [`invoke_once`].
pub fn invoke_once_st<I, O, F>(f: F) -> Action<I, O>
where
    F: CallOnceWith<I, Output = O> + 'static,
    I: 'static,
    O: 'static,
{
    struct InvokeOnceSt<F>(Mutex<Option<Fragile<F>>>);
    impl<I, O, F> ActionImpl<I, O> for InvokeOnceSt<F>
    where
        F: CallOnceWith<I, Output = O>,
    {
        fn perform(&self, args: I) -> O {
            match self.0.lock().unwrap().take() {
                Some(f) => f.into_inner().call_once_with(args),
                None => panic!(
                    "Called a method twice that was expected only once"
                ),
            }
        }
    }
    Action::new(InvokeOnceSt(Mutex::new(Some(Fragile::new(f)))))
}

/// Calls `f`, ignoring the call's arguments entirely.
pub fn invoke_without_args<I, O, F>(f: F) -> Action<I, O>
where
    F: Fn() -> O + Send + Sync + 'static,
    I: 'static,
    O: 'static,
{
    from_fn(move |_args| f())
}

/// Stores a clone of `value` into the shared slot on every call.
pub fn assign<I, T>(dest: Arc<Mutex<T>>, value: T) -> Action<I, ()>
where
    I: 'static,
    T: Clone + Send + Sync + 'static,
{
    struct Assign<T> {
        dest: Arc<Mutex<T>>,
        value: T,
    }
    impl<I, T: Clone + Send + Sync> ActionImpl<I, ()> for Assign<T> {
        fn perform(&self, _args: I) {
            *self.dest.lock().unwrap() = self.value.clone();
        }
    }
    Action::new(Assign { dest, value })
}

/// Writes a clone of `value` through the call's `N`th argument, which
/// must be a mutable raw pointer.
///
/// # Safety
///
/// Every dispatched call must pass a valid, writable, non-null pointer in
/// argument `N`.
pub unsafe fn set_arg<const N: usize, I, T>(value: T) -> Action<I, ()>
where
    I: NthArg<N, Arg = *mut T> + 'static,
    T: Clone + Send + Sync + 'static,
{
    struct SetArg<const N: usize, T>(T);
    impl<const N: usize, I, T> ActionImpl<I, ()> for SetArg<N, T>
    where
        I: NthArg<N, Arg = *mut T>,
        T: Clone + Send + Sync,
    {
        fn perform(&self, args: I) {
            let p = args.nth();
            unsafe {
                *p = self.0.clone();
            }
        }
    }
    Action::new(SetArg::<N, T>(value))
}

/// Writes clones of `values` through the call's `N`th argument, treated
/// as a pointer to the start of an array.
///
/// # Safety
///
/// Every dispatched call must pass a valid, writable pointer to at least
/// `values.len()` elements in argument `N`.
pub unsafe fn set_array_arg<const N: usize, I, T>(
    values: Vec<T>,
) -> Action<I, ()>
where
    I: NthArg<N, Arg = *mut T> + 'static,
    T: Clone + Send + Sync + 'static,
{
    struct SetArrayArg<const N: usize, T>(Vec<T>);
    impl<const N: usize, I, T> ActionImpl<I, ()> for SetArrayArg<N, T>
    where
        I: NthArg<N, Arg = *mut T>,
        T: Clone + Send + Sync,
    {
        fn perform(&self, args: I) {
            let p = args.nth();
            for (i, v) in self.0.iter().enumerate() {
                unsafe {
                    *p.add(i) = v.clone();
                }
            }
        }
    }
    Action::new(SetArrayArg::<N, T>(values))
}

/// Panics with the given message when performed.
pub fn panics<I, O>(msg: impl Into<String>) -> Action<I, O>
where
    I: 'static,
    O: 'static,
{
    let msg = msg.into();
    from_fn(move |_args| panic!("{}", msg))
}

/// A placeholder that the dispatch engine resolves into the method's
/// default behavior: the `on_call` default action if one exists, the
/// registered or built-in default value otherwise.
pub fn do_default<I, O>() -> Action<I, O> {
    Action { kind: Kind::DoDefault }
}

/// Calls a closure with a tuple's fields as individual arguments.
/// Implemented for `Fn` closures of arity 0 through 5.
pub trait CallWith<I> {
    type Output;
    fn call_with(&self, args: I) -> Self::Output;
}

/// [`CallWith`] for `FnMut` closures.
pub trait CallMutWith<I> {
    type Output;
    fn call_mut_with(&mut self, args: I) -> Self::Output;
}

/// [`CallWith`] for `FnOnce` closures.
pub trait CallOnceWith<I> {
    type Output;
    fn call_once_with(self, args: I) -> Self::Output;
}

macro_rules! call_with_impl {
    ($(($($a:ident, $idx:tt),*);)*) => {$(
        impl<F, R, $($a),*> CallWith<($($a,)*)> for F
        where
            F: Fn($($a),*) -> R,
        {
            type Output = R;
            fn call_with(&self, args: ($($a,)*)) -> R {
                let _ = &args;
                self($(args.$idx),*)
            }
        }

        impl<F, R, $($a),*> CallMutWith<($($a,)*)> for F
        where
            F: FnMut($($a),*) -> R,
        {
            type Output = R;
            fn call_mut_with(&mut self, args: ($($a,)*)) -> R {
                let _ = &args;
                self($(args.$idx),*)
            }
        }

        impl<F, R, $($a),*> CallOnceWith<($($a,)*)> for F
        where
            F: FnOnce($($a),*) -> R,
        {
            type Output = R;
            fn call_once_with(self, args: ($($a,)*)) -> R {
                let _ = &args;
                self($(args.$idx),*)
            }
        }
    )*}
}

call_with_impl! {
    ();
    (A0, 0);
    (A0, 0, A1, 1);
    (A0, 0, A1, 1, A2, 2);
    (A0, 0, A1, 1, A2, 2, A3, 3);
    (A0, 0, A1, 1, A2, 2, A3, 3, A4, 4);
}

/// Extracts the `N`th field of an argument tuple by value.  Implemented
/// for tuples of arity 1 through 5.
pub trait NthArg<const N: usize> {
    type Arg;
    fn nth(self) -> Self::Arg;
}

macro_rules! nth_arg_impl {
    ($(($n:tt, $sel:ident, ($($a:ident),+));)*) => {$(
        impl<$($a),+> NthArg<$n> for ($($a,)+) {
            type Arg = $sel;
            fn nth(self) -> $sel {
                self.$n
            }
        }
    )*}
}

nth_arg_impl! {
    (0, A0, (A0));
    (0, A0, (A0, A1));
    (1, A1, (A0, A1));
    (0, A0, (A0, A1, A2));
    (1, A1, (A0, A1, A2));
    (2, A2, (A0, A1, A2));
    (0, A0, (A0, A1, A2, A3));
    (1, A1, (A0, A1, A2, A3));
    (2, A2, (A0, A1, A2, A3));
    (3, A3, (A0, A1, A2, A3));
    (0, A0, (A0, A1, A2, A3, A4));
    (1, A1, (A0, A1, A2, A3, A4));
    (2, A2, (A0, A1, A2, A3, A4));
    (3, A3, (A0, A1, A2, A3, A4));
    (4, A4, (A0, A1, A2, A3, A4));
}
