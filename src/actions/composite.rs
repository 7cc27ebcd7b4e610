// vim: tw=80
//! Composite actions: sequencing side effects and routing arguments.

use std::marker::PhantomData;

use super::{Action, ActionImpl, CallOnceWith, NthArg};

/// One side effect step for [`do_all`], run against a borrowed view of
/// the call's arguments.  Any `Action<I, ()>` over cloneable arguments
/// converts into one; build one with [`step`] when the argument tuple
/// is move-only.
pub struct Step<I>(Box<dyn Fn(&I) + Send + Sync>);

impl<I> Step<I> {
    fn run(&self, args: &I) {
        (self.0)(args)
    }
}

/// A [`do_all`] step from a closure over a borrowed view of the
/// arguments.
pub fn step<I, F>(f: F) -> Step<I>
where
    F: Fn(&I) + Send + Sync + 'static,
{
    Step(Box::new(f))
}

impl<I: Clone + 'static> From<Action<I, ()>> for Step<I> {
    fn from(action: Action<I, ()>) -> Self {
        // The action expects owned arguments, so it clones the borrowed
        // view on every call.
        Step(Box::new(move |args: &I| action.perform(args.clone())))
    }
}

struct DoAll<I, O> {
    steps: Vec<Step<I>>,
    last: Action<I, O>,
}

impl<I, O> ActionImpl<I, O> for DoAll<I, O> {
    fn perform(&self, args: I) -> O {
        // Steps observe the arguments by reference; only the final step
        // consumes them, so move-only values reach it intact.
        for step in &self.steps {
            step.run(&args);
        }
        self.last.perform(args)
    }
}

/// Performs each side effect step in order, then `last` for the return
/// value.
pub fn do_all<I, O, S>(steps: Vec<S>, last: Action<I, O>) -> Action<I, O>
where
    I: 'static,
    O: 'static,
    S: Into<Step<I>>,
{
    Action::new(DoAll {
        steps: steps.into_iter().map(S::into).collect(),
        last,
    })
}

struct WithArg<const N: usize, A: 'static, O: 'static> {
    inner: Action<(A,), O>,
}

impl<const N: usize, I, A, O> ActionImpl<I, O> for WithArg<N, A, O>
where
    I: NthArg<N, Arg = A>,
{
    fn perform(&self, args: I) -> O {
        self.inner.perform((args.nth(),))
    }
}

/// Adapts an action over a single argument to a wider call by selecting
/// the `N`th argument.
pub fn with_arg<const N: usize, I, O>(
    inner: Action<(I::Arg,), O>,
) -> Action<I, O>
where
    I: NthArg<N> + 'static,
    I::Arg: 'static,
    O: 'static,
{
    Action::new(WithArg::<N, I::Arg, O> { inner })
}

struct WithoutArgs<I, O> {
    inner: Action<(), O>,
    _p: PhantomData<fn(I)>,
}

impl<I, O> ActionImpl<I, O> for WithoutArgs<I, O> {
    fn perform(&self, _args: I) -> O {
        self.inner.perform(())
    }
}

/// Adapts a no-argument action to a call of any arity, dropping the
/// arguments.
pub fn without_args<I, O>(inner: Action<(), O>) -> Action<I, O>
where
    I: 'static,
    O: 'static,
{
    Action::new(WithoutArgs { inner, _p: PhantomData })
}

struct InvokeArg<const N: usize, P>(P);

impl<const N: usize, I, P, O> ActionImpl<I, O> for InvokeArg<N, P>
where
    I: NthArg<N>,
    I::Arg: CallOnceWith<P, Output = O>,
    P: Clone + Send + Sync,
{
    fn perform(&self, args: I) -> O {
        args.nth().call_once_with(self.0.clone())
    }
}

/// Calls the `N`th argument, itself a callable, with the given parameter
/// tuple.  The usual way to fire a callback passed into the mock.
pub fn invoke_arg<const N: usize, I, P, O>(params: P) -> Action<I, O>
where
    I: NthArg<N> + 'static,
    I::Arg: CallOnceWith<P, Output = O>,
    P: Clone + Send + Sync + 'static,
    O: 'static,
{
    Action::new(InvokeArg::<N, P>(params))
}

#[cfg(test)]
mod t {
    use std::sync::{Arc, Mutex};

    use crate::actions::{assign, do_default, invoke, return_const};

    use super::*;

    #[test]
    fn do_all_runs_steps_then_last() {
        let log = Arc::new(Mutex::new(0));
        let a = do_all(
            vec![
                assign(log.clone(), 1),
                invoke(|x: i32, _: i32| x).ignore_result(),
            ],
            invoke(|a: i32, b: i32| a + b),
        );
        assert_eq!(7, a.perform((3, 4)));
        assert_eq!(1, *log.lock().unwrap());
    }

    #[test]
    fn do_all_moves_args_into_last_step() {
        // Arguments are cloned for the steps but moved into the final
        // one; the clone count proves it.
        struct Counted(Arc<Mutex<usize>>);
        impl Clone for Counted {
            fn clone(&self) -> Self {
                *self.0.lock().unwrap() += 1;
                Counted(self.0.clone())
            }
        }
        let clones = Arc::new(Mutex::new(0));
        let a = do_all(
            vec![invoke(|_: Counted| ()).ignore_result()],
            invoke(|c: Counted| c),
        );
        let got = a.perform((Counted(clones.clone()),));
        assert!(Arc::ptr_eq(&got.0, &clones));
        assert_eq!(1, *clones.lock().unwrap());
    }

    #[test]
    fn do_all_accepts_move_only_arguments() {
        struct Ticket(String);
        let seen = Arc::new(Mutex::new(String::new()));
        let observer = seen.clone();
        let a = do_all(
            vec![step(move |args: &(Ticket,)| {
                let (Ticket(id),) = args;
                observer.lock().unwrap().clone_from(id);
            })],
            invoke(|t: Ticket| t.0),
        );
        assert_eq!("t-17", a.perform((Ticket("t-17".to_owned()),)));
        assert_eq!("t-17", *seen.lock().unwrap());
    }

    #[test]
    #[should_panic(expected = "composite action")]
    fn do_default_inside_do_all() {
        let a = do_all(
            vec![do_default::<(i32,), ()>()],
            return_const(0),
        );
        a.perform((1,));
    }

    #[test]
    fn argument_routing() {
        let a = with_arg::<1, (i32, &str), _>(
            invoke(|s: &str| s.len()));
        assert_eq!(5, a.perform((9, "hello")));

        let a = without_args::<(i32,), _>(return_const(3));
        assert_eq!(3, a.perform((99,)));
    }

    #[test]
    fn callback_invocation() {
        let cb = |x: i32, y: i32| x * y;
        let a = invoke_arg::<1, (u8, fn(i32, i32) -> i32), _, _>((6, 7));
        assert_eq!(42, a.perform((0u8, cb as fn(i32, i32) -> i32)));
    }
}
