// vim: tw=80
//! Mock methods: expectation storage and call dispatch.

use std::any;
use std::collections::hash_map::HashMap;
use std::fmt;
use std::fmt::Write as _;
use std::panic::Location;
use std::sync::Mutex;
use std::thread;

use downcast::*;

use crate::actions::Action;
use crate::default_value;
use crate::expectation::Expectation;
use crate::matchers::{anything, Matcher};
use crate::report::{usage_error, verbosity_at_least, UsageError, Verbosity};

struct DefaultHandler<I, O> {
    matcher: Matcher<I>,
    action: Action<I, O>,
}

struct MethodInner<I, O> {
    expectations: Vec<Expectation<I, O>>,
    default_handlers: Vec<DefaultHandler<I, O>>,
}

/// A single mockable method: stores its expectations and default
/// handlers, and dispatches calls to them.
///
/// `I` is the packed argument tuple and `O` the return type.  The
/// method itself holds no argument values, so it is `Send + Sync`
/// whatever `I` is.
pub struct MockMethod<I: 'static, O: 'static> {
    name: String,
    inner: Mutex<MethodInner<I, O>>,
}

/// What the dispatch scan decided, computed under the method lock.  The
/// chosen action runs after the lock is dropped, so actions may
/// themselves call back into the same mock.
enum Selection<I, O> {
    Action(Option<Action<I, O>>),
    Uninteresting,
    OverSaturated(String),
    Unexpected(String),
}

impl<I: 'static, O: 'static> MockMethod<I, O> {
    pub fn new(name: impl Into<String>) -> Self {
        MockMethod {
            name: name.into(),
            inner: Mutex::new(MethodInner {
                expectations: Vec::new(),
                default_handlers: Vec::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a new expectation and returns a handle for configuring it.
    ///
    /// Later expectations take precedence over earlier ones with
    /// overlapping matchers, so write the general ones first and the
    /// specific ones after.
    #[track_caller]
    pub fn expect(&self) -> Expectation<I, O> {
        let e = Expectation::new(&self.name, Location::caller());
        self.inner.lock().unwrap().expectations.push(e.clone());
        e
    }

    /// Starts a default handler: the behavior for matching calls that
    /// reach no expectation action, either because no expectation was
    /// set or because the dispatched one had none.  Finish with
    /// [`OnCall::will_by_default`].
    pub fn on_call(&self) -> OnCall<'_, I, O> {
        OnCall { method: self, matcher: anything() }
    }

    /// Dispatches a call to the newest eligible expectation.
    ///
    /// # Panics
    ///
    /// Panics if the call matches no expectation, over-saturates one, or
    /// reaches neither an action nor any default value for `O`.
    pub fn call(&self, args: I) -> O
    where
        I: fmt::Debug,
    {
        let selection = self.select(&args);
        match selection {
            Selection::Action(Some(action)) if !action.is_do_default() => {
                action.perform(args)
            },
            Selection::Action(_) => self.perform_default(args),
            Selection::Uninteresting => {
                if verbosity_at_least(Verbosity::Warnings) {
                    tracing::warn!(
                        method = %self.name,
                        args = ?args,
                        "uninteresting mock method call"
                    );
                }
                self.perform_default(args)
            },
            Selection::OverSaturated(msg) | Selection::Unexpected(msg) => {
                panic!("{}", msg)
            },
        }
    }

    /// The scan itself: newest first, skipping retired expectations,
    /// argument mismatches, and unsatisfied prerequisites.
    fn select(&self, args: &I) -> Selection<I, O>
    where
        I: fmt::Debug,
    {
        let inner = self.inner.lock().unwrap();
        if inner.expectations.is_empty() {
            return Selection::Uninteresting;
        }
        let mut saturated: Option<&Expectation<I, O>> = None;
        for e in inner.expectations.iter().rev() {
            let core = e.core();
            if core.is_retired()
                || !e.matches(args)
                || !core.all_prerequisites_satisfied()
            {
                continue;
            }
            if core.is_saturated() {
                saturated.get_or_insert(e);
                continue;
            }
            core.retire_prerequisites();
            core.record_call();
            if verbosity_at_least(Verbosity::Info) {
                tracing::info!(
                    method = %self.name,
                    location = %core.location(),
                    "expected mock method call"
                );
            }
            return Selection::Action(e.next_action());
        }
        if let Some(e) = saturated {
            let core = e.core();
            Selection::OverSaturated(format!(
                "expectation on {} set at {} called more than expected: {}",
                self.name, core.location(), core.describe_state()
            ))
        } else {
            Selection::Unexpected(self.describe_unexpected(&inner, args))
        }
    }

    fn describe_unexpected(
        &self,
        inner: &MethodInner<I, O>,
        args: &I,
    ) -> String
    where
        I: fmt::Debug,
    {
        let mut msg = format!(
            "no matching expectation found for {}({:?})\ntried \
             expectations:",
            self.name, args
        );
        for (i, e) in inner.expectations.iter().enumerate() {
            let core = e.core();
            let _ = write!(msg, "\n#{} set at {}: expected args {}",
                i, core.location(), e.describe_matcher());
            let why = e.explain_mismatch(args);
            if !why.is_empty() {
                let _ = write!(msg, ", {why}");
            }
            let _ = write!(msg, "; {}", core.describe_state());
        }
        msg
    }

    /// Resolves the default behavior: the newest matching `on_call`
    /// handler, then the registered or built-in default value for `O`.
    fn perform_default(&self, args: I) -> O {
        let handler = {
            let inner = self.inner.lock().unwrap();
            inner.default_handlers.iter().rev()
                .find(|h| h.matcher.matches(&args))
                .map(|h| h.action.clone())
        };
        match handler {
            Some(action) => action.perform(args),
            None => default_value::produce::<O>(),
        }
    }

    /// Verifies all expectations, panicking on the first unsatisfied
    /// one, then forgets them.  Default handlers survive a checkpoint.
    pub fn checkpoint(&self) {
        let mut inner = self.inner.lock().unwrap();
        for e in &inner.expectations {
            e.core().verify();
        }
        inner.expectations.clear();
    }
}

impl<I: 'static, O: 'static> Drop for MockMethod<I, O> {
    fn drop(&mut self) {
        if thread::panicking() {
            return;
        }
        if let Ok(inner) = self.inner.lock() {
            for e in &inner.expectations {
                e.core().verify();
            }
        }
    }
}

/// Builder for a default handler, from [`MockMethod::on_call`].
#[must_use = "a default handler does nothing until will_by_default"]
pub struct OnCall<'a, I: 'static, O: 'static> {
    method: &'a MockMethod<I, O>,
    matcher: Matcher<I>,
}

impl<I: 'static, O: 'static> OnCall<'_, I, O> {
    /// Restricts the handler to matching calls.  Later handlers take
    /// precedence, so order general to specific.
    pub fn with(mut self, matcher: Matcher<I>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Installs `action` as the default behavior and finishes the
    /// handler.
    pub fn will_by_default(self, action: Action<I, O>) {
        if action.is_do_default() {
            usage_error(UsageError::CircularDoDefault);
        }
        self.method.inner.lock().unwrap().default_handlers.push(
            DefaultHandler { matcher: self.matcher, action },
        );
    }
}

/// One mockable method with a generic type signature: each distinct
/// monomorphization gets its own independent [`MockMethod`].
pub struct GenericMockMethod {
    name: String,
    methods: Mutex<HashMap<Key, Box<dyn AnyMockMethod>>>,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
struct Key(any::TypeId);

impl Key {
    fn new<I: 'static, O: 'static>() -> Self {
        Key(any::TypeId::of::<(I, O)>())
    }
}

#[doc(hidden)]
pub trait AnyMockMethod: Any + Send + Sync {
    fn verify_all(&self);
}
downcast!(dyn AnyMockMethod);

impl<I, O> AnyMockMethod for MockMethod<I, O>
where
    I: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    fn verify_all(&self) {
        self.checkpoint();
    }
}

impl GenericMockMethod {
    pub fn new(name: impl Into<String>) -> Self {
        GenericMockMethod {
            name: name.into(),
            methods: Mutex::new(HashMap::new()),
        }
    }

    /// Adds an expectation for one concrete signature of the method.
    #[track_caller]
    pub fn expect<I, O>(&self) -> Expectation<I, O>
    where
        I: Send + Sync + 'static,
        O: Send + Sync + 'static,
    {
        let location = Location::caller();
        let mut methods = self.methods.lock().unwrap();
        let method = methods
            .entry(Key::new::<I, O>())
            .or_insert_with(|| {
                Box::new(MockMethod::<I, O>::new(self.name.clone()))
            })
            .downcast_mut::<MockMethod<I, O>>()
            .unwrap();
        let e = Expectation::new(&method.name, location);
        method.inner.lock().unwrap().expectations.push(e.clone());
        e
    }

    /// Dispatches a call to the expectations of its concrete signature.
    /// A signature with no expectations at all is an uninteresting call.
    pub fn call<I, O>(&self, args: I) -> O
    where
        I: fmt::Debug + Send + Sync + 'static,
        O: Send + Sync + 'static,
    {
        let methods = self.methods.lock().unwrap();
        match methods.get(&Key::new::<I, O>()) {
            Some(m) => {
                let method =
                    m.downcast_ref::<MockMethod<I, O>>().unwrap();
                let selection = method.select(&args);
                drop(methods);
                // Re-borrowing under the outer map lock would hold it
                // across the action; resolve the rest lock-free.
                match selection {
                    Selection::Action(Some(action))
                        if !action.is_do_default() =>
                    {
                        action.perform(args)
                    },
                    Selection::Action(_) => {
                        default_value::produce::<O>()
                    },
                    Selection::Uninteresting => {
                        self.uninteresting(args)
                    },
                    Selection::OverSaturated(msg)
                    | Selection::Unexpected(msg) => panic!("{}", msg),
                }
            },
            None => {
                drop(methods);
                self.uninteresting(args)
            },
        }
    }

    fn uninteresting<I: fmt::Debug, O: 'static>(&self, args: I) -> O {
        if verbosity_at_least(Verbosity::Warnings) {
            tracing::warn!(
                method = %self.name,
                args = ?args,
                "uninteresting mock method call"
            );
        }
        default_value::produce::<O>()
    }

    /// Verifies and forgets the expectations of every signature.
    pub fn checkpoint(&self) {
        let mut methods = self.methods.lock().unwrap();
        for m in methods.values() {
            m.verify_all();
        }
        methods.clear();
    }
}

#[cfg(test)]
mod t {
    use crate::actions::{invoke, return_const};
    use crate::matchers::{eq, fields_are, gt};

    use super::*;

    #[test]
    fn dispatches_to_matching_expectation() {
        let m = MockMethod::<(i32,), i32>::new("frob");
        m.expect().with(fields_are((eq(1),))).return_const(10);
        m.expect().with(fields_are((eq(2),))).return_const(20);
        assert_eq!(10, m.call((1,)));
        assert_eq!(20, m.call((2,)));
        assert_eq!(10, m.call((1,)));
        m.checkpoint();
    }

    #[test]
    fn newest_matching_expectation_wins() {
        let m = MockMethod::<(i32,), &'static str>::new("frob");
        m.expect().times_any().return_const("general");
        m.expect().with(fields_are((gt(10),))).times_any()
            .return_const("specific");
        assert_eq!("specific", m.call((11,)));
        assert_eq!("general", m.call((3,)));
        m.checkpoint();
    }

    #[test]
    fn saturated_expectation_yields_to_earlier_one() {
        let m = MockMethod::<(), i32>::new("frob");
        m.expect().times_any().return_const(0);
        m.expect().times(2).return_const(1);
        assert_eq!(1, m.call(()));
        assert_eq!(1, m.call(()));
        // The newer expectation is saturated, so the older absorbs the
        // rest.
        assert_eq!(0, m.call(()));
        m.checkpoint();
    }

    #[test]
    fn dropping_the_method_verifies_expectations() {
        let result = std::panic::catch_unwind(|| {
            let m = MockMethod::<(i32,), i32>::new("frob");
            m.expect().times(1).return_const(1);
        });
        let msg = *result.unwrap_err().downcast::<String>().unwrap();
        assert!(msg.contains("unsatisfied expectation on frob"), "{msg}");
    }

    #[test]
    #[should_panic(expected = "called more than expected")]
    fn over_saturation_panics() {
        let m = MockMethod::<(), i32>::new("frob");
        m.expect().times(1).return_const(1);
        assert_eq!(1, m.call(()));
        m.call(());
    }

    #[test]
    #[should_panic(expected = "no matching expectation found for frob((7,))")]
    fn unexpected_call_panics() {
        let m = MockMethod::<(i32,), i32>::new("frob");
        m.expect().with(fields_are((eq(1),))).times_any()
            .return_const(1);
        m.call((7,));
    }

    #[test]
    fn uninteresting_call_returns_registered_default() {
        #[derive(Clone, Debug, Eq, PartialEq)]
        struct Tok(i32);
        crate::default_value::set(Tok(5));
        let m = MockMethod::<(i32,), Tok>::new("frob");
        assert_eq!(Tok(5), m.call((7,)));
        crate::default_value::clear::<Tok>();
    }

    #[test]
    fn on_call_provides_default_behavior() {
        let m = MockMethod::<(i32,), i32>::new("frob");
        m.on_call().will_by_default(invoke(|x: i32| x * 2));
        // No expectations: uninteresting, but the handler answers.
        assert_eq!(14, m.call((7,)));
        // An expectation without actions falls through to the handler.
        m.expect().times(1);
        assert_eq!(6, m.call((3,)));
        m.checkpoint();
    }

    #[test]
    fn newest_matching_on_call_wins() {
        let m = MockMethod::<(i32,), i32>::new("frob");
        m.on_call().will_by_default(return_const(1));
        m.on_call().with(fields_are((gt(10),)))
            .will_by_default(return_const(2));
        assert_eq!(1, m.call((5,)));
        assert_eq!(2, m.call((50,)));
    }

    #[test]
    fn do_default_action_resolves_to_handler() {
        let m = MockMethod::<(i32,), i32>::new("frob");
        m.on_call().will_by_default(return_const(42));
        m.expect().times(1)
            .will_once(crate::actions::do_default());
        assert_eq!(42, m.call((0,)));
        m.checkpoint();
    }

    #[test]
    #[should_panic(expected = "cannot itself be a default handler")]
    fn do_default_as_default_handler() {
        let m = MockMethod::<(i32,), i32>::new("frob");
        m.on_call().will_by_default(crate::actions::do_default());
    }

    #[test]
    #[should_panic(expected = "unsatisfied expectation on frob")]
    fn checkpoint_catches_unsatisfied() {
        let m = MockMethod::<(), i32>::new("frob");
        m.expect().times(2).return_const(1);
        assert_eq!(1, m.call(()));
        m.checkpoint();
    }

    #[test]
    fn checkpoint_forgets_expectations() {
        let m = MockMethod::<(), i32>::new("frob");
        m.on_call().will_by_default(return_const(0));
        m.expect().times(1).return_const(9);
        assert_eq!(9, m.call(()));
        m.checkpoint();
        // Former expectations are gone; this is uninteresting now and
        // falls back to the default handler, which survives.
        assert_eq!(0, m.call(()));
    }

    #[test]
    fn retire_on_saturation_reroutes_calls() {
        let m = MockMethod::<(), i32>::new("frob");
        m.expect().times_any().return_const(0);
        m.expect().times(1).return_const(1).retires_on_saturation();
        assert_eq!(1, m.call(()));
        assert_eq!(0, m.call(()));
        m.checkpoint();
    }

    #[test]
    fn generic_methods_dispatch_per_signature() {
        let m = GenericMockMethod::new("convert");
        m.expect::<(i32,), String>()
            .returning(|x: i32| x.to_string());
        m.expect::<(String,), i32>()
            .returning(|s: String| s.len() as i32);
        assert_eq!("5", m.call::<(i32,), String>((5,)));
        assert_eq!(3, m.call::<(String,), i32>(("abc".to_owned(),)));
        m.checkpoint();
    }

    #[test]
    fn generic_method_uninteresting_signature() {
        #[derive(Clone, Debug, Eq, PartialEq)]
        struct Tok(u8);
        crate::default_value::set(Tok(3));
        let m = GenericMockMethod::new("convert");
        m.expect::<(i32,), i32>().times_any().return_const(1);
        // A signature never mentioned falls back to the default value.
        assert_eq!(Tok(3), m.call::<(bool,), Tok>((true,)));
        m.checkpoint();
        crate::default_value::clear::<Tok>();
    }

    #[test]
    #[should_panic(expected = "unsatisfied expectation")]
    fn generic_checkpoint_catches_unsatisfied() {
        let m = GenericMockMethod::new("convert");
        m.expect::<(i32,), i32>().times(1).return_const(1);
        m.checkpoint();
    }
}
