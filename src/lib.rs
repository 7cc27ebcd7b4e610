// vim: tw=80
//! An expectation-matching and action-dispatch engine for mock objects.
//!
//! Mimicry provides the working parts of a mock object: composable
//! argument [matchers](matchers), programmable [actions](actions), call
//! count [cardinalities](Cardinality), and an expectation engine that
//! dispatches calls, enforces ordering, and reports failures in plain
//! English.  It does not generate mock structs for you; it is the engine
//! that hand-written or generated mocks are built on.
//!
//! The basic idea:
//! * Represent each mockable method as a [`MockMethod`], keyed by its
//!   packed argument tuple type and return type.
//! * In your test, set expectations on it.  Each expectation can have
//!   argument matchers, a required call count, a position in a
//!   [`Sequence`], and one or more actions to perform.
//! * Route the real method's calls to [`MockMethod::call`].  Matching
//!   calls perform the programmed actions; anything contrary to the
//!   expectations panics with a description of what went wrong.
//!
//! # User Guide
//!
//! * [`Getting started`](#getting-started)
//! * [`Matching arguments`](#matching-arguments)
//! * [`Call counts`](#call-counts)
//! * [`Actions`](#actions)
//! * [`Ordering calls`](#ordering-calls)
//! * [`Default behavior`](#default-behavior)
//! * [`Reference return values`](#reference-return-values)
//! * [`Generic methods`](#generic-methods)
//! * [`Checkpoints`](#checkpoints)
//! * [`Custom matchers`](#custom-matchers)
//! * [`Logging`](#logging)
//!
//! ## Getting started
//!
//! ```
//! use mimicry::{MockMethod, actions::return_const, matchers::{gt, str_eq}};
//!
//! let play = MockMethod::<(String, i32), bool>::new("play");
//! play.expect()
//!     .with_args((str_eq("intro.ogg"), gt(0)))
//!     .times(1)
//!     .will_once(return_const(true));
//!
//! assert!(play.call(("intro.ogg".to_owned(), 3)));
//! play.checkpoint();
//! ```
//!
//! Every expectation is verified when the method is checkpointed or
//! dropped, and an unsatisfied one panics with the location where it was
//! set.  Later expectations take precedence over earlier ones with
//! overlapping matchers, so write the general ones first and the
//! specific ones after.
//!
//! ## Matching arguments
//!
//! Matchers are first-class values that can be combined, reused, and
//! asked to describe themselves:
//!
//! ```
//! use mimicry::matchers::{all_of, contains, eq, gt, lt};
//!
//! let single_digit = all_of(vec![gt(0), lt(10)]);
//! assert!(single_digit.matches(&5));
//! assert!(!single_digit.matches(&12));
//! assert_eq!("(is > 0) and (is < 10)", single_digit.describe());
//!
//! let has_three = contains(eq(3));
//! assert!(has_three.matches(&vec![1, 2, 3]));
//! ```
//!
//! A failed match explains itself, which is what makes the panic
//! messages readable:
//!
//! ```
//! use mimicry::matchers::{elements_are, eq};
//!
//! let m = elements_are(vec![eq(1), eq(2)]);
//! let (ok, why) = m.explain(&vec![1, 3]);
//! assert!(!ok);
//! assert!(why.contains("element #1"));
//! ```
//!
//! The [`matchers`] module covers relations, strings and regexes,
//! floating point comparison, struct fields, and containers, including
//! order-insensitive container matching backed by maximum bipartite
//! matching rather than permutation search.
//!
//! ## Call counts
//!
//! With no other information an expectation must be called exactly once.
//! [`times`](Expectation::times) accepts a count, a range, or any
//! [`Cardinality`]; without it, the action clauses imply the count: `n`
//! [`will_once`](Expectation::will_once) clauses mean exactly `n` calls,
//! and a trailing [`will_repeatedly`](Expectation::will_repeatedly)
//! drops the upper bound.
//!
//! ```
//! use mimicry::{MockMethod, actions::return_const};
//!
//! let poll = MockMethod::<(), u32>::new("poll");
//! poll.expect()
//!     .times(2..=3)
//!     .will_repeatedly(return_const(7));
//!
//! assert_eq!(7, poll.call(()));
//! assert_eq!(7, poll.call(()));
//! poll.checkpoint();
//! ```
//!
//! A call that exceeds its expectation's count panics right away:
//!
//! ```should_panic
//! use mimicry::MockMethod;
//!
//! let log = MockMethod::<(i32,), ()>::new("log");
//! log.expect().never();
//! log.call((1,));
//! ```
//!
//! ## Actions
//!
//! Actions say what a matching call does.  [`return_const`] covers the
//! common case; [`invoke`] computes the return value from the
//! arguments; [`by_move`] returns a value that isn't `Clone`, once.
//! The [`actions`] module also has composites ([`do_all`],
//! [`with_arg`]), out-parameter writers ([`set_arg`]), and
//! single-threaded `_st` variants for non-`Send` types.
//!
//! ```
//! use mimicry::{MockMethod, actions::{by_move, invoke}};
//!
//! let add = MockMethod::<(i32, i32), i32>::new("add");
//! add.expect().will_repeatedly(invoke(|a: i32, b: i32| a + b));
//! assert_eq!(7, add.call((3, 4)));
//!
//! let take = MockMethod::<(), String>::new("take");
//! take.expect().will_once(by_move("not clonable".to_owned()));
//! assert_eq!("not clonable", take.call(()));
//! ```
//!
//! [`return_const`]: actions::return_const
//! [`invoke`]: actions::invoke
//! [`by_move`]: actions::by_move
//! [`do_all`]: actions::do_all
//! [`with_arg`]: actions::with_arg
//! [`set_arg`]: actions::set_arg
//!
//! ## Ordering calls
//!
//! A [`Sequence`] requires its member expectations to be satisfied in
//! order, even across different methods.  One expectation may join
//! several sequences, which composes the orderings into a partial
//! order.  For a single edge, [`after`](Expectation::after) names a
//! prerequisite directly:
//!
//! ```
//! use mimicry::{MockMethod, actions::return_const};
//!
//! let open = MockMethod::<(), bool>::new("open");
//! let close = MockMethod::<(), ()>::new("close");
//!
//! let opened = open.expect();
//! opened.will_once(return_const(true));
//! close.expect().after(&opened).will_once(return_const(()));
//!
//! assert!(open.call(()));
//! close.call(());
//! ```
//!
//! An expectation whose count has an upper bound retires once it
//! reaches it if tagged with
//! [`retires_on_saturation`](Expectation::retires_on_saturation),
//! stepping aside so an earlier, more general expectation can pick up
//! later calls.
//!
//! ## Default behavior
//!
//! A call that matches no expectation's action still needs a return
//! value.  [`MockMethod::on_call`] installs a default handler, and the
//! [`default_value`] registry supplies per-type fallbacks for methods
//! with no handler at all:
//!
//! ```
//! use mimicry::{MockMethod, actions::return_const, default_value,
//!     matchers::{eq, fields_are}};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Token(u32);
//!
//! default_value::set(Token(0));
//!
//! let issue = MockMethod::<(i32,), Token>::new("issue");
//! issue.on_call()
//!     .with(fields_are((eq(1),)))
//!     .will_by_default(return_const(Token(10)));
//!
//! assert_eq!(Token(10), issue.call((1,)));
//! assert_eq!(Token(0), issue.call((2,)));
//! default_value::clear::<Token>();
//! ```
//!
//! With the `nightly` feature, any `Default` return type works without
//! registration.
//!
//! ## Reference return values
//!
//! Methods that return `&T` or `&mut T` borrowed from the object can't
//! hand their result out by value.  [`RefMockMethod`] and
//! [`RefMutMockMethod`] store the value to lend instead:
//!
//! ```
//! use mimicry::{RefMockMethod, RefMutMockMethod};
//!
//! let mut name = RefMockMethod::<(), String>::new("name");
//! name.expect().return_const("mimic".to_owned());
//! assert_eq!("mimic", name.call(()));
//!
//! let mut buf = RefMutMockMethod::<(), Vec<u8>>::new("buf");
//! buf.expect().return_var(Vec::new());
//! buf.call_mut(()).push(1);
//! buf.call_mut(()).push(2);
//! assert_eq!(2, buf.call_mut(()).len());
//! ```
//!
//! ## Generic methods
//!
//! A [`GenericMockMethod`] keys independent [`MockMethod`]s by concrete
//! signature, so each monomorphization of a generic method gets its own
//! expectations:
//!
//! ```
//! use mimicry::{GenericMockMethod, actions::return_const};
//!
//! let render = GenericMockMethod::new("render");
//! render.expect::<(i32,), String>()
//!     .will_once(return_const("5".to_owned()));
//! render.expect::<(bool,), String>()
//!     .will_once(return_const("true".to_owned()));
//!
//! assert_eq!("5", render.call::<(i32,), String>((5,)));
//! assert_eq!("true", render.call::<(bool,), String>((true,)));
//! render.checkpoint();
//! ```
//!
//! ## Checkpoints
//!
//! [`MockMethod::checkpoint`] verifies all expectations immediately and
//! forgets them, so a long test can assert phase by phase.  Default
//! handlers survive a checkpoint; expectations don't.
//!
//! ## Custom matchers
//!
//! Most one-off matchers are a closure away:
//!
//! ```
//! use mimicry::matchers::matching;
//!
//! let even = matching("is even", |x: &i32| x % 2 == 0);
//! assert!(even.matches(&4));
//! assert_eq!("is even", even.describe());
//! ```
//!
//! [`matchers::satisfies`] wraps any [`Predicate`] from the
//! [`predicates`] crate, and implementing
//! [`matchers::MatcherImpl`] directly buys full control over the
//! descriptions and failure explanations.
//!
//! ## Logging
//!
//! Dispatch emits [`tracing`] events: a warning for each uninteresting
//! call and, at [`Verbosity::Info`], an event for every expected one.
//! [`set_verbosity`] adjusts which events are emitted; install any
//! `tracing` subscriber to see them.

#![cfg_attr(feature = "nightly", feature(specialization))]

pub mod actions;
pub mod cardinality;
pub mod default_value;
mod expectation;
pub mod matchers;
mod mock;
mod ref_method;
mod report;
mod sequence;

pub use crate::cardinality::Cardinality;
pub use crate::expectation::Expectation;
pub use crate::mock::{GenericMockMethod, MockMethod, OnCall};
pub use crate::ref_method::{
    RefExpectation, RefMockMethod, RefMutExpectation, RefMutMockMethod,
};
pub use crate::report::{set_verbosity, UsageError, Verbosity};
pub use crate::sequence::Sequence;

#[doc(hidden)]
pub use crate::mock::AnyMockMethod;

pub use predicates::prelude::{predicate, Predicate};
