// vim: tw=80
//! Expectations: how many calls a mock method should see, with which
//! arguments, in what order, and what to do for each.

use std::fmt::Write as _;
use std::panic::Location;
use std::sync::{Arc, Mutex, Weak};

use crate::actions::{
    self, invoke_mut, invoke_mut_st, invoke_once, invoke_once_st, Action,
    CallMutWith, CallOnceWith,
};
use crate::cardinality::{
    any_number, at_least, describe_call_count, exactly, Cardinality,
};
use crate::matchers::{anything, fields_are, matching, Matcher, MatcherTuple};
use crate::report::{usage_error, UsageError};
use crate::sequence::Sequence;

/// Builder clauses in their grammatical order.  Each clause may only
/// follow clauses of equal or lower rank, with the per-clause exceptions
/// checked in the `clause_*` methods.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
enum Clause {
    None,
    With,
    Times,
    InSequence,
    WillOnce,
    WillRepeatedly,
    RetiresOnSaturation,
}

struct CoreState {
    cardinality: Cardinality,
    /// Whether the cardinality came from an explicit clause, as opposed
    /// to being inferred from the action clauses.
    explicit_cardinality: bool,
    once_actions: usize,
    has_repeated_action: bool,
    call_count: usize,
    retired: bool,
    retires_on_saturation: bool,
    prerequisites: Vec<Weak<ExpectationCore>>,
    last_clause: Clause,
}

/// The untyped half of an expectation: call counting, ordering, and the
/// builder grammar.  Shared with [`Sequence`]s through `Weak` handles.
pub(crate) struct ExpectationCore {
    method: String,
    location: &'static Location<'static>,
    state: Mutex<CoreState>,
}

impl ExpectationCore {
    pub(crate) fn new(method: &str, location: &'static Location<'static>)
        -> Arc<Self>
    {
        Arc::new(ExpectationCore {
            method: method.to_owned(),
            location,
            state: Mutex::new(CoreState {
                // Inferred until a clause says otherwise; the action
                // clauses re-infer it as they are added.
                cardinality: exactly(1),
                explicit_cardinality: false,
                once_actions: 0,
                has_repeated_action: false,
                call_count: 0,
                retired: false,
                retires_on_saturation: false,
                prerequisites: Vec::new(),
                last_clause: Clause::None,
            }),
        })
    }

    pub(crate) fn method(&self) -> &str {
        &self.method
    }

    pub(crate) fn location(&self) -> &'static Location<'static> {
        self.location
    }

    pub(crate) fn cardinality(&self) -> Cardinality {
        self.state.lock().unwrap().cardinality.clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.state.lock().unwrap().call_count
    }

    pub(crate) fn is_satisfied(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.cardinality.is_satisfied_by(state.call_count)
    }

    pub(crate) fn is_saturated(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.cardinality.is_saturated_by(state.call_count)
    }

    pub(crate) fn is_retired(&self) -> bool {
        self.state.lock().unwrap().retired
    }

    pub(crate) fn retire(&self) {
        self.state.lock().unwrap().retired = true;
    }

    pub(crate) fn add_prerequisite(&self, prereq: Weak<ExpectationCore>) {
        self.state.lock().unwrap().prerequisites.push(prereq);
    }

    fn live_prerequisites(&self) -> Vec<Arc<ExpectationCore>> {
        self.state.lock().unwrap().prerequisites.iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    /// Whether every prerequisite, transitively, has seen its minimum
    /// call count.  Prerequisite graphs are acyclic by construction, so
    /// the recursion terminates and never relocks a held mutex.
    pub(crate) fn all_prerequisites_satisfied(&self) -> bool {
        self.live_prerequisites().iter().all(|p| {
            p.is_satisfied() && p.all_prerequisites_satisfied()
        })
    }

    /// Retires every prerequisite, transitively.  Called when this
    /// expectation handles a call, at which point earlier expectations
    /// must not swallow later matching calls.
    pub(crate) fn retire_prerequisites(&self) {
        for p in self.live_prerequisites() {
            p.retire();
            p.retire_prerequisites();
        }
    }

    /// Records a dispatched call.
    pub(crate) fn record_call(&self) {
        let mut state = self.state.lock().unwrap();
        state.call_count += 1;
        if state.retires_on_saturation
            && state.cardinality.is_saturated_by(state.call_count)
        {
            state.retired = true;
        }
    }

    /// One line for failure messages: where the expectation was set and
    /// how it has fared so far.
    pub(crate) fn describe_state(&self) -> String {
        let state = self.state.lock().unwrap();
        let status = if state.retired {
            "retired"
        } else if state.cardinality.is_saturated_by(state.call_count) {
            "saturated and active"
        } else if state.cardinality.is_satisfied_by(state.call_count) {
            "satisfied and active"
        } else {
            "unsatisfied and active"
        };
        format!("expected to be {}, was {} - {}",
            state.cardinality.describe(),
            describe_call_count(state.call_count),
            status)
    }

    /// Panics if the expectation never reached its minimum call count.
    pub(crate) fn verify(&self) {
        let state = self.state.lock().unwrap();
        if !state.cardinality.is_satisfied_by(state.call_count) {
            let mut msg = String::new();
            let _ = write!(msg,
                "unsatisfied expectation on {} set at {}: expected to be \
                 {}, was {}",
                self.method, self.location,
                state.cardinality.describe(),
                describe_call_count(state.call_count));
            drop(state);
            panic!("{}", msg);
        }
    }

    fn clause(&self, clause: Clause)
        -> std::sync::MutexGuard<'_, CoreState>
    {
        let mut state = self.state.lock().unwrap();
        if state.last_clause == Clause::RetiresOnSaturation {
            usage_error(UsageError::RetiresNotLast);
        }
        match clause {
            Clause::With => {
                if state.last_clause == Clause::With {
                    usage_error(UsageError::DuplicateWith);
                } else if state.last_clause != Clause::None {
                    usage_error(UsageError::WithNotFirst);
                }
            },
            Clause::Times => {
                if state.last_clause > Clause::Times {
                    usage_error(UsageError::TimesTooLate);
                } else if state.explicit_cardinality {
                    usage_error(UsageError::DuplicateTimes);
                }
            },
            Clause::InSequence => {
                if state.last_clause > Clause::InSequence {
                    usage_error(UsageError::SequenceTooLate);
                }
            },
            Clause::WillOnce => {
                if state.last_clause > Clause::WillOnce {
                    usage_error(UsageError::WillOnceAfterRepeatedly);
                }
            },
            Clause::WillRepeatedly => {
                if state.has_repeated_action {
                    usage_error(UsageError::DuplicateWillRepeatedly);
                }
            },
            Clause::None | Clause::RetiresOnSaturation => {},
        }
        state.last_clause = state.last_clause.max(clause);
        state
    }

    pub(crate) fn clause_with(&self) {
        self.clause(Clause::With);
    }

    pub(crate) fn clause_times(&self, cardinality: Cardinality) {
        let mut state = self.clause(Clause::Times);
        state.cardinality = cardinality;
        state.explicit_cardinality = true;
    }

    pub(crate) fn clause_in_sequence(&self) {
        self.clause(Clause::InSequence);
    }

    pub(crate) fn clause_will_once(&self) {
        let mut state = self.clause(Clause::WillOnce);
        state.once_actions += 1;
        if !state.explicit_cardinality {
            state.cardinality = exactly(state.once_actions);
        }
    }

    pub(crate) fn clause_will_repeatedly(&self) {
        let mut state = self.clause(Clause::WillRepeatedly);
        state.has_repeated_action = true;
        if !state.explicit_cardinality {
            state.cardinality = if state.once_actions == 0 {
                any_number()
            } else {
                at_least(state.once_actions)
            };
        }
    }

    pub(crate) fn clause_retires_on_saturation(&self) {
        let mut state = self.clause(Clause::RetiresOnSaturation);
        state.retires_on_saturation = true;
    }
}

struct ExpState<I, O> {
    matcher: Matcher<I>,
    once_actions: Vec<Action<I, O>>,
    next_once: usize,
    repeated_action: Option<Action<I, O>>,
}

/// One expectation on a mock method: an argument matcher, a call count,
/// ordering constraints, and the actions to perform.
///
/// Handles are cheap to clone and share state, so the one returned by
/// `expect` may be kept around to `after` it from another expectation.
pub struct Expectation<I, O> {
    core: Arc<ExpectationCore>,
    state: Arc<Mutex<ExpState<I, O>>>,
}

impl<I, O> Clone for Expectation<I, O> {
    fn clone(&self) -> Self {
        Expectation {
            core: self.core.clone(),
            state: self.state.clone(),
        }
    }
}

impl<I: 'static, O> Expectation<I, O> {
    pub(crate) fn new(
        method: &str,
        location: &'static Location<'static>,
    ) -> Self {
        Expectation {
            core: ExpectationCore::new(method, location),
            state: Arc::new(Mutex::new(ExpState {
                matcher: anything(),
                once_actions: Vec::new(),
                next_once: 0,
                repeated_action: None,
            })),
        }
    }

    pub(crate) fn core(&self) -> &Arc<ExpectationCore> {
        &self.core
    }

    /// Restrict the expectation to calls whose packed arguments match.
    /// Must be the first clause, if present.
    pub fn with(&self, matcher: Matcher<I>) -> &Self {
        self.core.clause_with();
        self.state.lock().unwrap().matcher = matcher;
        self
    }

    /// Like [`with`](Self::with), taking one matcher per argument.
    pub fn with_args<M>(&self, matchers: M) -> &Self
    where
        M: MatcherTuple<I> + 'static,
    {
        self.with(fields_are(matchers))
    }

    /// Like [`with`](Self::with), taking a plain predicate over the
    /// packed arguments.
    pub fn withf<F>(&self, f: F) -> &Self
    where
        F: Fn(&I) -> bool + Send + Sync + 'static,
    {
        self.with(matching("matches the given predicate", f))
    }

    /// Require the call count to satisfy `cardinality`: a plain count, a
    /// range, or any [`Cardinality`].
    pub fn times(&self, cardinality: impl Into<Cardinality>) -> &Self {
        self.core.clause_times(cardinality.into());
        self
    }

    /// Allow any number of calls.
    pub fn times_any(&self) -> &Self {
        self.times(any_number())
    }

    /// Require exactly one call.
    pub fn once(&self) -> &Self {
        self.times(1)
    }

    /// Forbid any calls.
    pub fn never(&self) -> &Self {
        self.times(crate::cardinality::never())
    }

    /// Add this expectation to the end of `seq`: it only becomes
    /// eligible once the previous expectation in the sequence has seen
    /// its minimum call count.
    pub fn in_sequence(&self, seq: &mut Sequence) -> &Self {
        self.core.clause_in_sequence();
        seq.add(&self.core);
        self
    }

    /// Require `prereq` to be satisfied before this expectation may
    /// match.  The prerequisite may belong to a different method.
    pub fn after<I2, O2>(&self, prereq: &Expectation<I2, O2>) -> &Self {
        self.core.clause_in_sequence();
        self.core.add_prerequisite(Arc::downgrade(&prereq.core));
        self
    }

    /// Perform `action` for one matching call.  Repeated clauses queue
    /// up in order, each consumed by one call.
    pub fn will_once(&self, action: Action<I, O>) -> &Self {
        self.core.clause_will_once();
        self.state.lock().unwrap().once_actions.push(action);
        self
    }

    /// Perform `action` for every matching call after the `will_once`
    /// queue is exhausted.
    pub fn will_repeatedly(&self, action: Action<I, O>) -> &Self {
        self.core.clause_will_repeatedly();
        self.state.lock().unwrap().repeated_action = Some(action);
        self
    }

    /// Retire this expectation as soon as it is saturated, so that an
    /// earlier, more general expectation can pick up later calls.
    pub fn retires_on_saturation(&self) -> &Self {
        self.core.clause_retires_on_saturation();
        self
    }

    pub(crate) fn matches(&self, args: &I) -> bool {
        self.state.lock().unwrap().matcher.matches(args)
    }

    pub(crate) fn describe_matcher(&self) -> String {
        self.state.lock().unwrap().matcher.describe()
    }

    pub(crate) fn explain_mismatch(&self, args: &I) -> String {
        let (_, why) = self.state.lock().unwrap().matcher.explain(args);
        why
    }

    /// The next action for a dispatched call, if any was configured.
    /// Consumes one `will_once` before falling back to the repeated
    /// action.
    pub(crate) fn next_action(&self) -> Option<Action<I, O>> {
        let mut state = self.state.lock().unwrap();
        if state.next_once < state.once_actions.len() {
            let action = state.once_actions[state.next_once].clone();
            state.next_once += 1;
            Some(action)
        } else {
            state.repeated_action.clone()
        }
    }
}

impl<I: 'static, O: 'static> Expectation<I, O> {
    /// Shorthand for `will_repeatedly` with an `FnMut` over the unpacked
    /// arguments.
    pub fn returning<F>(&self, f: F) -> &Self
    where
        F: CallMutWith<I, Output = O> + Send + 'static,
    {
        self.will_repeatedly(invoke_mut(f))
    }

    /// Single threaded version of [`returning`](Self::returning), for
    /// closures that aren't `Send`.
    pub fn returning_st<F>(&self, f: F) -> &Self
    where
        F: CallMutWith<I, Output = O> + 'static,
    {
        self.will_repeatedly(invoke_mut_st(f))
    }

    /// Shorthand for `will_once` with an `FnOnce` over the unpacked
    /// arguments.  Useful for returning move-only values.
    pub fn return_once<F>(&self, f: F) -> &Self
    where
        F: CallOnceWith<I, Output = O> + Send + 'static,
    {
        self.will_once(invoke_once(f))
    }

    /// Single threaded version of [`return_once`](Self::return_once).
    pub fn return_once_st<F>(&self, f: F) -> &Self
    where
        F: CallOnceWith<I, Output = O> + 'static,
    {
        self.will_once(invoke_once_st(f))
    }

    /// Shorthand for `will_repeatedly` returning a clone of `value` on
    /// every call.
    pub fn return_const(&self, value: O) -> &Self
    where
        O: Clone + Send + Sync,
    {
        self.will_repeatedly(actions::return_const(value))
    }
}
