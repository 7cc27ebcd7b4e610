// vim: tw=80
//! Ordering of expectations across mock methods.

use std::sync::{Arc, Weak};

use crate::expectation::ExpectationCore;

/// Used to enforce that expectations are matched in the order specified.
///
/// Each expectation added to a sequence takes the previous one as a
/// prerequisite: it only becomes eligible once its predecessor has seen
/// its minimum call count.  One expectation may join several sequences,
/// which composes the orderings into a partial order.
///
/// # Examples
/// ```
/// use mimicry::{actions::return_const, MockMethod, Sequence};
///
/// let mut seq = Sequence::new();
/// let opened = MockMethod::<(String,), bool>::new("open");
/// let read = MockMethod::<(), Vec<u8>>::new("read");
///
/// opened.expect()
///     .in_sequence(&mut seq)
///     .will_once(return_const(true));
/// read.expect()
///     .in_sequence(&mut seq)
///     .will_once(return_const(b"data".to_vec()));
///
/// assert!(opened.call(("x".to_owned(),)));
/// assert_eq!(b"data".to_vec(), read.call(()));
/// # opened.checkpoint();
/// # read.checkpoint();
/// ```
#[derive(Default)]
pub struct Sequence {
    last: Option<Weak<ExpectationCore>>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `core` to the sequence, chaining it after the previous
    /// member.
    pub(crate) fn add(&mut self, core: &Arc<ExpectationCore>) {
        if let Some(prev) = self.last.take() {
            core.add_prerequisite(prev);
        }
        self.last = Some(Arc::downgrade(core));
    }
}
