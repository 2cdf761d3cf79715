//! Pre/post merge dispatch.
//!
//! Every consensus component whose behavior changes at the merge (block
//! validation, block production, fork choice) holds one behavior object per
//! side and routes calls through a [`TransitionDispatcher`], so the whole node
//! applies one transition rule.
//!
//! ```ignore
//! use merge_consensus::{MergeContext, TransitionDispatcher};
//! use std::sync::Arc;
//!
//! let context = Arc::new(MergeContext::new(ttd));
//! let validators = TransitionDispatcher::new(
//!     Arc::new(EthashValidator::default()),
//!     Arc::new(BeaconValidator::default()),
//!     context.clone(),
//! );
//!
//! validators.dispatch_query(|validator| validator.validate(&header))?;
//! ```

use crate::context::{MergeState, Phase};
use crate::error::{ConsensusError, Result};
use std::fmt;
use std::sync::Arc;

/// Routes calls to the pre-merge or post-merge behavior object.
///
/// The phase flag is read once per dispatch; the selected object is used for
/// the whole call even if the flag flips meanwhile.
pub struct TransitionDispatcher<T: ?Sized> {
    pre_merge: Arc<T>,
    post_merge: Arc<T>,
    merge_state: Arc<dyn MergeState>,
}

impl<T: ?Sized> TransitionDispatcher<T> {
    /// Creates a dispatcher over the two behavior objects.
    ///
    /// The same object may be passed for both sides.
    pub fn new(pre_merge: Arc<T>, post_merge: Arc<T>, merge_state: Arc<dyn MergeState>) -> Self {
        Self {
            pre_merge,
            post_merge,
            merge_state,
        }
    }

    /// Creates a dispatcher from optional behavior objects, failing if either
    /// is absent.
    pub fn try_new(
        pre_merge: Option<Arc<T>>,
        post_merge: Option<Arc<T>>,
        merge_state: Arc<dyn MergeState>,
    ) -> Result<Self> {
        let pre_merge = pre_merge.ok_or(ConsensusError::MisconfiguredDispatcher {
            missing: Phase::PreMerge,
        })?;
        let post_merge = post_merge.ok_or(ConsensusError::MisconfiguredDispatcher {
            missing: Phase::PostMerge,
        })?;

        Ok(Self::new(pre_merge, post_merge, merge_state))
    }

    /// Returns the phase the next dispatch would use.
    pub fn active_phase(&self) -> Phase {
        self.merge_state.phase()
    }

    /// Runs `action` on the active behavior object.
    pub fn dispatch_action<F>(&self, action: F)
    where
        F: FnOnce(&T),
    {
        action(self.active());
    }

    /// Runs `query` on the active behavior object and returns its result.
    pub fn dispatch_query<R, F>(&self, query: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        query(self.active())
    }

    /// Returns the pre-merge object regardless of phase.
    ///
    /// Used by callers that must address the proof-of-work rules, e.g. when
    /// validating historical blocks.
    pub fn pre_merge_object(&self) -> &Arc<T> {
        &self.pre_merge
    }

    /// Returns the post-merge object regardless of phase.
    pub fn post_merge_object(&self) -> &Arc<T> {
        &self.post_merge
    }

    /// Returns the merge state this dispatcher reads.
    pub fn merge_state(&self) -> &Arc<dyn MergeState> {
        &self.merge_state
    }

    fn active(&self) -> &T {
        match self.merge_state.phase() {
            Phase::PreMerge => &*self.pre_merge,
            Phase::PostMerge => &*self.post_merge,
        }
    }
}

impl<T: ?Sized> Clone for TransitionDispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            pre_merge: self.pre_merge.clone(),
            post_merge: self.post_merge.clone(),
            merge_state: self.merge_state.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for TransitionDispatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionDispatcher")
            .field("active_phase", &self.active_phase())
            .field(
                "shared_object",
                &Arc::ptr_eq(&self.pre_merge, &self.post_merge),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MergeContext;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        name: &'static str,
        calls: AtomicUsize,
    }

    impl Counter {
        fn named(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                calls: AtomicUsize::new(0),
            })
        }

        fn hit(&self) -> &'static str {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.name
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn setup() -> (Arc<MergeContext>, TransitionDispatcher<Counter>) {
        let context = Arc::new(MergeContext::new(100u64));
        let dispatcher =
            TransitionDispatcher::new(Counter::named("pow"), Counter::named("pos"), context.clone());
        (context, dispatcher)
    }

    #[test]
    fn test_routes_to_pre_merge_before_flip() {
        let (_context, dispatcher) = setup();

        for _ in 0..3 {
            assert_eq!(dispatcher.dispatch_query(Counter::hit), "pow");
        }
        dispatcher.dispatch_action(|counter| {
            counter.hit();
        });

        assert_eq!(dispatcher.pre_merge_object().calls(), 4);
        assert_eq!(dispatcher.post_merge_object().calls(), 0);
        assert_eq!(dispatcher.active_phase(), Phase::PreMerge);
    }

    #[test]
    fn test_routes_to_post_merge_after_flip() {
        let (context, dispatcher) = setup();
        assert_eq!(dispatcher.dispatch_query(Counter::hit), "pow");

        context.set_post_merge();

        assert_eq!(dispatcher.dispatch_query(Counter::hit), "pos");
        dispatcher.dispatch_action(|counter| {
            counter.hit();
        });
        assert_eq!(dispatcher.pre_merge_object().calls(), 1);
        assert_eq!(dispatcher.post_merge_object().calls(), 2);
        assert_eq!(dispatcher.active_phase(), Phase::PostMerge);
    }

    #[test]
    fn test_resumed_node_starts_post_merge() {
        let context = Arc::new(MergeContext::resumed_post_merge(100u64));
        let dispatcher =
            TransitionDispatcher::new(Counter::named("pow"), Counter::named("pos"), context);
        assert_eq!(dispatcher.dispatch_query(Counter::hit), "pos");
    }

    #[test]
    fn test_accessors_ignore_phase() {
        let (context, dispatcher) = setup();
        let pre = dispatcher.pre_merge_object().clone();
        let post = dispatcher.post_merge_object().clone();

        context.set_post_merge();

        assert!(Arc::ptr_eq(dispatcher.pre_merge_object(), &pre));
        assert!(Arc::ptr_eq(dispatcher.post_merge_object(), &post));
        assert_eq!(pre.calls(), 0);
        assert_eq!(post.calls(), 0);
    }

    #[test]
    fn test_shared_object_is_invoked_once_per_dispatch() {
        let context = Arc::new(MergeContext::new(100u64));
        let shared = Counter::named("both");
        let dispatcher = TransitionDispatcher::new(shared.clone(), shared.clone(), context.clone());

        dispatcher.dispatch_query(Counter::hit);
        assert_eq!(shared.calls(), 1);

        context.set_post_merge();
        dispatcher.dispatch_query(Counter::hit);
        dispatcher.dispatch_action(|counter| {
            counter.hit();
        });
        assert_eq!(shared.calls(), 3);
    }

    #[test]
    fn test_selection_fixed_for_the_call() {
        let (context, dispatcher) = setup();

        let name = dispatcher.dispatch_query(|counter| {
            context.set_post_merge();
            counter.hit()
        });

        assert_eq!(name, "pow");
        assert_eq!(dispatcher.dispatch_query(Counter::hit), "pos");
    }

    #[test]
    fn test_try_new_rejects_missing_objects() {
        let context: Arc<dyn MergeState> = Arc::new(MergeContext::new(100u64));

        let missing_pre =
            TransitionDispatcher::try_new(None, Some(Counter::named("pos")), context.clone());
        assert!(matches!(
            missing_pre,
            Err(ConsensusError::MisconfiguredDispatcher {
                missing: Phase::PreMerge
            })
        ));

        let missing_post =
            TransitionDispatcher::try_new(Some(Counter::named("pow")), None, context.clone());
        assert!(matches!(
            missing_post,
            Err(ConsensusError::MisconfiguredDispatcher {
                missing: Phase::PostMerge
            })
        ));

        let ok = TransitionDispatcher::try_new(
            Some(Counter::named("pow")),
            Some(Counter::named("pos")),
            context,
        )
        .unwrap();
        assert_eq!(ok.dispatch_query(Counter::hit), "pow");
    }

    #[test]
    fn test_trait_object_behaviors() {
        trait Rule: Send + Sync {
            fn name(&self) -> &'static str;
        }
        struct Ethash;
        struct Beacon;
        impl Rule for Ethash {
            fn name(&self) -> &'static str {
                "ethash"
            }
        }
        impl Rule for Beacon {
            fn name(&self) -> &'static str {
                "beacon"
            }
        }

        let context = Arc::new(MergeContext::new(100u64));
        let pre: Arc<dyn Rule> = Arc::new(Ethash);
        let post: Arc<dyn Rule> = Arc::new(Beacon);
        let dispatcher = TransitionDispatcher::new(pre, post, context.clone());

        assert_eq!(dispatcher.dispatch_query(|rule| rule.name()), "ethash");
        context.set_post_merge();
        assert_eq!(dispatcher.dispatch_query(|rule| rule.name()), "beacon");
    }
}
