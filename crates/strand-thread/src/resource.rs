//! Per-thread resource tracking (§4.9): anything a thread acquires but
//! hasn't released yet (a SQL statement, a file lock, a queue lock) gets
//! registered here so thread exit can walk the list and force a release
//! instead of leaking.

use parking_lot::Mutex;

/// A trackable acquired resource. `release` is called exactly once, from
/// whichever thread tears the tracker down.
pub trait Releasable: Send {
    fn release(&mut self) -> Result<(), String>;

    /// Used to build the `<KIND>-ERROR` code if `release` fails (§4.9).
    fn resource_kind(&self) -> &'static str;
}

#[derive(Default)]
pub struct ResourceTracker {
    pending: Mutex<Vec<Box<dyn Releasable>>>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        ResourceTracker::default()
    }

    pub fn register(&self, resource: Box<dyn Releasable>) {
        self.pending.lock().push(resource);
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Releases every tracked resource, in registration order, returning
    /// one `<KIND>-ERROR` message per resource whose release failed. Called
    /// on thread exit (§4.9: "the runtime walks the tracker, raising
    /// `<RESOURCE>-ERROR` for each and calling its cleanup").
    pub fn purge(&self) -> Vec<String> {
        let mut pending = self.pending.lock();
        let mut errors = Vec::new();
        for mut resource in pending.drain(..) {
            let kind = resource.resource_kind();
            if let Err(e) = resource.release() {
                errors.push(format!("{}-ERROR: {}", kind.to_uppercase(), e));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlakyLock {
        should_fail: bool,
    }

    impl Releasable for FlakyLock {
        fn release(&mut self) -> Result<(), String> {
            if self.should_fail {
                Err("lock already gone".to_string())
            } else {
                Ok(())
            }
        }

        fn resource_kind(&self) -> &'static str {
            "lock"
        }
    }

    #[test]
    fn purge_releases_everything_and_reports_only_failures() {
        let tracker = ResourceTracker::new();
        tracker.register(Box::new(FlakyLock { should_fail: false }));
        tracker.register(Box::new(FlakyLock { should_fail: true }));
        let errors = tracker.purge();
        assert_eq!(errors, vec!["LOCK-ERROR: lock already gone".to_string()]);
        assert!(tracker.is_empty());
    }

    #[test]
    fn empty_tracker_purges_cleanly() {
        let tracker = ResourceTracker::new();
        assert!(tracker.purge().is_empty());
    }
}
