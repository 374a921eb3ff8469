//! Fetch lifecycle shared by every view.
//!
//! A view starts `Loading`, becomes `Ready` when its first fetch completes,
//! and goes back to `Loading` on refresh. There is no error state: a failed
//! fetch leaves the previous snapshot in place and hands the error back to
//! the caller.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadState {
    Loading,
    Ready,
}

/// Immutable record snapshot owned by one view.
#[derive(Debug, Clone)]
pub struct ViewSnapshot<T> {
    records: Arc<[T]>,
    state: LoadState,
    generation: u64,
}

impl<T> ViewSnapshot<T> {
    pub fn new() -> Self {
        Self {
            records: Arc::from(Vec::new()),
            state: LoadState::Loading,
            generation: 0,
        }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Shared handle to the current snapshot.
    pub fn shared(&self) -> Arc<[T]> {
        Arc::clone(&self.records)
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// Number of successful replacements so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn begin_refresh(&mut self) {
        self.state = LoadState::Loading;
    }

    /// Finish a fetch. On success the snapshot is swapped wholesale; on
    /// failure the old snapshot stays and the error is returned.
    pub fn complete<E>(&mut self, result: Result<Vec<T>, E>) -> Result<usize, E> {
        self.state = LoadState::Ready;
        let records = result?;
        let len = records.len();
        self.records = Arc::from(records);
        self.generation += 1;
        Ok(len)
    }
}

impl<T> Default for ViewSnapshot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_starts_loading_and_empty() {
        let snapshot: ViewSnapshot<u32> = ViewSnapshot::new();
        assert_eq!(snapshot.state(), LoadState::Loading);
        assert!(snapshot.records().is_empty());
        assert_eq!(snapshot.generation(), 0);
    }

    #[test]
    fn test_success_replaces_records_and_becomes_ready() {
        let mut snapshot = ViewSnapshot::new();
        let loaded: Result<usize, ()> = snapshot.complete(Ok(vec![1, 2, 3]));
        assert_eq!(loaded, Ok(3));
        assert_eq!(snapshot.state(), LoadState::Ready);
        assert_eq!(snapshot.records(), &[1, 2, 3]);
        assert_eq!(snapshot.generation(), 1);
    }

    #[test]
    fn test_failure_keeps_stale_records() {
        let mut snapshot = ViewSnapshot::new();
        let _: Result<usize, &str> = snapshot.complete(Ok(vec![7]));
        snapshot.begin_refresh();
        assert!(snapshot.is_loading());

        let result = snapshot.complete(Err("fetch failed"));
        assert_eq!(result, Err("fetch failed"));
        assert_eq!(snapshot.state(), LoadState::Ready);
        assert_eq!(snapshot.records(), &[7]);
        assert_eq!(snapshot.generation(), 1);
    }

    #[test]
    fn test_refresh_with_identical_result_still_cycles() {
        let mut snapshot = ViewSnapshot::new();
        let _: Result<usize, ()> = snapshot.complete(Ok(vec![1]));
        snapshot.begin_refresh();
        assert_eq!(snapshot.state(), LoadState::Loading);
        let _: Result<usize, ()> = snapshot.complete(Ok(vec![1]));
        assert_eq!(snapshot.state(), LoadState::Ready);
        assert_eq!(snapshot.generation(), 2);
    }

    #[test]
    fn test_shared_handle_survives_replacement() {
        let mut snapshot = ViewSnapshot::new();
        let _: Result<usize, ()> = snapshot.complete(Ok(vec!["a"]));
        let held = snapshot.shared();
        let _: Result<usize, ()> = snapshot.complete(Ok(vec!["b", "c"]));
        assert_eq!(&*held, &["a"]);
        assert_eq!(snapshot.records(), &["b", "c"]);
    }
}
