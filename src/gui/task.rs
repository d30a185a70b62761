use std::{fmt, future::Future, time::Duration};

use futures::{FutureExt, future::LocalBoxFuture};

/// Work an `update` hands back to the runtime.
///
/// Ready messages are fed back within the same dispatch turn; futures run
/// on the UI loop and their output is dispatched when they resolve.
pub struct Task<M> {
    ready: Vec<M>,
    futures: Vec<LocalBoxFuture<'static, M>>,
}

impl<M> fmt::Debug for Task<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("ready", &self.ready.len())
            .field("futures", &self.futures.len())
            .finish()
    }
}

impl<M: 'static> Task<M> {
    pub fn none() -> Self {
        Self {
            ready: Vec::new(),
            futures: Vec::new(),
        }
    }

    pub fn done(message: M) -> Self {
        Self {
            ready: vec![message],
            futures: Vec::new(),
        }
    }

    pub fn perform<T: 'static>(
        future: impl Future<Output = T> + 'static,
        f: impl FnOnce(T) -> M + 'static,
    ) -> Self {
        Self {
            ready: Vec::new(),
            futures: vec![future.map(f).boxed_local()],
        }
    }

    /// Deliver `message` once `delay` has elapsed.
    pub fn after(delay: Duration, message: M) -> Self {
        Self::perform(tokio::time::sleep(delay), move |()| message)
    }

    pub fn batch(tasks: impl IntoIterator<Item = Task<M>>) -> Self {
        let mut batch = Self::none();
        for task in tasks {
            batch.ready.extend(task.ready);
            batch.futures.extend(task.futures);
        }
        batch
    }

    pub fn map<N: 'static>(self, f: impl Fn(M) -> N + Clone + 'static) -> Task<N> {
        Task {
            ready: self.ready.into_iter().map(f.clone()).collect(),
            futures: self
                .futures
                .into_iter()
                .map(|future| future.map(f.clone()).boxed_local())
                .collect(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.ready.is_empty() && self.futures.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.futures.len()
    }

    pub fn into_parts(self) -> (Vec<M>, Vec<LocalBoxFuture<'static, M>>) {
        (self.ready, self.futures)
    }
}
