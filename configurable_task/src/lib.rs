//! Fluent, deferred configuration of asynchronous work.
//!
//! An [`Awaiter`] holds an instance of some argument type `A`, an ordered
//! queue of asynchronous mutators, and a final factory turning the instance
//! into a [`Deferred`] result. Building one does no work: immediate mutators
//! run at once through [`Awaiter::apply`], asynchronous ones are queued with
//! [`Awaiter::defer`], and nothing else happens until the awaiter is
//! resolved.
//!
//! Resolution runs the queue strictly in insertion order, awaiting each step
//! before starting the next, then hands the instance to the factory. The
//! first error from a step or from the factory is returned unchanged; later
//! steps do not run and earlier mutations are not rolled back.
//!
//! ```
//! use configurable_task::Awaiter;
//! use futures::FutureExt;
//!
//! #[derive(Clone, Default)]
//! struct Request {
//!     path: String,
//!     retries: u8,
//! }
//!
//! let awaiter = Awaiter::<Request, String, ()>::new(|req| {
//!     async move { Ok(format!("{} x{}", req.path, req.retries)) }.boxed()
//! })
//! .apply(|req| req.path = "/index".to_owned())
//! .defer(|req| async move {
//!     req.retries += 3;
//!     Ok(())
//! }.boxed());
//!
//! let result = futures::executor::block_on(awaiter.into_future());
//! assert_eq!(result, Ok("/index x3".to_owned()));
//! ```
//!
//! Resolution is not memoized. [`Awaiter::resolve`] may be called repeatedly
//! and re-runs every queued step and the factory each time; awaiting the
//! awaiter directly consumes it.

use std::fmt;
use std::future::IntoFuture;

use futures::future::{BoxFuture, FutureExt};

/// A boxed, single-result asynchronous computation.
pub type Deferred<T, E> = BoxFuture<'static, Result<T, E>>;

type Factory<A, T, E> = Box<dyn FnMut(A) -> Deferred<T, E> + Send>;
type Step<A, E> = Box<dyn for<'a> FnMut(&'a mut A) -> BoxFuture<'a, Result<(), E>> + Send>;

/// A fluently configured, lazily resolved task.
#[must_use = "an awaiter does nothing until it is resolved"]
pub struct Awaiter<A, T, E> {
    instance: A,
    steps: Vec<Step<A, E>>,
    factory: Factory<A, T, E>,
}

impl<A, T, E> Awaiter<A, T, E> {
    /// Wraps a default-constructed instance.
    pub fn new<F>(factory: F) -> Self
    where
        A: Default,
        F: FnMut(A) -> Deferred<T, E> + Send + 'static,
    {
        Self::with_instance(A::default(), factory)
    }

    /// Wraps an existing instance.
    pub fn with_instance<F>(instance: A, factory: F) -> Self
    where
        F: FnMut(A) -> Deferred<T, E> + Send + 'static,
    {
        Self {
            instance,
            steps: Vec::new(),
            factory: Box::new(factory),
        }
    }

    /// Mutates the instance immediately.
    pub fn apply(mut self, mutate: impl FnOnce(&mut A)) -> Self {
        mutate(&mut self.instance);
        self
    }

    /// Queues an asynchronous mutation to run at resolution time.
    pub fn defer<F>(mut self, step: F) -> Self
    where
        F: for<'a> FnMut(&'a mut A) -> BoxFuture<'a, Result<(), E>> + Send + 'static,
    {
        self.steps.push(Box::new(step));
        self
    }

    /// The instance as configured so far.
    #[must_use]
    pub const fn instance(&self) -> &A {
        &self.instance
    }

    /// Number of queued asynchronous steps.
    #[must_use]
    pub const fn pending(&self) -> usize {
        self.steps.len()
    }

    /// Runs every queued step, then the factory on a copy of the instance.
    ///
    /// Each call starts from the instance as the previous call left it and
    /// re-runs the whole queue.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by a step or by the factory.
    pub async fn resolve(&mut self) -> Result<T, E>
    where
        A: Clone,
    {
        run_steps(&mut self.steps, &mut self.instance).await?;
        (self.factory)(self.instance.clone()).await
    }
}

async fn run_steps<A, E>(steps: &mut [Step<A, E>], instance: &mut A) -> Result<(), E> {
    let total = steps.len();
    for (index, step) in steps.iter_mut().enumerate() {
        tracing::trace!(step = index + 1, total, "running deferred step");
        step(instance).await?;
    }
    Ok(())
}

impl<A, T, E> IntoFuture for Awaiter<A, T, E>
where
    A: Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = Result<T, E>;
    type IntoFuture = Deferred<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        let Self {
            mut instance,
            mut steps,
            mut factory,
        } = self;
        async move {
            run_steps(&mut steps, &mut instance).await?;
            factory(instance).await
        }
        .boxed()
    }
}

impl<A, T, E> From<Deferred<T, E>> for Awaiter<A, T, E>
where
    A: Default,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Adapts a bare deferred result; the instance is ignored.
    fn from(deferred: Deferred<T, E>) -> Self {
        let shared = deferred.shared();
        Self::new(move |_| shared.clone().boxed())
    }
}

impl<A: fmt::Debug, T, E> fmt::Debug for Awaiter<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Awaiter")
            .field("instance", &self.instance)
            .field("pending", &self.steps.len())
            .finish_non_exhaustive()
    }
}
