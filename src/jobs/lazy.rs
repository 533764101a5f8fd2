//! Actors that wait for their broker.
//!
//! An actor declared at module load would otherwise need a broker before
//! broker configuration has happened. A [`LazyActor`] only records what it
//! will become; [`LazyActor::init_actor`] binds it once the broker exists.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::jobs::actor::{Actor, ActorFn, ActorSpec};
use crate::jobs::broker::Broker;
use crate::jobs::message::Message;
use crate::jobs::JobError;

/// Where a [`LazyActor`] is in its life.
#[derive(Debug, Clone, Copy)]
pub enum ActorState<'a> {
    /// Parameters captured, no broker yet.
    Unbound(&'a ActorSpec),
    /// Bound to a broker; behaves as a plain [`Actor`].
    Bound(&'a Actor),
}

/// An actor that does not touch a broker until [`init_actor`](Self::init_actor).
pub struct LazyActor {
    func: ActorFn,
    spec: ActorSpec,
    bound: OnceLock<Actor>,
}

impl fmt::Debug for LazyActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyActor")
            .field("spec", &self.spec)
            .field("bound", &self.is_bound())
            .finish_non_exhaustive()
    }
}

impl LazyActor {
    pub fn new(func: ActorFn, spec: ActorSpec) -> Self {
        Self {
            func,
            spec,
            bound: OnceLock::new(),
        }
    }

    /// Build from a plain function.
    pub fn from_fn<F>(spec: ActorSpec, func: F) -> Self
    where
        F: Fn(&Value) -> Result<(), JobError> + Send + Sync + 'static,
    {
        Self::new(Arc::new(func), spec)
    }

    /// Connect the actor with the broker being given to it.
    ///
    /// An actor is bound at most once; later calls fail with
    /// [`JobError::AlreadyBound`] and keep the first binding.
    pub fn init_actor(&self, broker: Arc<dyn Broker>) -> Result<&Actor, JobError> {
        if self.bound.get().is_some() {
            return Err(JobError::AlreadyBound(self.spec.actor_name.clone()));
        }

        let actor = Actor::new(self.func.clone(), self.spec.clone(), broker)?;
        self.bound
            .set(actor)
            .map_err(|_| JobError::AlreadyBound(self.spec.actor_name.clone()))?;

        tracing::info!(actor = %self.spec.actor_name, queue = %self.spec.queue_name, "Lazy actor bound to broker");
        self.actor()
    }

    pub fn state(&self) -> ActorState<'_> {
        match self.bound.get() {
            Some(actor) => ActorState::Bound(actor),
            None => ActorState::Unbound(&self.spec),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.bound.get().is_some()
    }

    pub fn spec(&self) -> &ActorSpec {
        &self.spec
    }

    pub fn actor_name(&self) -> &str {
        &self.spec.actor_name
    }

    /// The broker, once bound.
    pub fn broker(&self) -> Option<&Arc<dyn Broker>> {
        self.bound.get().map(Actor::broker)
    }

    /// The bound actor, or [`JobError::Unbound`].
    pub fn actor(&self) -> Result<&Actor, JobError> {
        self.bound
            .get()
            .ok_or_else(|| JobError::Unbound(self.spec.actor_name.clone()))
    }

    pub fn message<A: Serialize>(&self, args: A) -> Result<Message, JobError> {
        self.actor()?.message(args)
    }

    pub fn send<A: Serialize>(&self, args: A) -> Result<Message, JobError> {
        self.actor()?.send(args)
    }

    pub fn send_with_options<A: Serialize>(
        &self,
        args: A,
        options: Map<String, Value>,
    ) -> Result<Message, JobError> {
        self.actor()?.send_with_options(args, options)
    }

    /// Run the function inline. Needs no broker, but goes through the bound
    /// actor so bound and unbound use stay distinguishable.
    pub fn call(&self, args: &Value) -> Result<(), JobError> {
        self.actor()?.call(args)
    }
}
