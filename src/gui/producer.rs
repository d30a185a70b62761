//! Event producers.
//!
//! A producer lets a component emit an event without knowing who answers
//! it. When a producer has no local handler it falls back to its broker, a
//! parent producer handed in at construction time and fixed from then on.

use std::{cell::RefCell, fmt, rc::Rc};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no subscriber for producer '{producer}'")]
pub struct NoSubscriberError {
    pub producer: &'static str,
}

type Handler<P, R> = Rc<dyn Fn(P) -> R>;

/// Single-handler producer: the local handler answers, otherwise the broker.
pub struct Producer<P, R> {
    name: &'static str,
    handler: RefCell<Option<Handler<P, R>>>,
    broker: Option<Rc<Producer<P, R>>>,
}

impl<P, R> fmt::Debug for Producer<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("name", &self.name)
            .field("subscribed", &self.handler.borrow().is_some())
            .field("broker", &self.broker.as_ref().map(|broker| broker.name))
            .finish()
    }
}

impl<P, R> Producer<P, R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            handler: RefCell::new(None),
            broker: None,
        }
    }

    pub fn with_broker(name: &'static str, broker: Rc<Producer<P, R>>) -> Self {
        Self {
            name,
            handler: RefCell::new(None),
            broker: Some(broker),
        }
    }

    /// Install the handler, replacing any previous one.
    pub fn subscribe(&self, handler: impl Fn(P) -> R + 'static) {
        *self.handler.borrow_mut() = Some(Rc::new(handler));
    }

    pub fn unsubscribe(&self) {
        self.handler.borrow_mut().take();
    }

    /// True if this producer or any broker up the chain has a handler.
    pub fn has_subscriber(&self) -> bool {
        self.handler.borrow().is_some()
            || self
                .broker
                .as_ref()
                .is_some_and(|broker| broker.has_subscriber())
    }

    pub fn produce(&self, payload: P) -> Option<R> {
        // Clone the handler out so it may resubscribe while running.
        let handler = self.handler.borrow().clone();
        match handler {
            Some(handler) => Some(handler(payload)),
            None => self
                .broker
                .as_ref()
                .and_then(|broker| broker.produce(payload)),
        }
    }

    pub fn produce_one(&self, payload: P) -> Result<R, NoSubscriberError> {
        self.produce(payload).ok_or(NoSubscriberError {
            producer: self.name,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Fan-out producer: every local handler runs, then the broker's.
pub struct FanOutProducer<P, R> {
    name: &'static str,
    handlers: RefCell<Vec<(SubscriptionId, Handler<P, R>)>>,
    next_id: RefCell<u64>,
    broker: Option<Rc<FanOutProducer<P, R>>>,
}

impl<P, R> fmt::Debug for FanOutProducer<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanOutProducer")
            .field("name", &self.name)
            .field("subscribers", &self.handlers.borrow().len())
            .field("broker", &self.broker.as_ref().map(|broker| broker.name))
            .finish()
    }
}

impl<P: Clone, R> FanOutProducer<P, R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            handlers: RefCell::new(Vec::new()),
            next_id: RefCell::new(0),
            broker: None,
        }
    }

    pub fn with_broker(name: &'static str, broker: Rc<FanOutProducer<P, R>>) -> Self {
        Self {
            broker: Some(broker),
            ..Self::new(name)
        }
    }

    pub fn subscribe(&self, handler: impl Fn(P) -> R + 'static) -> SubscriptionId {
        let mut next_id = self.next_id.borrow_mut();
        let id = SubscriptionId(*next_id);
        *next_id += 1;
        self.handlers.borrow_mut().push((id, Rc::new(handler)));
        id
    }

    /// Returns false if `id` was not subscribed here.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Results in `[local…, broker…]` order.
    pub fn produce(&self, payload: P) -> Vec<R> {
        let handlers: Vec<Handler<P, R>> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        let mut results: Vec<R> = handlers
            .iter()
            .map(|handler| handler(payload.clone()))
            .collect();
        if let Some(broker) = &self.broker {
            results.extend(broker.produce(payload));
        }
        results
    }
}
