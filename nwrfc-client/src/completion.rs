//! Exactly-once completion delivery.
//!
//! A [`Completion`] owns the caller's callback while an operation is in
//! flight. The native side receives a [`Callback`] bound to it; whichever of
//! the following happens first settles the completion, and anything later is
//! ignored:
//!
//! - the native callback is called,
//! - the native object panics while the operation is being forwarded,
//! - the native object drops the callback without calling it.
//!
//! A result delivered while the operation is still being forwarded is held
//! back and handed to the caller's callback after the native call returns, so
//! the caller's callback never runs inside the panic guard.

use crate::error::ClientError;
use crate::native::Callback;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Callback receiving the outcome of a facade operation.
pub type ClientCallback<T> = Box<dyn FnOnce(Result<T, ClientError>) + Send + 'static>;

struct Slot<T> {
    callback: Option<ClientCallback<T>>,
    /// Set while the native call is on the stack.
    forwarding: bool,
    /// The native callback was dropped uncalled during forwarding.
    orphaned: bool,
    /// Result delivered synchronously during forwarding.
    pending: Option<Result<T, ClientError>>,
}

impl<T> Slot<T> {
    fn is_settled(&self) -> bool {
        self.callback.is_none() || self.pending.is_some()
    }
}

pub(crate) struct Completion<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T: Send + 'static> Completion<T> {
    pub(crate) fn new(callback: ClientCallback<T>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                callback: Some(callback),
                forwarding: false,
                orphaned: false,
                pending: None,
            })),
        }
    }

    /// Creates a completion whose outcome is awaited through a receiver.
    pub(crate) fn deferred() -> (Self, Deferred<T>) {
        let (tx, rx) = oneshot::channel();
        let completion = Self::new(Box::new(move |result| {
            let _ = tx.send(result);
        }));
        (completion, Deferred { rx })
    }

    /// Settles the completion. Returns `false` if it was already settled.
    pub(crate) fn complete(&self, result: Result<T, ClientError>) -> bool {
        // Take under the lock, call outside it.
        let callback = self.slot.lock().callback.take();
        match callback {
            Some(cb) => {
                cb(result);
                true
            }
            None => false,
        }
    }

    /// Runs `forward` with a native callback bound to this completion.
    ///
    /// Panics raised by `forward` are caught and settle the completion with
    /// [`ClientError::NativePanic`], unless the native side already delivered
    /// a result. Panics raised by the caller's callback propagate.
    pub(crate) fn dispatch<F>(&self, op: &'static str, forward: F)
    where
        F: FnOnce(Callback<T>),
    {
        self.slot.lock().forwarding = true;
        let callback = self.native_callback();
        let outcome = catch_unwind(AssertUnwindSafe(move || forward(callback)));

        let (orphaned, pending) = {
            let mut slot = self.slot.lock();
            slot.forwarding = false;
            (slot.orphaned, slot.pending.take())
        };

        let panic = outcome.err().map(|payload| panic_message(payload.as_ref()));
        if let Some(ref message) = panic {
            tracing::warn!("native {} panicked: {}", op, message);
        }

        match (pending, panic) {
            (Some(result), _) => {
                self.complete(result);
            }
            (None, Some(message)) => {
                self.complete(Err(ClientError::NativePanic(message)));
            }
            (None, None) if orphaned => {
                if self.complete(Err(ClientError::CallbackDropped)) {
                    tracing::warn!("native {} dropped its completion callback", op);
                }
            }
            (None, None) => {}
        }
    }

    /// Holds the result back while forwarding, settles directly otherwise.
    fn settle(&self, result: Result<T, ClientError>) {
        let result = {
            let mut slot = self.slot.lock();
            if slot.forwarding && !slot.is_settled() {
                slot.pending = Some(result);
                return;
            }
            result
        };
        self.complete(result);
    }

    fn native_callback(&self) -> Callback<T> {
        let guard = DropGuard {
            completion: self.clone(),
        };
        Box::new(move |result| {
            guard.completion.settle(result.map_err(ClientError::Rfc));
        })
    }
}

/// Settles the completion when the native callback is dropped uncalled.
struct DropGuard<T: Send + 'static> {
    completion: Completion<T>,
}

impl<T: Send + 'static> Drop for DropGuard<T> {
    fn drop(&mut self) {
        let forwarding = {
            let mut slot = self.completion.slot.lock();
            if slot.is_settled() {
                return;
            }
            if slot.forwarding {
                slot.orphaned = true;
            }
            slot.forwarding
        };
        // During forwarding, dispatch decides between panic and drop.
        if !forwarding && self.completion.complete(Err(ClientError::CallbackDropped)) {
            tracing::warn!("native connection dropped a completion callback");
        }
    }
}

/// Receiving end of a deferred completion.
pub(crate) struct Deferred<T> {
    rx: oneshot::Receiver<Result<T, ClientError>>,
}

impl<T> Deferred<T> {
    pub(crate) async fn wait(self) -> Result<T, ClientError> {
        self.rx.await.unwrap_or(Err(ClientError::CallbackDropped))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
