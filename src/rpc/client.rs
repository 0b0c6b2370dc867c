//! Outbound request correlation.
//!
//! Every Call sent through [`RpcClient::send_request`] gets a fresh unique
//! id and an entry in the pending table. The entry owns a type-erased
//! completion closure that knows the expected response type; when a
//! CallResult or CallError with that id arrives, or the deadline passes,
//! the entry is removed and its closure fires exactly once.
//!
//! ```text
//! send_request ──▶ pending[id] = (action, deadline, completion)
//!                        │
//!   handle_message ──────┤ remove(id) ─▶ completion(Result | Error)
//!   expire(now) ─────────┘ remove(id) ─▶ completion(TimedOut)
//! ```
//!
//! The table lives behind a critical-section mutex so the receive task and
//! the timer task can both resolve entries. Completions always run after
//! the lock is released.

use core::cell::RefCell;
use core::fmt::Write as _;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicU32, Ordering};
use std::io;
use std::sync::Arc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use heapless::FnvIndexMap;
use log::{debug, warn};
use serde_json::Value;

use super::Request;
use super::envelope::{CallError, Message, UniqueId, write_call};
use super::stream::SizeCalculator;
use crate::codec::{Record, decode_record};
use crate::config::RpcConfig;
use crate::error::{RpcError, SendError};

/// Maximum number of outstanding Calls.
pub const MAX_PENDING: usize = 16;

/// What a pending entry is completed with.
pub enum Outcome<'a> {
    Result(&'a Value),
    Error(&'a CallError),
    TimedOut,
}

type Completion = Box<dyn FnOnce(Outcome<'_>) + Send>;

struct Pending {
    action: &'static str,
    deadline_ms: u64,
    complete: Completion,
}

type PendingTable = FnvIndexMap<UniqueId, Pending, MAX_PENDING>;

/// Result of feeding an inbound message to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A pending request was completed.
    Resolved,
    /// Response id matched nothing (already timed out, or never sent).
    Unmatched,
    /// The message is a Call and belongs to the dispatcher.
    Call,
}

type Slot<R> = Signal<CriticalSectionRawMutex, Result<R, RpcError>>;

/// Receiving end of one request.
pub struct ResponseHandle<R> {
    unique_id: UniqueId,
    slot: Arc<Slot<R>>,
    _response: PhantomData<fn() -> R>,
}

impl<R: Send> ResponseHandle<R> {
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Take the outcome if the request has completed.
    pub fn try_take(&self) -> Option<Result<R, RpcError>> {
        self.slot.try_take()
    }

    pub fn is_ready(&self) -> bool {
        self.slot.signaled()
    }

    /// Wait for the request to complete, time out or fail.
    pub async fn wait(self) -> Result<R, RpcError> {
        self.slot.wait().await
    }
}

pub struct RpcClient {
    call_timeout_ms: u64,
    max_message_size: usize,
    next_id: AtomicU32,
    pending: Mutex<CriticalSectionRawMutex, RefCell<PendingTable>>,
}

impl RpcClient {
    pub fn new(config: &RpcConfig) -> Self {
        Self {
            call_timeout_ms: u64::from(config.call_timeout_ms),
            max_message_size: config.max_message_size,
            next_id: AtomicU32::new(1),
            pending: Mutex::new(RefCell::new(FnvIndexMap::new())),
        }
    }

    /// Send `request` with the configured timeout.
    pub fn send_request<Q: Request>(
        &self,
        request: &Q,
        now_ms: u64,
        out: &mut dyn io::Write,
    ) -> Result<ResponseHandle<Q::Response>, SendError> {
        self.send_request_with_timeout(request, now_ms, self.call_timeout_ms, out)
    }

    /// Encode `request` as a Call, register it and write it to `out`.
    pub fn send_request_with_timeout<Q: Request>(
        &self,
        request: &Q,
        now_ms: u64,
        timeout_ms: u64,
        out: &mut dyn io::Write,
    ) -> Result<ResponseHandle<Q::Response>, SendError> {
        let slot: Arc<Slot<Q::Response>> = Arc::new(Signal::new());
        let pending = Pending {
            action: Q::ACTION,
            deadline_ms: now_ms.saturating_add(timeout_ms),
            complete: completion::<Q::Response>(Q::ACTION, Arc::clone(&slot)),
        };
        let unique_id = self.register(pending)?;

        let mut calc = SizeCalculator::new();
        write_call(&mut calc, &unique_id, Q::ACTION, request)?;
        if calc.size() > self.max_message_size {
            self.remove(&unique_id);
            warn!(
                "RPC[{}]: {} is {} bytes, limit {}",
                unique_id,
                Q::ACTION,
                calc.size(),
                self.max_message_size
            );
            return Err(SendError::TooLarge {
                size: calc.size(),
                max: self.max_message_size,
            });
        }

        if let Err(e) = write_call(out, &unique_id, Q::ACTION, request).and_then(|()| out.flush()) {
            self.remove(&unique_id);
            warn!("RPC[{}]: sending {} failed: {}", unique_id, Q::ACTION, e);
            return Err(SendError::Io(e));
        }
        debug!("RPC[{}]: -> {}", unique_id, Q::ACTION);

        Ok(ResponseHandle {
            unique_id,
            slot,
            _response: PhantomData,
        })
    }

    /// Allocate an id that is not currently pending and insert the entry.
    fn register(&self, pending: Pending) -> Result<UniqueId, SendError> {
        self.pending.lock(|cell| {
            let mut table = cell.borrow_mut();
            if table.len() >= MAX_PENDING {
                warn!("RPC: pending table full, rejecting {}", pending.action);
                return Err(SendError::TooManyPending);
            }
            let unique_id = loop {
                let candidate = self.alloc_unique_id();
                if !table.contains_key(&candidate) {
                    break candidate;
                }
            };
            table
                .insert(unique_id.clone(), pending)
                .map_err(|_| SendError::TooManyPending)?;
            Ok(unique_id)
        })
    }

    fn alloc_unique_id(&self) -> UniqueId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut id = UniqueId::new();
        // A u32 is at most 10 digits.
        let _ = write!(id, "{n}");
        id
    }

    fn remove(&self, unique_id: &UniqueId) -> Option<Pending> {
        self.pending.lock(|cell| cell.borrow_mut().remove(unique_id))
    }

    /// Route an inbound message to its pending request.
    pub fn handle_message(&self, message: &Message) -> Resolution {
        let (unique_id, outcome) = match message {
            Message::Call { .. } => return Resolution::Call,
            Message::CallResult { unique_id, payload } => (unique_id, Outcome::Result(payload)),
            Message::CallError { unique_id, error } => (unique_id, Outcome::Error(error)),
        };

        match self.remove(unique_id) {
            Some(pending) => {
                debug!("RPC[{}]: <- {}", unique_id, pending.action);
                (pending.complete)(outcome);
                Resolution::Resolved
            }
            None => {
                warn!("RPC[{}]: no pending request, discarding response", unique_id);
                Resolution::Unmatched
            }
        }
    }

    /// Time out every entry whose deadline is at or before `now_ms`.
    /// Returns the number of requests that expired.
    pub fn expire(&self, now_ms: u64) -> usize {
        let expired: Vec<(UniqueId, Pending)> = self.pending.lock(|cell| {
            let mut table = cell.borrow_mut();
            let due: Vec<UniqueId> = table
                .iter()
                .filter(|(_, p)| p.deadline_ms <= now_ms)
                .map(|(id, _)| id.clone())
                .collect();
            due.into_iter()
                .filter_map(|id| table.remove(&id).map(|p| (id, p)))
                .collect()
        });

        let count = expired.len();
        for (unique_id, pending) in expired {
            warn!("RPC[{}]: {} timed out", unique_id, pending.action);
            (pending.complete)(Outcome::TimedOut);
        }
        count
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock(|cell| cell.borrow().len())
    }

    pub fn is_pending(&self, unique_id: &str) -> bool {
        self.pending
            .lock(|cell| cell.borrow().keys().any(|id| id.as_str() == unique_id))
    }
}

/// Build the type-erased completion for response type `R`.
fn completion<R>(action: &'static str, slot: Arc<Slot<R>>) -> Completion
where
    R: Record + Send + 'static,
{
    Box::new(move |outcome: Outcome<'_>| {
        let result = match outcome {
            Outcome::Result(payload) => decode_record::<R>(payload).map_err(|e| {
                warn!("RPC: {} response rejected: {}", action, e);
                RpcError::Decode(e)
            }),
            Outcome::Error(error) => Err(RpcError::CallError(error.clone())),
            Outcome::TimedOut => Err(RpcError::Timeout),
        };
        slot.signal(result);
    })
}
