//! The dispatcher itself: registration, the main loop, and the writer task.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use eventide_runtime::{RuntimeConfig, Scheduler, TaskHandle};
use serde_json::Value;

use crate::error::LspError;
use crate::protocol::{
    build_error_response, build_success_response, parse_incoming_message, IncomingMessage,
    RequestId, METHOD_NOT_FOUND, REQUEST_FAILED,
};
use crate::transport::Transport;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T>>>;
type RequestHandler = Rc<dyn Fn(Value) -> BoxFuture<Result<Value, String>>>;
type NotificationHandler = Rc<dyn Fn(Value)>;

struct Inner {
    transport: RefCell<Box<dyn Transport>>,
    request_handlers: RefCell<HashMap<String, RequestHandler>>,
    notification_handlers: RefCell<HashMap<String, NotificationHandler>>,
    outgoing: RefCell<VecDeque<String>>,
    writer_running: Cell<bool>,
    pending: RefCell<Vec<TaskHandle<()>>>,
}

/// Cooperative, single-threaded JSON-RPC 2.0 dispatcher.
///
/// Owns one [`Transport`] and routes framed messages read from it to
/// handlers registered via [`register_request_handler`](Self::register_request_handler) /
/// [`register_notification_handler`](Self::register_notification_handler). All
/// state lives behind `Rc`/`RefCell` rather than `Arc`/`Mutex`: correctness
/// relies entirely on everything running on the one thread the scheduler
/// drives, which `spawn_local`'s `!Send` bound enforces at compile time.
pub struct LanguageServer {
    scheduler: Scheduler,
    inner: Rc<Inner>,
}

impl LanguageServer {
    /// Build a server around an already-constructed transport.
    ///
    /// # Errors
    /// Returns [`LspError::StartupFailed`] only if the underlying runtime
    /// fails to construct; the transport itself cannot fail here since it
    /// is supplied already open.
    pub fn new(transport: impl Transport + 'static) -> Result<Self, LspError> {
        Self::with_config(transport, RuntimeConfig::default())
    }

    /// Like [`new`](Self::new), with an explicit [`RuntimeConfig`].
    ///
    /// # Errors
    /// See [`new`](Self::new).
    pub fn with_config(
        transport: impl Transport + 'static,
        config: RuntimeConfig,
    ) -> Result<Self, LspError> {
        let scheduler =
            Scheduler::new(config).map_err(|e| LspError::StartupFailed(e.to_string()))?;
        Ok(Self {
            scheduler,
            inner: Rc::new(Inner {
                transport: RefCell::new(Box::new(transport)),
                request_handlers: RefCell::new(HashMap::with_capacity(config.ready_queue_hint)),
                notification_handlers: RefCell::new(HashMap::new()),
                outgoing: RefCell::new(VecDeque::with_capacity(config.outgoing_queue_hint)),
                writer_running: Cell::new(false),
                pending: RefCell::new(Vec::new()),
            }),
        })
    }

    /// Register an asynchronous handler for request method `method`.
    ///
    /// `handler` receives the request's raw `params` and must resolve to
    /// either the raw `result` value or an error message; the dispatcher
    /// wraps either into a well-formed JSON-RPC response.
    pub fn register_request_handler<F, Fut>(&mut self, method: impl Into<String>, handler: F)
    where
        F: Fn(Value) -> Fut + 'static,
        Fut: Future<Output = Result<Value, String>> + 'static,
    {
        let handler: RequestHandler = Rc::new(move |params| Box::pin(handler(params)));
        self.inner
            .request_handlers
            .borrow_mut()
            .insert(method.into(), handler);
    }

    /// Register a synchronous handler for notification method `method`.
    ///
    /// Notification handlers run inline in the main loop, before the next
    /// message is read, so two notifications arriving in order are observed
    /// in that order with the first's side effects visible to the second.
    pub fn register_notification_handler<F>(&mut self, method: impl Into<String>, handler: F)
    where
        F: Fn(Value) + 'static,
    {
        self.inner
            .notification_handlers
            .borrow_mut()
            .insert(method.into(), Rc::new(handler));
    }

    /// Run the dispatcher until the transport reports end-of-input.
    ///
    /// Returns `0` on clean EOF. Startup failures are surfaced by
    /// [`new`](Self::new)/[`with_config`](Self::with_config) instead of
    /// here, so this always returns `0`; it stays an `i32` to match the
    /// process-exit-code convention the rest of the dispatcher's contract
    /// is phrased in.
    #[must_use]
    pub fn start(self) -> i32 {
        let inner = self.inner;
        self.scheduler.run(main_loop(inner));
        0
    }
}

async fn main_loop(inner: Rc<Inner>) {
    loop {
        let payload = inner.transport.borrow_mut().read_message().await;
        let Some(payload) = payload else {
            tracing::debug!(target: "eventide.lsp", "transport reported EOF");
            break;
        };

        let parsed = match parse_incoming_message(&payload) {
            Ok(msg) => msg,
            Err(reason) => {
                tracing::debug!(target: "eventide.lsp", %reason, "dropping malformed message");
                continue;
            }
        };

        if parsed.is_unroutable() {
            continue;
        }

        if parsed.is_request() {
            dispatch_request(&inner, parsed);
        } else {
            dispatch_notification(&inner, parsed);
        }
    }

    drain_pending(&inner).await;
}

// Requests and the writer task run as detached spawns so the main loop can
// keep reading without waiting on them; EOF doesn't mean they're done, so
// whatever is still outstanding (or gets spawned while we drain, e.g. the
// writer task a just-finished request enqueues) is awaited here before
// `start` returns.
async fn drain_pending(inner: &Rc<Inner>) {
    loop {
        let handle = inner.pending.borrow_mut().pop();
        let Some(handle) = handle else {
            break;
        };
        let _ = handle.await;
    }
}

fn dispatch_notification(inner: &Rc<Inner>, message: IncomingMessage) {
    let method = message.method.expect("checked by is_unroutable");
    let handler = inner.notification_handlers.borrow().get(&method).cloned();
    if let Some(handler) = handler {
        handler(message.params);
    }
}

fn dispatch_request(inner: &Rc<Inner>, message: IncomingMessage) {
    let method = message.method.expect("checked by is_unroutable");
    let id = message.id.expect("checked by is_request");
    let handler = inner.request_handlers.borrow().get(&method).cloned();

    let Some(handler) = handler else {
        send_error(inner, &id, METHOD_NOT_FOUND, &format!("method not found: {method}"));
        return;
    };

    let spawned = inner.clone();
    let handle = eventide_runtime::spawn(async move {
        match handler(message.params).await {
            Ok(result) => {
                let response = build_success_response(&id, result);
                enqueue_outgoing(&spawned, response);
            }
            Err(message) => {
                send_error(&spawned, &id, REQUEST_FAILED, &message);
            }
        }
    });
    inner.pending.borrow_mut().push(handle);
}

fn send_error(inner: &Rc<Inner>, id: &RequestId, code: i64, message: &str) {
    let response = build_error_response(id, code, message);
    enqueue_outgoing(inner, response);
}

fn enqueue_outgoing(inner: &Rc<Inner>, payload: String) {
    inner.outgoing.borrow_mut().push_back(payload);
    if !inner.writer_running.get() {
        inner.writer_running.set(true);
        let handle = eventide_runtime::spawn(writer_loop(inner.clone()));
        inner.pending.borrow_mut().push(handle);
    }
}

async fn writer_loop(inner: Rc<Inner>) {
    loop {
        let next = inner.outgoing.borrow_mut().pop_front();
        let Some(payload) = next else {
            break;
        };
        let written = inner.transport.borrow_mut().write_message(&payload).await;
        if !written {
            inner.outgoing.borrow_mut().clear();
            break;
        }
    }
    inner.writer_running.set(false);
}
