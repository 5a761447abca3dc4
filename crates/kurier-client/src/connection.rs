//! Full-duplex broker connection with correlation-id multiplexing.
//!
//! One TCP socket carries any number of pipelined requests. Each send
//! stamps the next correlation id, registers a completion slot, and writes
//! its frame; a single background reader demultiplexes response frames back
//! onto the matching slots. The write path lazily connects and reconnects
//! under the configured retry policy.

use bytes::Bytes;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use kurier_common::{Error, Result};
use kurier_protocol::{decode_response, encode_request, ApiKey, Request, RequestContext, Response};

use crate::config::ConnectionConfig;
use crate::endpoint::BrokerEndpoint;

/// The correlation seed wraps back to zero this far short of `i32::MAX`,
/// leaving a guard band wider than any realistic in-flight window.
const CORRELATION_WRAP_MARGIN: i32 = 100;

/// Bound on how long dispose waits for the reader task to wind down.
const READER_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// An in-flight request awaiting its correlated response frame.
struct Pending {
    api_key: ApiKey,
    sent_at: Instant,
    tx: oneshot::Sender<Result<Bytes>>,
}

struct Inner {
    endpoint: BrokerEndpoint,
    config: ConnectionConfig,
    correlation: AtomicI32,
    slots: DashMap<i32, Pending>,
    writer: Mutex<Option<OwnedWriteHalf>>,
    /// Socket generation; a reader only tears down its own generation
    socket_epoch: AtomicU64,
    halves_tx: mpsc::UnboundedSender<(OwnedReadHalf, u64)>,
    reader_task: Mutex<Option<JoinHandle<()>>>,
    reader_gate: AtomicBool,
    reader_alive: AtomicBool,
    in_error: AtomicBool,
    disposed: AtomicBool,
    shutdown: CancellationToken,
}

/// A multiplexed connection to one broker.
pub struct Connection {
    inner: Arc<Inner>,
}

impl Connection {
    /// Create a connection handle. No I/O happens here; the first send
    /// connects the socket.
    pub fn new(endpoint: BrokerEndpoint, config: ConnectionConfig) -> Self {
        let (halves_tx, halves_rx) = mpsc::unbounded_channel();
        let inner = Arc::new(Inner {
            endpoint,
            config,
            correlation: AtomicI32::new(0),
            slots: DashMap::new(),
            writer: Mutex::new(None),
            socket_epoch: AtomicU64::new(0),
            halves_tx,
            reader_task: Mutex::new(None),
            reader_gate: AtomicBool::new(false),
            reader_alive: AtomicBool::new(false),
            in_error: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        });

        let handle = tokio::spawn(run_reader(inner.clone(), halves_rx));
        // stash the handle for the bounded join in dispose
        if let Ok(mut slot) = inner.reader_task.try_lock() {
            *slot = Some(handle);
        }

        Self { inner }
    }

    /// The endpoint this connection talks to.
    pub fn endpoint(&self) -> &BrokerEndpoint {
        &self.inner.endpoint
    }

    /// Whether the background reader task is running.
    pub fn is_reader_alive(&self) -> bool {
        self.inner.reader_alive.load(Ordering::SeqCst)
    }

    /// Whether the reader is inside an error episode (set on the first
    /// failed read, cleared by the next successful frame).
    pub fn is_in_error_state(&self) -> bool {
        self.inner.in_error.load(Ordering::SeqCst)
    }

    /// Number of requests awaiting responses.
    pub fn in_flight(&self) -> usize {
        self.inner.slots.len()
    }

    /// Send a request with a default context.
    pub async fn send(&self, request: Request) -> Result<Option<Response>> {
        self.send_with_context(request, RequestContext::new()).await
    }

    /// Send a request, decoding the response with the given context.
    pub async fn send_with_context(
        &self,
        request: Request,
        ctx: RequestContext,
    ) -> Result<Option<Response>> {
        self.send_with_cancellation(request, ctx, CancellationToken::new()).await
    }

    /// Send a request under a caller-owned cancellation token.
    ///
    /// Returns `None` without registering a slot when the request expects
    /// no response (Produce with acks=0); such sends resolve as soon as the
    /// frame is handed to the transport. Cancellation removes the slot and
    /// never closes the connection.
    pub async fn send_with_cancellation(
        &self,
        request: Request,
        ctx: RequestContext,
        cancel: CancellationToken,
    ) -> Result<Option<Response>> {
        let inner = &self.inner;
        if inner.disposed.load(Ordering::SeqCst) {
            return Err(Error::Disposed);
        }

        let ctx = ctx.with_correlation(inner.next_correlation_id());
        let correlation_id = ctx.correlation_id;
        let api_key = request.api_key();
        let frame = encode_request(&ctx, &request)?;

        let receiver = if request.expect_response() {
            let (tx, rx) = oneshot::channel();
            let evicted = inner.slots.insert(
                correlation_id,
                Pending { api_key, sent_at: Instant::now(), tx },
            );
            debug_assert!(evicted.is_none(), "correlation id {} already in flight", correlation_id);
            Some(rx)
        } else {
            None
        };

        if let Err(e) = inner.write_frame(&frame, &cancel).await {
            inner.slots.remove(&correlation_id);
            return Err(e);
        }
        let Some(receiver) = receiver else {
            trace!(correlation_id, "fire-and-forget send complete");
            return Ok(None);
        };

        let deadline = inner.config.response_timeout;
        tokio::select! {
            _ = cancel.cancelled() => {
                inner.slots.remove(&correlation_id);
                Err(Error::Canceled)
            }
            outcome = tokio::time::timeout(deadline, receiver) => match outcome {
                Err(_) => {
                    inner.slots.remove(&correlation_id);
                    debug!(endpoint = %inner.endpoint, correlation_id, "request timed out");
                    Err(Error::Timeout { elapsed: deadline })
                }
                // the slot vanished without an explicit verdict; the socket
                // went away underneath it
                Ok(Err(_)) => Err(Error::ServerDisconnected),
                Ok(Ok(Err(e))) => Err(e),
                Ok(Ok(Ok(frame))) => {
                    Ok(Some(decode_response(&ctx, api_key, frame, false)?))
                }
            }
        }
    }

    /// Write an already-framed payload with no correlation tracking.
    ///
    /// SASL mechanism exchanges travel this way between handshake frames.
    pub async fn send_raw(&self, frame: Bytes) -> Result<()> {
        if self.inner.disposed.load(Ordering::SeqCst) {
            return Err(Error::Disposed);
        }
        self.inner.write_frame(&frame, &CancellationToken::new()).await
    }

    /// Tear the connection down. Idempotent; every pending send fails with
    /// `Disposed`.
    pub async fn dispose(&self) {
        let inner = &self.inner;
        if inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        info!(endpoint = %inner.endpoint, pending = inner.slots.len(), "disposing connection");
        inner.shutdown.cancel();

        let correlations: Vec<i32> = inner.slots.iter().map(|entry| *entry.key()).collect();
        for correlation_id in correlations {
            if let Some((_, pending)) = inner.slots.remove(&correlation_id) {
                debug!(
                    correlation_id,
                    api_key = pending.api_key as i16,
                    elapsed = ?pending.sent_at.elapsed(),
                    "failing pending request on dispose"
                );
                let _ = pending.tx.send(Err(Error::Disposed));
            }
        }

        let handle = inner.reader_task.lock().await.take();
        if let Some(handle) = handle {
            if tokio::time::timeout(READER_JOIN_TIMEOUT, handle).await.is_err() {
                warn!(endpoint = %inner.endpoint, "reader did not exit in time");
            }
        }

        *inner.writer.lock().await = None;
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.inner.shutdown.cancel();
    }
}

impl Inner {
    /// Next correlation id: monotonic, wrapping to zero inside the guard
    /// band and skipping ids that are still in flight.
    fn next_correlation_id(&self) -> i32 {
        loop {
            let id = self.correlation.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
            if id >= i32::MAX - CORRELATION_WRAP_MARGIN || id < 0 {
                self.correlation.store(0, Ordering::Relaxed);
                continue;
            }
            if !self.slots.contains_key(&id) {
                return id;
            }
        }
    }

    /// Write one frame, lazily (re)connecting first. Writes serialize on
    /// the writer lock so frames never interleave.
    async fn write_frame(&self, frame: &[u8], cancel: &CancellationToken) -> Result<()> {
        let mut guard = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Canceled),
            _ = self.shutdown.cancelled() => return Err(Error::Disposed),
            guard = self.writer.lock() => guard,
        };

        if guard.is_none() {
            self.connect(&mut guard, cancel).await?;
        }
        let Some(writer) = guard.as_mut() else {
            return Err(Error::ConnectionFailed(format!("{}: no socket", self.endpoint)));
        };

        if let Err(e) = writer.write_all(frame).await {
            warn!(endpoint = %self.endpoint, error = %e, "write failed, dropping socket");
            *guard = None;
            return Err(Error::Io(e));
        }
        trace!(endpoint = %self.endpoint, bytes = frame.len(), "frame written");
        Ok(())
    }

    /// Connect under the retry policy, parking the read half with the
    /// background reader. Caller holds the writer lock.
    async fn connect(
        &self,
        guard: &mut Option<OwnedWriteHalf>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let started = Instant::now();
        let mut attempt = 0u32;
        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => return Err(Error::Canceled),
                _ = self.shutdown.cancelled() => return Err(Error::Disposed),
                result = TcpStream::connect(self.endpoint.address()) => result,
            };

            match result {
                Ok(stream) => {
                    let _ = stream.set_nodelay(true);
                    let (read_half, write_half) = stream.into_split();
                    let epoch = self.socket_epoch.fetch_add(1, Ordering::SeqCst) + 1;
                    *guard = Some(write_half);
                    if self.halves_tx.send((read_half, epoch)).is_err() {
                        return Err(Error::Disposed);
                    }
                    info!(endpoint = %self.endpoint, attempt, "connected");
                    return Ok(());
                }
                Err(e) => match self.config.connect_retry.next_delay(attempt, started.elapsed()) {
                    Some(delay) => {
                        debug!(
                            endpoint = %self.endpoint,
                            attempt,
                            error = %e,
                            "connect failed, retrying in {:?}",
                            delay
                        );
                        tokio::select! {
                            _ = cancel.cancelled() => return Err(Error::Canceled),
                            _ = self.shutdown.cancelled() => return Err(Error::Disposed),
                            _ = tokio::time::sleep(delay) => {}
                        }
                        attempt += 1;
                    }
                    None => {
                        warn!(endpoint = %self.endpoint, attempt, error = %e, "giving up on connect");
                        return Err(Error::ConnectionFailed(format!("{}: {}", self.endpoint, e)));
                    }
                },
            }
        }
    }

    /// Drain frames off one socket until it dies or shutdown fires.
    async fn read_frames(&self, mut half: OwnedReadHalf, epoch: u64) {
        loop {
            match self.read_frame(&mut half).await {
                Ok(frame) => {
                    if self.in_error.swap(false, Ordering::SeqCst) {
                        info!(endpoint = %self.endpoint, "reader recovered");
                    }
                    self.dispatch_frame(frame);
                }
                Err((skipped, error)) => {
                    if self.shutdown.is_cancelled() {
                        return;
                    }
                    if skipped > 0 {
                        warn!(endpoint = %self.endpoint, "skipped {} bytes of a partial frame", skipped);
                    }
                    // one log line per error episode; recovery logs on the
                    // next good frame
                    if !self.in_error.swap(true, Ordering::SeqCst) {
                        warn!(endpoint = %self.endpoint, error = %error, "read failed, awaiting reconnect");
                    }
                    // drop the dead writer so the next send reconnects;
                    // requests already in flight on this socket will time
                    // out. A send may already have replaced the socket, so
                    // only this generation's writer is torn down.
                    let mut guard = self.writer.lock().await;
                    if self.socket_epoch.load(Ordering::SeqCst) == epoch {
                        *guard = None;
                    }
                    return;
                }
            }
        }
    }

    /// Read one `size || payload` frame, reporting how many bytes of a
    /// partial frame were lost on failure.
    async fn read_frame(
        &self,
        half: &mut OwnedReadHalf,
    ) -> std::result::Result<Bytes, (usize, Error)> {
        let mut header = [0u8; 4];
        let mut got = 0usize;
        while got < 4 {
            let n = tokio::select! {
                _ = self.shutdown.cancelled() => return Err((got, Error::Disposed)),
                read = half.read(&mut header[got..]) => read.map_err(|e| (got, Error::Io(e)))?,
            };
            if n == 0 {
                return Err((got, Error::ServerDisconnected));
            }
            got += n;
        }

        let size = i32::from_be_bytes(header);
        if size < 4 || size as usize > self.config.max_frame_size {
            return Err((4, Error::Protocol(format!("invalid frame size {}", size))));
        }
        let size = size as usize;

        let mut frame = vec![0u8; size];
        let mut got_body = 0usize;
        while got_body < size {
            let n = tokio::select! {
                _ = self.shutdown.cancelled() => return Err((4 + got_body, Error::Disposed)),
                read = half.read(&mut frame[got_body..]) => {
                    read.map_err(|e| (4 + got_body, Error::Io(e)))?
                }
            };
            if n == 0 {
                return Err((4 + got_body, Error::ServerDisconnected));
            }
            got_body += n;
        }
        Ok(Bytes::from(frame))
    }

    /// Hand a response frame to the slot its correlation id names.
    fn dispatch_frame(&self, frame: Bytes) {
        let mut correlation = [0u8; 4];
        correlation.copy_from_slice(&frame[..4]);
        let correlation_id = i32::from_be_bytes(correlation);

        match self.slots.remove(&correlation_id) {
            Some((_, pending)) => {
                trace!(
                    endpoint = %self.endpoint,
                    correlation_id,
                    elapsed = ?pending.sent_at.elapsed(),
                    "response frame dispatched"
                );
                let _ = pending.tx.send(Ok(frame));
            }
            None => {
                debug!(
                    endpoint = %self.endpoint,
                    correlation_id,
                    "discarding frame with no in-flight request"
                );
            }
        }
    }
}

/// The per-connection background reader.
///
/// Exactly one reader runs per connection; the atomic gate turns a second
/// spawn into a no-op. Each reconnect parks a fresh read half on the
/// channel and the loop picks it up.
async fn run_reader(
    inner: Arc<Inner>,
    mut halves: mpsc::UnboundedReceiver<(OwnedReadHalf, u64)>,
) {
    if inner.reader_gate.swap(true, Ordering::SeqCst) {
        warn!(endpoint = %inner.endpoint, "reader already active, second reader refusing to start");
        return;
    }
    inner.reader_alive.store(true, Ordering::SeqCst);
    debug!(endpoint = %inner.endpoint, "reader started");

    loop {
        let (half, epoch) = tokio::select! {
            _ = inner.shutdown.cancelled() => break,
            half = halves.recv() => match half {
                Some(half) => half,
                None => break,
            },
        };
        inner.read_frames(half, epoch).await;
        if inner.shutdown.is_cancelled() {
            break;
        }
    }

    inner.reader_alive.store(false, Ordering::SeqCst);
    debug!(endpoint = %inner.endpoint, "reader exited");
}
