//! Sync channel: the realtime WebSocket link to a card's room.
//!
//! The channel is split in two. [`ChannelCore`] is pure connection state:
//! it decides what to send now, what to queue while offline, and how long
//! to wait before the next reconnect attempt. The transport
//! ([`spawn_sync_channel`]) owns the socket lifecycle, feeds the core, and
//! surfaces inbound traffic as [`ChannelNotice`]s on a channel the session
//! drains.
//!
//! Reconnects re-send `join-card` before anything else, then flush the
//! offline queue in emit order. After five failed attempts the channel
//! gives up for good.

#[cfg(test)]
#[path = "channel_test.rs"]
mod channel_test;

use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::time::Duration;

use futures::{Sink, SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{error, warn};
use wire::{CardId, Event, decode_event, encode_event};

/// Delay before the first reconnect attempt.
pub const RECONNECT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Ceiling for the doubled reconnect delay.
pub const RECONNECT_MAX_DELAY: Duration = Duration::from_millis(5000);

/// Reconnect attempts before the channel gives up.
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Connection state of the sync channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

/// Something the transport surfaced to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelNotice {
    /// The socket is open and `join-card` plus the offline queue have been
    /// sent. `reconnect` is `true` for every connection after the first;
    /// the session re-fetches a snapshot on those, since broadcasts were
    /// missed while offline.
    Connected { reconnect: bool },
    /// A decoded inbound event from a peer (or a server snapshot).
    Event(Event),
    /// The socket dropped; a reconnect attempt is pending.
    Disconnected,
    /// All reconnect attempts failed; the channel is dead.
    GaveUp,
}

/// Pure connection-state machine for one card's channel.
#[derive(Debug)]
pub struct ChannelCore {
    card_id: CardId,
    status: ConnectionStatus,
    pending: VecDeque<Event>,
    attempts: u32,
    ever_connected: bool,
}

impl ChannelCore {
    #[must_use]
    pub fn new(card_id: CardId) -> Self {
        Self {
            card_id,
            status: ConnectionStatus::Connecting,
            pending: VecDeque::new(),
            attempts: 0,
            ever_connected: false,
        }
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    #[must_use]
    pub fn card_id(&self) -> CardId {
        self.card_id
    }

    /// Number of events queued for the next (re)connect.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Accept an outbound event. Returns it back when the channel is
    /// connected (send it now); queues it otherwise.
    pub fn emit(&mut self, event: Event) -> Option<Event> {
        if self.status == ConnectionStatus::Connected {
            Some(event)
        } else {
            self.pending.push_back(event);
            None
        }
    }

    /// Mark the socket open. Returns the frames to send immediately, in
    /// order (`join-card` first, then the offline queue), and whether this
    /// is a reconnect rather than the first connection.
    pub fn on_connected(&mut self) -> (Vec<Event>, bool) {
        self.status = ConnectionStatus::Connected;
        self.attempts = 0;
        let reconnect = self.ever_connected;
        self.ever_connected = true;

        let mut to_send = Vec::with_capacity(self.pending.len() + 1);
        to_send.push(Event::JoinCard { card_id: self.card_id });
        to_send.extend(self.pending.drain(..));
        (to_send, reconnect)
    }

    /// Mark the socket closed. Queued and newly emitted events are held
    /// until the next successful connect.
    pub fn on_disconnected(&mut self) {
        self.status = ConnectionStatus::Disconnected;
    }

    /// Return unsent events to the front of the offline queue, in order,
    /// ahead of anything emitted since. Called when the socket dies with
    /// frames from [`on_connected`](Self::on_connected) (or a live emit)
    /// still undelivered. `join-card` frames are not kept; the next
    /// connect mints a fresh one.
    pub fn requeue(&mut self, unsent: impl IntoIterator<Item = Event>) {
        let mut restored: VecDeque<Event> = unsent
            .into_iter()
            .filter(|event| !matches!(event, Event::JoinCard { .. }))
            .collect();
        restored.append(&mut self.pending);
        self.pending = restored;
    }

    /// Delay before the next reconnect attempt, doubling from
    /// [`RECONNECT_BASE_DELAY`] up to [`RECONNECT_MAX_DELAY`]. Returns
    /// `None` once [`MAX_RECONNECT_ATTEMPTS`] have failed.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        self.attempts += 1;
        if self.attempts > MAX_RECONNECT_ATTEMPTS {
            return None;
        }
        let factor = 2u32.saturating_pow(self.attempts - 1);
        Some(RECONNECT_BASE_DELAY.saturating_mul(factor).min(RECONNECT_MAX_DELAY))
    }
}

/// Sender half handed to the session: emits outbound events into the
/// transport task.
#[derive(Debug, Clone)]
pub struct SyncChannelHandle {
    tx: mpsc::UnboundedSender<Event>,
}

impl SyncChannelHandle {
    /// Hand an event to the transport. Returns `false` if the channel task
    /// has shut down.
    pub fn emit(&self, event: Event) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Spawn the channel transport for one card.
///
/// Returns the emit handle and the notice stream. The task runs until the
/// handle is dropped or reconnect attempts are exhausted.
#[must_use]
pub fn spawn_sync_channel(ws_url: String, card_id: CardId) -> (SyncChannelHandle, mpsc::UnboundedReceiver<ChannelNotice>) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (notice_tx, notice_rx) = mpsc::unbounded_channel();

    tokio::spawn(channel_loop(ws_url, ChannelCore::new(card_id), event_rx, notice_tx));

    (SyncChannelHandle { tx: event_tx }, notice_rx)
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Main connection loop with reconnect logic.
async fn channel_loop(
    url: String,
    mut core: ChannelCore,
    mut rx: mpsc::UnboundedReceiver<Event>,
    notices: mpsc::UnboundedSender<ChannelNotice>,
) {
    loop {
        match connect_async(&url).await {
            Ok((socket, _)) => {
                if run_connected(socket, &mut core, &mut rx, &notices).await.is_break() {
                    return;
                }
            }
            Err(e) => {
                warn!(error = %e, "sync channel connect failed");
            }
        }

        core.on_disconnected();
        if notices.send(ChannelNotice::Disconnected).is_err() {
            return;
        }

        let Some(delay) = core.next_backoff() else {
            error!(card_id = %core.card_id(), "reconnect attempts exhausted; sync channel giving up");
            let _ = notices.send(ChannelNotice::GaveUp);
            return;
        };

        // Keep accepting (and queueing) edits while waiting to retry.
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                () = &mut sleep => break,
                maybe = rx.recv() => match maybe {
                    Some(event) => {
                        let _ = core.emit(event);
                    }
                    None => return,
                },
            }
        }
    }
}

/// Drive one open socket until it drops. `Break` means shut down for good.
async fn run_connected(
    socket: Socket,
    core: &mut ChannelCore,
    rx: &mut mpsc::UnboundedReceiver<Event>,
    notices: &mpsc::UnboundedSender<ChannelNotice>,
) -> ControlFlow<()> {
    let (mut sink, mut stream) = socket.split();

    let (to_send, reconnect) = core.on_connected();
    let mut to_send = to_send.into_iter();
    while let Some(event) = to_send.next() {
        if send_event(&mut sink, &event).await.is_err() {
            // The socket died mid-flush: keep the failed frame and the
            // rest of the queue for the next connect.
            let mut unsent = vec![event];
            unsent.extend(to_send);
            core.requeue(unsent);
            return ControlFlow::Continue(());
        }
    }
    if notices.send(ChannelNotice::Connected { reconnect }).is_err() {
        return ControlFlow::Break(());
    }

    loop {
        tokio::select! {
            maybe = rx.recv() => match maybe {
                Some(event) => {
                    if let Some(event) = core.emit(event) {
                        if send_event(&mut sink, &event).await.is_err() {
                            core.requeue([event]);
                            break;
                        }
                    }
                }
                None => {
                    let _ = sink.send(Message::Close(None)).await;
                    return ControlFlow::Break(());
                }
            },
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => match decode_event(&text) {
                    Ok(event) => {
                        if notices.send(ChannelNotice::Event(event)).is_err() {
                            return ControlFlow::Break(());
                        }
                    }
                    Err(e) => warn!(error = %e, "dropping undecodable frame"),
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "sync channel socket error");
                    break;
                }
            },
        }
    }

    ControlFlow::Continue(())
}

async fn send_event(
    sink: &mut (impl Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin),
    event: &Event,
) -> Result<(), ()> {
    let text = match encode_event(event) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, event = event.name(), "dropping unencodable event");
            return Ok(());
        }
    };
    sink.send(Message::Text(text.into())).await.map_err(|e| {
        warn!(error = %e, "sync channel send failed");
    })
}
