//! WebSocket push-channel handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS
//! - Register the session, enroll it in `visits`, push an initial count
//! - Lifecycle: ping/pong + idle timeout
//! - Decode-once, then resolve acks inline and hand events to the dispatcher
//!
//! Every event runs on its own task: an event's reply may wait on a client
//! ack, and that ack has to come in through this same reader loop.

use std::sync::Arc;

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tracing::Instrument;

use tally_core::error::{Result, TallyError};
use tally_core::protocol::frame::{Frame, OutFrame, EVENT_ACK};

use crate::app_state::AppState;
use crate::realtime::{Connection, SessionCtx};
use crate::transport::codec::{decode, Inbound};

const OUTBOUND_QUEUE: usize = 1024;

// --------------------
// Entry
// --------------------
pub async fn ws_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    app.metrics().ws_upgrades.inc(&[]);
    ws.on_upgrade(move |socket| async move {
        let session_id = app.realtime().sessions.next_id();
        let span = tracing::info_span!("ws_session", session = %session_id);
        if let Err(e) = run_session(app, session_id, socket).instrument(span).await {
            tracing::debug!(error = %e, "session ended with error");
        }
    })
}

// --------------------
// Session lifecycle
// --------------------
async fn run_session(app: AppState, session_id: String, socket: WebSocket) -> Result<()> {
    let (out_tx, out_rx) = mpsc::channel::<Message>(OUTBOUND_QUEUE);
    let conn = Connection::new(out_tx);
    let realtime = app.realtime();

    realtime.sessions.insert(session_id.clone(), conn.clone());
    app.metrics().ws_sessions_active.inc(&[]);
    tracing::info!("client connected");

    let res = session_loop(&app, &session_id, conn, out_rx, socket).await;

    realtime.groups.cleanup_session(&session_id);
    app.metrics().ws_sessions_active.dec(&[]);
    realtime.sessions.remove(&session_id);
    tracing::info!("client disconnected");
    res
}

async fn session_loop(
    app: &AppState,
    session_id: &str,
    conn: Connection,
    mut out_rx: mpsc::Receiver<Message>,
    socket: WebSocket,
) -> Result<()> {
    let ctx = Arc::new(SessionCtx::new(session_id, app.realtime()));

    // Initial fetch completes here, ahead of any client `send`; the delivery
    // task needs the loop below to read the client's ack.
    let _initial = app.relay().on_connect(Arc::clone(&ctx)).await;

    let (mut ws_tx, mut ws_rx) = socket.split();

    let server = &app.cfg().server;
    let ping_every = Duration::from_millis(server.ping_interval_ms);
    let idle_timeout = Duration::from_millis(server.idle_timeout_ms);
    let max_frame_bytes = server.max_frame_bytes;

    let mut ping_tick = tokio::time::interval(ping_every);
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                let Some(m) = maybe_out else { break; };
                match tokio::time::timeout(idle_timeout, ws_tx.send(m)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(_)) => break,
                    Err(_) => {
                        tracing::info!("client stopped reading");
                        break;
                    }
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(Ok(msg)) = incoming else { break; };
                last_activity = Instant::now();

                match decode(msg, max_frame_bytes) {
                    Ok(Inbound::Event(frame)) if frame.event == EVENT_ACK => {
                        resolve_ack(&conn, &frame);
                    }
                    Ok(Inbound::Event(frame)) => {
                        spawn_event(app, Arc::clone(&ctx), frame);
                    }
                    Ok(Inbound::Ping(payload)) => {
                        push_control(&conn, Message::Pong(payload));
                    }
                    Ok(Inbound::Pong) => {}
                    Ok(Inbound::Close) => break,
                    Err(e) => {
                        app.metrics().frame_errors.inc(&[("code", e.client_code().as_str())]);
                        tracing::debug!(error = %e, "rejected frame");
                        push_error(&conn, &e);
                    }
                }
            }

            _ = ping_tick.tick() => {
                push_control(&conn, Message::Ping(Vec::new()));
            }

            // idle timeout
            _ = tokio::time::sleep(Duration::from_millis(250)) => {
                if last_activity.elapsed() >= idle_timeout {
                    tracing::info!("idle timeout");
                    let _ = ws_tx
                        .send(Message::Text(OutFrame::error(TallyError::Timeout.client_code(), "idle timeout").to_json()?))
                        .await;
                    break;
                }
            }
        }
    }

    Ok(())
}

// The loop is the queue's only drainer, so it must never wait on the queue.
fn push_control(conn: &Connection, msg: Message) {
    if !conn.try_push(msg) {
        tracing::debug!("outbound queue full, control frame dropped");
    }
}

fn push_error(conn: &Connection, err: &TallyError) {
    match OutFrame::error(err.client_code(), &err.to_string()).to_json() {
        Ok(text) => push_control(conn, Message::Text(text)),
        Err(e) => tracing::error!(error = %e, "error frame encode failed"),
    }
}

fn resolve_ack(conn: &Connection, frame: &Frame) {
    match frame.id {
        Some(id) if conn.acks.resolve(id) => {}
        Some(id) => tracing::debug!(id, "ack for unknown or expired id"),
        None => tracing::debug!("ack without id"),
    }
}

fn spawn_event(app: &AppState, ctx: Arc<SessionCtx>, frame: Frame) {
    let dispatcher = app.dispatcher();
    let metrics = app.metrics();
    tokio::spawn(
        async move {
            let id = frame.id;
            match dispatcher.dispatch(Arc::clone(&ctx), frame).await {
                Ok(reply) => {
                    if let Some(id) = id {
                        if let Err(e) = ctx.reply(id, reply).await {
                            tracing::debug!(id, error = %e, "reply dropped");
                        }
                    }
                }
                Err(e) => {
                    metrics.frame_errors.inc(&[("code", e.client_code().as_str())]);
                    let _ = ctx.send_error(&e).await;
                }
            }
        }
        .in_current_span(),
    );
}
