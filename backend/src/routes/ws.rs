use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};

use crate::{
    constants::LAGGED_MESSAGE,
    gateway::{Gateway, Session},
    models::event::{ClientEvent, ServerEvent},
    rooms::Subscriber,
    state::AppState,
    store::AuctionStore,
};

pub async fn ws_route_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| websocket_handler(socket, state))
}

fn encode(event: &ServerEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(text) => Some(Message::Text(text)),
        Err(e) => {
            tracing::error!(event = event.name(), error = %e, "Failed to encode event");
            None
        }
    }
}

/// Decodes one inbound text frame and hands it to the gateway. A frame that
/// does not decode is answered privately with `malformed message`.
pub(crate) fn handle_text<S: AuctionStore>(
    gateway: &Gateway<S>,
    session: &mut Session,
    text: &str,
) {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => gateway.dispatch(session, event),
        Err(e) => {
            tracing::debug!(
                connection = session.subscriber().id(),
                error = %e,
                "Malformed frame"
            );
            session
                .subscriber()
                .send(ServerEvent::malformed(e.to_string()));
        }
    }
}

/// Frames written for one queued event. Once the subscriber has lagged the
/// event is followed by a `connection lagged` notice and a close frame.
pub(crate) fn outbound_frames(event: &ServerEvent, lagged: bool) -> Vec<Message> {
    let mut frames: Vec<Message> = encode(event).into_iter().collect();
    if lagged {
        frames.extend(encode(&ServerEvent::error(LAGGED_MESSAGE, None)));
        frames.push(Message::Close(None));
    }
    frames
}

/// Runs one connection: inbound frames become gateway events, queued
/// outbound events are written back in order.
async fn websocket_handler(socket: WebSocket, state: Arc<AppState>) {
    let id = state.next_connection_id();
    let (subscriber, mut outbound) = Subscriber::new(id, state.config.outbound_buffer);
    let mut session = Session::new(subscriber);
    let (mut sender, mut receiver) = socket.split();
    tracing::info!(connection = id, "Client connected");

    'conn: loop {
        tokio::select! {
            inbound = receiver.next() => match inbound {
                Some(Ok(Message::Text(text))) => handle_text(&state.gateway, &mut session, &text),
                Some(Ok(Message::Close(_))) | None => break,
                // Pings are answered by axum, binary frames are not part of the protocol.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(connection = id, error = %e, "Socket read failed");
                    break;
                }
            },
            Some(event) = outbound.recv() => {
                let lagged = session.subscriber().is_lagged();
                for frame in outbound_frames(&event, lagged) {
                    if sender.send(frame).await.is_err() {
                        break 'conn;
                    }
                }
                if lagged {
                    tracing::info!(connection = id, "Closing lagged connection");
                    break;
                }
            }
        }
    }

    state.gateway.disconnect(session);
    tracing::info!(connection = id, "Client disconnected");
}
