use std::net::SocketAddr;

use axum::{
    extract::{
        ConnectInfo, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::Receiver;
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    ws::{
        room::BoardRoom,
        types::{BoardUpdate, WireMessage},
    },
};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Response, AppError> {
    if state.room.get_connection_count() >= state.config.board.max_clients {
        tracing::warn!(%addr, "Rejecting connection, board full");
        return Err(AppError::RoomFull);
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, addr)))
}

async fn handle_socket(socket: WebSocket, state: AppState, addr: SocketAddr) {
    let client_id = Uuid::new_v4().to_string();
    tracing::info!(%addr, %client_id, "WebSocket connection");

    let room = &state.room;
    let receiver = match room.subscribe() {
        Some(value) => value,
        None => {
            tracing::warn!(%client_id, "Board full");
            return;
        }
    };

    handle_connection(socket, room, receiver, &client_id).await;

    room.unsubscribe();
    room.broadcast_users();

    tracing::info!(%client_id, "WebSocket disconnected");
}

async fn send_message(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    message: &WireMessage,
) -> bool {
    match message.to_json() {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to serialize update: {e}");
            true
        }
    }
}

async fn handle_connection(
    socket: WebSocket,
    room: &BoardRoom,
    mut board_receiver: Receiver<BoardUpdate>,
    client_id: &str,
) {
    let (mut sender, mut receiver) = socket.split();

    let initialization = room.initialization(client_id).await;
    if !send_message(&mut sender, &initialization).await {
        return;
    }
    room.broadcast_users();

    loop {
        tokio::select! {
            // Handle incoming messages
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let applied = match WireMessage::parse(&text) {
                            Ok(message) => room.apply_client_message(client_id, message).await,
                            Err(e) => Err(e),
                        };
                        if let Err(e) = applied {
                            tracing::warn!(%client_id, error = %e, "Dropping client message");
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {e}");
                        break;
                    }
                    _ => {}
                }
            }

            // Handle broadcasts
            update = room.next_for(&mut board_receiver, client_id) => {
                match update {
                    Some(message) => {
                        if !send_message(&mut sender, &message).await {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }
}
