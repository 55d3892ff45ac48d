use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use wordrank_room::{ClientEvent, GuessError, Room, RoomRegistry, ServerEvent};

/// Handle one TCP connection for the lifetime of the socket (§4.5 "Session
/// Router"). Each connection is line-delimited JSON in both directions: one
/// [`ClientEvent`] per inbound line, one [`ServerEvent`] per outbound line.
///
/// A session may join at most one room at a time; joining a new room
/// implicitly leaves the previous one. The room's broadcast channel is
/// forwarded to the socket by a background task for as long as the session
/// stays joined.
pub async fn handle_connection(stream: TcpStream, registry: Arc<RoomRegistry>) -> Result<()> {
    stream.set_nodelay(true).ok();
    let (read_half, write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let writer = Arc::new(Mutex::new(write_half));

    let session_id = uuid::Uuid::new_v4().to_string();
    let mut current_room: Option<Arc<Room>> = None;
    let mut forward_handle: Option<JoinHandle<()>> = None;
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let event: ClientEvent = match serde_json::from_str(trimmed) {
            Ok(event) => event,
            Err(err) => {
                warn!(?err, session_id = %session_id, "malformed client event");
                let _ = send_event(&writer, &ServerEvent::guess_error(GuessError::MalformedGuess)).await;
                continue;
            }
        };

        match event {
            ClientEvent::JoinRoom { room_id, player_name } => {
                if let Some(old_room) = current_room.take() {
                    old_room.leave(&session_id).await;
                    registry.drop_if_empty(old_room.id()).await;
                }
                if let Some(handle) = forward_handle.take() {
                    handle.abort();
                }

                let room = registry.get_or_create(&room_id).await;
                info!(session_id = %session_id, room_id = %room.id(), player_name, "session joined room");
                let (view, loading) = room.join(session_id.clone(), player_name, None).await;
                if let Some(loading) = loading {
                    if send_event(&writer, &loading).await.is_err() {
                        break;
                    }
                }
                if send_event(&writer, &ServerEvent::RoomState(view)).await.is_err() {
                    break;
                }

                forward_handle = Some(spawn_forwarder(room.subscribe(), Arc::clone(&writer)));
                current_room = Some(room);
            }
            ClientEvent::MakeGuess { room_id, player_name, guess } => {
                let outcome = match joined_room(&current_room, &room_id) {
                    Some(room) => room.submit_guess(&player_name, &guess).await,
                    None => Err(GuessError::UnknownRoom),
                };
                if let Err(err) = outcome {
                    if send_event(&writer, &ServerEvent::guess_error(err)).await.is_err() {
                        break;
                    }
                }
            }
            ClientEvent::RequestHint { room_id, player_name } => {
                let outcome = match joined_room(&current_room, &room_id) {
                    Some(room) => room.request_hint(&player_name).await,
                    None => Err(GuessError::UnknownRoom),
                };
                if let Err(err) = outcome {
                    if send_event(&writer, &ServerEvent::guess_error(err)).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    if let Some(handle) = forward_handle.take() {
        handle.abort();
    }
    if let Some(room) = current_room.take() {
        room.leave(&session_id).await;
        registry.drop_if_empty(room.id()).await;
        info!(session_id = %session_id, room_id = %room.id(), "session disconnected");
    }

    Ok(())
}

/// Returns the session's current room, but only if it matches `room_id`
/// (case-insensitively, matching [`RoomRegistry`]'s lowercasing) — a
/// session may only guess or request a hint in the room it actually
/// joined (§7 "Unknown room").
fn joined_room<'a>(current_room: &'a Option<Arc<Room>>, room_id: &str) -> Option<&'a Arc<Room>> {
    current_room
        .as_ref()
        .filter(|room| room.id() == room_id.to_lowercase())
}

fn spawn_forwarder(
    mut rx: broadcast::Receiver<ServerEvent>,
    writer: Arc<Mutex<OwnedWriteHalf>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if send_event(&writer, &event).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "session lagged behind room broadcast");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn send_event(writer: &Arc<Mutex<OwnedWriteHalf>>, event: &ServerEvent) -> Result<()> {
    let mut encoded = serde_json::to_string(event)?;
    encoded.push('\n');
    let mut guard = writer.lock().await;
    guard.write_all(encoded.as_bytes()).await?;
    guard.flush().await?;
    Ok(())
}
