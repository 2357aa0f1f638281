use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;

use crate::error::ElectionError;
use crate::message::Message;
use crate::protocol::ElectionProtocol;

/// Startup synchronisation delay before the starter worker may fire.
const STARTER_DELAY: Duration = Duration::from_millis(100);

/// Listener receive timeout; on elapse it simply re-loops, giving the
/// termination predicate a chance to flip.
const RECV_TIMEOUT: Duration = Duration::from_secs(1);

const MAX_DATAGRAM: usize = 1024;

/// Run one peer to completion: binds its socket, then runs the starter and
/// listener workers concurrently (the `tokio::task` analogue of the
/// source's `starter_thread`/`listen_thread` pair joined in `Node.run`).
pub async fn run_peer(protocol: Arc<dyn ElectionProtocol>) -> Result<(), ElectionError> {
    let state = protocol.state();
    let bind_addr = (std::net::Ipv4Addr::LOCALHOST, state.base_port + state.id as u16);
    let socket = UdpSocket::bind(bind_addr).await.map_err(ElectionError::Bind)?;

    let starter_protocol = Arc::clone(&protocol);
    let starter_handle = tokio::spawn(async move { starter(starter_protocol).await });

    let listener_protocol = Arc::clone(&protocol);
    let listener_handle = tokio::spawn(async move { listen(listener_protocol, socket).await });

    let (starter_result, listener_result) = tokio::join!(starter_handle, listener_handle);
    starter_result.map_err(ElectionError::Join)?;
    listener_result.map_err(ElectionError::Join)?
}

async fn starter(protocol: Arc<dyn ElectionProtocol>) {
    tokio::time::sleep(STARTER_DELAY).await;
    if protocol.state().is_starter {
        protocol.start_election().await;
    }
}

async fn listen(protocol: Arc<dyn ElectionProtocol>, socket: UdpSocket) -> Result<(), ElectionError> {
    let mut buf = [0u8; MAX_DATAGRAM];

    while protocol.state().should_keep_listening() {
        match tokio::time::timeout(RECV_TIMEOUT, socket.recv_from(&mut buf)).await {
            Ok(Ok((len, _addr))) => {
                let text = String::from_utf8_lossy(&buf[..len]).into_owned();
                match Message::decode(&text) {
                    Ok(Message::Exit) => {
                        tracing::debug!(id = protocol.state().id, "received exit");
                        return Ok(());
                    }
                    Ok(msg) => {
                        tracing::debug!(id = protocol.state().id, ?msg, "received");
                        protocol.clone().handle_message(msg).await;
                    }
                    Err(err) => {
                        tracing::debug!(id = protocol.state().id, %err, "discarding malformed datagram");
                    }
                }
            }
            Ok(Err(err)) => return Err(ElectionError::Recv(err)),
            Err(_elapsed) => {
                // Receive timeout: expected control-flow signal, not an error.
            }
        }
    }

    let state = protocol.state();
    let sent = state.message_count.load(Ordering::Relaxed);
    let limit = state.num_nodes.saturating_mul(state.num_nodes);
    if sent > limit {
        tracing::warn!(id = state.id, sent, limit, "message storm fuse tripped");
        return Err(ElectionError::MessageStorm { sent, limit });
    }
    Ok(())
}
