use crate::error::ClientError;
use crate::packet::*;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Sends `query` to `server` and waits for the one response that answers it.
///
/// The socket lives only for the duration of this call. Replies that are not
/// responses or carry another transaction ID are skipped against the same
/// `timeout`. A datagram that does not decode is an error: the socket is
/// connected, so only the resolver can have sent it.
pub fn exchange(server: SocketAddr, query: &Packet, timeout: Duration) -> Result<Packet, ClientError> {
    let bytes = query.serialize()?;

    let local: SocketAddr = if server.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(local)?;
    socket.connect(server)?;
    socket.send(&bytes)?;
    debug!(%server, id = query.header.id, len = bytes.len(), "query sent");

    let response = receive_answer(&socket, query.header.id, Instant::now() + timeout)?
        .ok_or(ClientError::NoResponse { server, timeout })?;

    let header = &response.header;
    info!(
        id = header.id,
        rcode = %header.rcode,
        answers = response.answers.len(),
        authorities = response.authorities.len(),
        additionals = response.additionals.len(),
        "response received"
    );
    if header.tc {
        warn!("response is truncated");
    }
    if header.rcode != RCode::NoError {
        warn!(rcode = %header.rcode, "resolver reported an error");
    }

    Ok(response)
}

fn receive_answer(socket: &UdpSocket, id: u16, deadline: Instant) -> Result<Option<Packet>, ClientError> {
    let mut bytes = vec![0; MAX_PACKET_SIZE];
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(None);
        }
        socket.set_read_timeout(Some(remaining))?;

        let len = match socket.recv(&mut bytes) {
            Ok(len) => len,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Ok(None)
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        let packet = Packet::parse(&bytes[..len]).map_err(|error| {
            warn!(%error, len, "response does not decode");
            error
        })?;
        if !packet.header.qr || packet.header.id != id {
            debug!(
                id = packet.header.id,
                qr = packet.header.qr,
                "skipping datagram that does not answer the query"
            );
            continue;
        }

        return Ok(Some(packet));
    }
}

/// One record per line, in answer order.
pub fn render_answers(answers: &[Record]) -> String {
    answers.iter().map(|a| format!("{}\n", a)).collect()
}
