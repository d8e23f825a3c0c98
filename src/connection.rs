// ABOUTME: Provides TCP connection management for SMPP v3.4 protocol communication
// ABOUTME: Implements frame-based I/O with buffering for optimal network performance

use crate::codec::{CodecError, Encodable, Frame, PduHeader, PduRegistry};
use bytes::{Buf, BytesMut};
use std::io;
use std::io::Cursor;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;

/// Transport-layer errors for a single `Connection`.
///
/// This is distinct from the session-level [`crate::error::Error`]: it only
/// describes what can go wrong moving bytes on and off the wire. The session
/// module is responsible for turning an `EOF`/`IncompleteFrame` into the
/// right state transition.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("connection closed with incomplete frame")]
    IncompleteFrame,
}

/// SMPP v3.4 transport-layer connection.
///
/// `Connection` owns the TCP socket and the read/write buffering needed to
/// turn it into a stream of [`Frame`] values. It does not know about bind
/// state, sequence numbers, or keep-alive: that is [`crate::session::Session`]'s
/// job. Splitting the two lets the same `Connection` type back both the
/// client and the server acceptor.
///
/// ## SMPP v3.4 Session States (Section 2.1)
///
/// An SMPP session progresses through the following states:
///
/// ```text
/// CLOSED → OPEN → BOUND_TX/BOUND_RX/BOUND_TRX → UNBINDING → CLOSED
/// ```
///
/// See [`crate::session`] for the state machine that drives these
/// transitions on top of this transport.
#[derive(Debug)]
pub struct Connection {
    stream: BufWriter<TcpStream>,
    buffer: BytesMut,
    registry: PduRegistry,
}

impl Connection {
    /// Create a new `Connection`, backed by `socket`. Read and write buffers
    /// are initialized.
    pub fn new(socket: TcpStream) -> Connection {
        Connection {
            stream: BufWriter::new(socket),
            buffer: BytesMut::with_capacity(4 * 1024),
            registry: PduRegistry::new(),
        }
    }

    /// Read a single `Frame` value from the underlying stream.
    ///
    /// Waits until enough data has been buffered to parse a frame. Any data
    /// remaining in the read buffer after a frame is parsed is kept for the
    /// next call. Returns `Ok(None)` on a clean peer shutdown.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>, ConnectionError> {
        loop {
            if let Some(frame) = self.try_parse_frame()? {
                return Ok(Some(frame));
            }

            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                return if self.buffer.is_empty() {
                    Ok(None)
                } else {
                    Err(ConnectionError::IncompleteFrame)
                };
            }
        }
    }

    fn try_parse_frame(&mut self) -> Result<Option<Frame>, ConnectionError> {
        let mut buf = Cursor::new(&self.buffer[..]);
        if buf.remaining() < PduHeader::SIZE {
            return Ok(None);
        }

        let header = PduHeader::decode(&mut buf)?;
        let body_size = header.command_length as usize - PduHeader::SIZE;
        if buf.remaining() < body_size {
            return Ok(None);
        }

        buf.set_position(0);
        let header = PduHeader::decode(&mut buf)?;
        let frame = self.registry.decode_pdu(header, &mut buf)?;
        self.buffer.advance(header.command_length as usize);
        Ok(Some(frame))
    }

    /// Encode and write a single PDU directly, bypassing the `Frame` enum.
    pub async fn write_pdu<T: Encodable>(&mut self, pdu: &T) -> Result<(), ConnectionError> {
        let mut buf = BytesMut::with_capacity(pdu.encoded_size());
        pdu.encode(&mut buf)?;
        self.stream.write_all(&buf).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Write a single `Frame` value to the underlying stream.
    pub async fn write_frame(&mut self, frame: &Frame) -> Result<(), ConnectionError> {
        match frame {
            Frame::BindTransmitter(pdu) => self.write_pdu(pdu.as_ref()).await,
            Frame::BindReceiver(pdu) => self.write_pdu(pdu.as_ref()).await,
            Frame::BindTransceiver(pdu) => self.write_pdu(pdu.as_ref()).await,
            Frame::SubmitSm(pdu) => self.write_pdu(pdu.as_ref()).await,
            Frame::DeliverSm(pdu) => self.write_pdu(pdu.as_ref()).await,
            Frame::EnquireLink(pdu) => self.write_pdu(pdu).await,
            Frame::Unbind(pdu) => self.write_pdu(pdu).await,
            Frame::BindTransmitterResp(pdu) => self.write_pdu(pdu).await,
            Frame::BindReceiverResp(pdu) => self.write_pdu(pdu).await,
            Frame::BindTransceiverResp(pdu) => self.write_pdu(pdu).await,
            Frame::SubmitSmResp(pdu) => self.write_pdu(pdu).await,
            Frame::DeliverSmResp(pdu) => self.write_pdu(pdu).await,
            Frame::EnquireLinkResp(pdu) => self.write_pdu(pdu).await,
            Frame::UnbindResp(pdu) => self.write_pdu(pdu).await,
            Frame::GenericNack(pdu) => self.write_pdu(pdu).await,
            Frame::Outbind(pdu) => self.write_pdu(pdu).await,
            Frame::Unknown { header, body } => {
                let mut buf = BytesMut::with_capacity(header.command_length as usize);
                header.encode(&mut buf)?;
                buf.extend_from_slice(body);
                self.stream.write_all(&buf).await?;
                self.stream.flush().await?;
                Ok(())
            }
        }
    }

    /// Mutable access to the PDU registry backing this connection's decoder,
    /// e.g. to register additional vendor PDUs before reading.
    pub fn registry_mut(&mut self) -> &mut PduRegistry {
        &mut self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::{EnquireLink, EnquireLinkResponse};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_connection_roundtrip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut conn = Connection::new(socket);
            match conn.read_frame().await.unwrap().unwrap() {
                Frame::EnquireLink(req) => {
                    let resp = EnquireLinkResponse::new(req.sequence_number);
                    conn.write_pdu(&resp).await.unwrap();
                }
                other => panic!("unexpected frame: {other:?}"),
            }
        });

        let socket = TcpStream::connect(addr).await.unwrap();
        let mut conn = Connection::new(socket);
        conn.write_pdu(&EnquireLink::new(42)).await.unwrap();

        match conn.read_frame().await.unwrap().unwrap() {
            Frame::EnquireLinkResp(resp) => assert_eq!(resp.sequence_number, 42),
            other => panic!("unexpected frame: {other:?}"),
        }

        server.await.unwrap();
    }
}
