//! Control-stream framing: `VarInt(type) || U16(payloadLength) || payload`
//! over a generic bidirectional byte stream (§4.8).
//!
//! Grounded on the teacher's `MessageDecoder` (moqt
//! `data_plane/codec/message_decoder.rs`) for the header-then-length-then-
//! payload validation shape — that decoder peeks the type tag and payload
//! length via a `Cursor` before deciding whether the full message is
//! present, exactly the checkpoint/restore dance used below — and on
//! `ControlMessageReceiveThread` (moqt
//! `control_plane/threads/control_message_receive_thread.rs`) for the
//! spawned single-task ingest loop that logs and forwards via a channel
//! rather than returning errors to its caller. Unlike the teacher, which
//! plugs `MessageDecoder` into a `tokio_util::codec::Decoder` consumed by a
//! framed stream, this core hand-rolls the loop directly: the partial-read /
//! timeout / closure state machine in §4.8 has observable behaviour at each
//! step that a generic `Decoder` doesn't surface (DESIGN.md has the
//! tradeoff).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, WriteHalf};
use tokio::sync::{mpsc, Mutex, Notify};

use crate::byte_buffer::ByteBuffer;
use crate::error::{CoreError, CoreResult};

const READ_CHUNK_SIZE: usize = 4096;

/// A message this stream knows how to frame: a leading type tag plus a
/// payload the concrete message serialises itself.
pub trait ControlMessage: Sized + Send + 'static {
    fn type_tag(&self) -> u64;
    fn encode_payload(&self, buf: &mut ByteBuffer);
    fn decode_payload(type_tag: u64, buf: &mut ByteBuffer) -> CoreResult<Self>;
}

type SentCallback<M> = Arc<dyn Fn(&M) + Send + Sync>;
type ReceivedCallback<M> = Arc<dyn Fn(&M) + Send + Sync>;

pub struct ControlStream<S, M: ControlMessage> {
    writer: Mutex<WriteHalf<S>>,
    outward: Mutex<mpsc::UnboundedReceiver<CoreResult<M>>>,
    ingest_task: tokio::task::JoinHandle<()>,
    cancel: Arc<Notify>,
    closed: Arc<AtomicBool>,
    on_sent: Option<SentCallback<M>>,
}

impl<S, M> ControlStream<S, M>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    M: ControlMessage,
{
    /// Constructs the framer and immediately starts its ingest task (§4.8).
    pub fn new(
        bidi: S,
        partial_message_timeout: Option<Duration>,
        on_sent: Option<SentCallback<M>>,
        on_received: Option<ReceivedCallback<M>>,
    ) -> Self {
        let (read_half, write_half) = tokio::io::split(bidi);
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = Arc::new(Notify::new());
        let closed = Arc::new(AtomicBool::new(false));

        let ingest_task = tokio::spawn(ingest_loop(
            read_half,
            tx,
            partial_message_timeout,
            on_received,
            cancel.clone(),
        ));

        Self {
            writer: Mutex::new(write_half),
            outward: Mutex::new(rx),
            ingest_task,
            cancel,
            closed,
            on_sent,
        }
    }

    /// Pulls the next decoded message, or `None` once the outward stream has
    /// closed (gracefully or after a fatal error already delivered).
    pub async fn recv(&self) -> Option<CoreResult<M>> {
        self.outward.lock().await.recv().await
    }

    /// Serialises and writes `msg` atomically, then notifies `on_sent`. A
    /// write failure closes both halves and fails with
    /// `Termination(INTERNAL_ERROR)` (§4.8).
    pub async fn send(&self, msg: &M) -> CoreResult<()> {
        let mut payload_buf = ByteBuffer::new();
        msg.encode_payload(&mut payload_buf);
        let payload = payload_buf.into_frozen();
        let payload_bytes = payload.as_slice();
        if payload_bytes.len() > u16::MAX as usize {
            return Err(CoreError::invalid_type("payload exceeds u16 length prefix"));
        }

        let mut frame_buf = ByteBuffer::new();
        frame_buf.put_vi(msg.type_tag());
        frame_buf.put_u16(payload_bytes.len() as u16);
        frame_buf.put_bytes(payload_bytes);
        let frame = frame_buf.into_frozen();

        let mut writer = self.writer.lock().await;
        let result = writer.write_all(frame.as_slice()).await;
        drop(writer);

        match result {
            Ok(()) => {
                if let Some(cb) = &self.on_sent {
                    cb(msg);
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!("control stream write failed: {e}");
                self.close().await;
                Err(CoreError::internal_error(format!("write failed: {e}")))
            }
        }
    }

    /// Concurrently closes the writer and cancels the reader; idempotent,
    /// swallows individual shutdown errors (§4.8, §5).
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.cancel.notify_waiters();
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.shutdown().await {
            tracing::warn!("error shutting down control stream writer: {e}");
        }
    }
}

impl<S, M: ControlMessage> Drop for ControlStream<S, M> {
    fn drop(&mut self) {
        self.ingest_task.abort();
    }
}

async fn read_chunk<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Option<Duration>,
) -> CoreResult<Option<Vec<u8>>> {
    let mut scratch = vec![0u8; READ_CHUNK_SIZE];
    let read_future = reader.read(&mut scratch);
    let n = match timeout {
        Some(duration) => match tokio::time::timeout(duration, read_future).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(CoreError::internal_error(format!("read failed: {e}"))),
            Err(_elapsed) => return Err(CoreError::Timeout),
        },
        None => read_future
            .await
            .map_err(|e| CoreError::internal_error(format!("read failed: {e}")))?,
    };
    if n == 0 {
        Ok(None)
    } else {
        scratch.truncate(n);
        Ok(Some(scratch))
    }
}

/// Peeks the leading `VarInt(type) || U16(len)` header without consuming it
/// permanently, returning `(type_tag, payload_len, header_size)`.
fn peek_header(buf: &mut ByteBuffer) -> CoreResult<(u64, u16, usize)> {
    let before = buf.length();
    buf.checkpoint();
    let header = (|| -> CoreResult<(u64, u16)> {
        let type_tag = buf.get_vi()?;
        let payload_len = buf.get_u16()?;
        Ok((type_tag, payload_len))
    })();
    let after = buf.length();
    buf.restore();
    buf.commit();
    header.map(|(type_tag, payload_len)| (type_tag, payload_len, before - after))
}

async fn ingest_loop<R, M>(
    mut reader: R,
    outward: mpsc::UnboundedSender<CoreResult<M>>,
    partial_message_timeout: Option<Duration>,
    on_received: Option<ReceivedCallback<M>>,
    cancel: Arc<Notify>,
) where
    R: AsyncRead + Unpin,
    M: ControlMessage,
{
    let mut buf = ByteBuffer::new();
    let mut expected_payload_length: Option<u16> = None;

    loop {
        if buf.is_empty() {
            let chunk = tokio::select! {
                _ = cancel.notified() => return,
                chunk = read_chunk(&mut reader, None) => chunk,
            };
            match chunk {
                Ok(Some(bytes)) => buf.put_bytes(&bytes),
                Ok(None) => {
                    if expected_payload_length.is_none() {
                        return; // graceful close, empty buffer, nothing pending
                    }
                    let _ = outward.send(Err(CoreError::protocol_violation(
                        "incomplete message data",
                    )));
                    return;
                }
                Err(e) => {
                    let _ = outward.send(Err(e));
                    return;
                }
            }
        }

        match peek_header(&mut buf) {
            Ok((type_tag, payload_len, header_size)) => {
                let total_size = header_size + payload_len as usize;
                if buf.length() >= total_size {
                    buf.checkpoint();
                    let _ = buf.get_vi();
                    let _ = buf.get_u16();
                    let payload = match buf.get_bytes(payload_len as usize) {
                        Ok(p) => p,
                        Err(e) => {
                            let _ = outward.send(Err(e));
                            return;
                        }
                    };
                    buf.commit();
                    buf.compact();
                    expected_payload_length = None;

                    let mut payload_buf = ByteBuffer::from_vec(payload);
                    match M::decode_payload(type_tag, &mut payload_buf) {
                        Ok(message) => {
                            if let Some(cb) = &on_received {
                                cb(&message);
                            }
                            if outward.send(Ok(message)).is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            tracing::error!("control message decode failed: {e}");
                            let _ = outward.send(Err(CoreError::protocol_violation(e.to_string())));
                            return;
                        }
                    }
                } else {
                    expected_payload_length = Some(payload_len);
                    match await_more(&mut reader, partial_message_timeout, &cancel).await {
                        Ok(Some(bytes)) => buf.put_bytes(&bytes),
                        Ok(None) => {
                            let _ = outward.send(Err(CoreError::protocol_violation(
                                "incomplete message data",
                            )));
                            return;
                        }
                        Err(e) => {
                            let _ = outward.send(Err(e));
                            return;
                        }
                    }
                }
            }
            Err(CoreError::NotEnoughBytes) => {
                match await_more(&mut reader, partial_message_timeout, &cancel).await {
                    Ok(Some(bytes)) => buf.put_bytes(&bytes),
                    Ok(None) => {
                        if expected_payload_length.is_none() && buf.is_empty() {
                            return;
                        }
                        let _ = outward.send(Err(CoreError::protocol_violation(
                            "incomplete message data",
                        )));
                        return;
                    }
                    Err(e) => {
                        let _ = outward.send(Err(e));
                        return;
                    }
                }
            }
            Err(e) => {
                let _ = outward.send(Err(e));
                return;
            }
        }
    }
}

async fn await_more<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Option<Duration>,
    cancel: &Notify,
) -> CoreResult<Option<Vec<u8>>> {
    tokio::select! {
        _ = cancel.notified() => Ok(None),
        chunk = read_chunk(reader, timeout) => chunk,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_buffer::ByteBuffer;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Ping(u64);

    impl ControlMessage for Ping {
        fn type_tag(&self) -> u64 {
            0x01
        }

        fn encode_payload(&self, buf: &mut ByteBuffer) {
            buf.put_vi(self.0);
        }

        fn decode_payload(type_tag: u64, buf: &mut ByteBuffer) -> CoreResult<Self> {
            if type_tag != 0x01 {
                return Err(CoreError::invalid_type(format!("unexpected tag {type_tag:#x}")));
            }
            Ok(Ping(buf.get_vi()?))
        }
    }

    #[tokio::test]
    async fn control_round_trip_over_duplex() {
        let (client, server) = tokio::io::duplex(4096);
        let client_stream: ControlStream<_, Ping> = ControlStream::new(client, None, None, None);
        let server_stream: ControlStream<_, Ping> = ControlStream::new(server, None, None, None);

        client_stream.send(&Ping(42)).await.unwrap();
        let received = server_stream.recv().await.unwrap().unwrap();
        assert_eq!(received, Ping(42));
    }

    #[tokio::test(start_paused = true)]
    async fn partial_message_times_out() {
        let (client, server) = tokio::io::duplex(4096);
        let server_stream: ControlStream<_, Ping> =
            ControlStream::new(server, Some(Duration::from_secs(3)), None, None);

        // Write only a header claiming a payload that never arrives.
        let mut header = ByteBuffer::new();
        header.put_vi(0x01);
        header.put_u16(4);
        let frame = header.into_frozen();
        let mut client = client;
        client.write_all(frame.as_slice()).await.unwrap();

        tokio::time::advance(Duration::from_secs(4)).await;
        let result = server_stream.recv().await.unwrap();
        assert!(matches!(result, Err(CoreError::Timeout)));
    }

    #[tokio::test]
    async fn graceful_close_with_empty_buffer_ends_outward_stream() {
        let (client, server) = tokio::io::duplex(4096);
        let server_stream: ControlStream<_, Ping> = ControlStream::new(server, None, None, None);
        drop(client);
        assert!(server_stream.recv().await.is_none());
    }
}
