//! IRC message codec for tokio.
//!
//! Wraps [`LineCodec`] and parses lines into [`Message`] types.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error;
use crate::line::LineCodec;
use crate::message::Message;

/// Tokio codec for encoding/decoding IRC messages.
#[derive(Default)]
pub struct IrcCodec {
    inner: LineCodec,
}

impl IrcCodec {
    /// Create a new codec.
    pub fn new() -> Self {
        Self {
            inner: LineCodec::new(),
        }
    }
}

impl Decoder for IrcCodec {
    type Item = Message;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Message>> {
        self.inner
            .decode(src)
            .and_then(|res| res.map_or(Ok(None), |line| line.parse::<Message>().map(Some)))
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> error::Result<()> {
        self.inner.encode(msg.to_string(), dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;

    #[test]
    fn decodes_messages_across_reads() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from(":a!b@c PRIVMSG #chat :hi\r\nPING :tok");
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.command, Command::PRIVMSG("#chat".into(), "hi".into()));
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"\r\n");
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.command, Command::PING("tok".into(), None));
    }

    #[test]
    fn encodes_with_crlf() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(Message::join("#chat"), &mut buf).unwrap();
        assert_eq!(&buf[..], b"JOIN #chat\r\n");
    }
}
