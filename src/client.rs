//! Transport glue between the TCP connection and the session.
//!
//! Architecture follows a handshake-then-unified-loop shape: the connection
//! is established and the session primed, then a single `tokio::select!`
//! loop interleaves inbound frames with outbound messages queued by the
//! session. Inbound messages are translated into the session's closed
//! [`Event`] set; PING is answered here and never surfaces as an event.

use futures_util::{SinkExt, StreamExt};
use linkbot_proto::{Command, IrcCodec, Message, ProtocolError, response};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::SessionError;
use crate::logger::ActivityLog;
use crate::session::{Event, Session};

/// Outbound queue depth. The session emits at most a handful of messages
/// per inbound event.
const OUTBOUND_QUEUE: usize = 64;

/// One live connection: framed socket plus the session driving it.
pub struct Connection {
    session: Session,
    framed: Framed<TcpStream, IrcCodec>,
    outbound: mpsc::Receiver<Message>,
}

impl Connection {
    /// Connect to the server and prepare a session.
    ///
    /// The activity log is opened here, before any handshake traffic, so
    /// an unopenable sink aborts the attempt as a startup failure. A TCP
    /// connect error is a [`SessionError::ConnectionFailed`], which the
    /// factory treats as fatal.
    pub async fn establish(config: &Config) -> Result<Self, SessionError> {
        let stream = TcpStream::connect((config.server.as_str(), config.port))
            .await
            .map_err(SessionError::ConnectionFailed)?;
        info!(server = %config.server, port = config.port, "connected");

        let log = ActivityLog::open(&config.log_path)?;
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE);
        let session = Session::new(
            config.nickname.clone(),
            config.channel.clone(),
            log,
            config.registry_path().map(Into::into),
            tx,
        );

        Ok(Self {
            session,
            framed: Framed::new(stream, IrcCodec::new()),
            outbound: rx,
        })
    }

    /// Drive the session until the connection drops.
    ///
    /// Returns [`SessionError::ConnectionLost`] when the server closes the
    /// stream; any other error is a session-fatal failure.
    pub async fn run(mut self) -> Result<(), SessionError> {
        self.session.handle_event(Event::Connected).await?;

        loop {
            tokio::select! {
                queued = self.outbound.recv() => {
                    // The sender lives in the session; it cannot close
                    // while the session is alive.
                    if let Some(msg) = queued {
                        self.framed
                            .send(msg)
                            .await
                            .map_err(|e| SessionError::ConnectionLost(e.to_string()))?;
                    }
                }
                inbound = self.framed.next() => match inbound {
                    Some(Ok(msg)) => {
                        if let Some(event) = self.translate(msg).await? {
                            let lost = matches!(event, Event::Disconnected { .. });
                            self.session.handle_event(event).await?;
                            if lost {
                                return Err(SessionError::ConnectionLost(
                                    "server terminated the connection".to_string(),
                                ));
                            }
                        }
                    }
                    Some(Err(ProtocolError::InvalidMessage { string, cause })) => {
                        // Malformed frames are the server's bug, not ours.
                        warn!(line = %string.trim_end(), error = %cause, "skipping unparseable line");
                    }
                    Some(Err(e)) => {
                        let reason = e.to_string();
                        self.session
                            .handle_event(Event::Disconnected { reason: reason.clone() })
                            .await?;
                        return Err(SessionError::ConnectionLost(reason));
                    }
                    None => {
                        self.session
                            .handle_event(Event::Disconnected {
                                reason: "connection closed by server".to_string(),
                            })
                            .await?;
                        return Err(SessionError::ConnectionLost(
                            "connection closed by server".to_string(),
                        ));
                    }
                },
            }
        }
    }

    /// Map an inbound message onto the session's event set.
    ///
    /// Returns `None` for traffic the session does not observe (PING,
    /// other users' joins, unrelated numerics).
    async fn translate(&mut self, msg: Message) -> Result<Option<Event>, SessionError> {
        if let Some(action) = msg.action_text() {
            return Ok(Some(Event::Action {
                sender: msg.source_string().unwrap_or_default(),
                text: action.to_string(),
            }));
        }

        let sender = msg.source_string();
        let source_nick = msg.source_nickname().map(str::to_owned);

        match msg.command {
            Command::PING(server, server2) => {
                self.framed
                    .send(Message::from_command(Command::PONG(server, server2)))
                    .await
                    .map_err(|e| SessionError::ConnectionLost(e.to_string()))?;
                Ok(None)
            }
            Command::Response(response::RPL_WELCOME, _) => Ok(Some(Event::Registered)),
            Command::Response(
                response::ERR_NICKNAMEINUSE | response::ERR_NICKCOLLISION,
                args,
            ) => {
                // ":server 433 * <rejected> :Nickname is already in use."
                let proposed = args
                    .get(1)
                    .cloned()
                    .unwrap_or_else(|| self.session.nickname().to_string());
                Ok(Some(Event::Collision { proposed }))
            }
            Command::JOIN(channel) if source_nick.as_deref() == Some(self.session.nickname()) => {
                Ok(Some(Event::Joined { channel }))
            }
            Command::PRIVMSG(target, text) => Ok(Some(Event::Message {
                sender: sender.unwrap_or_default(),
                target,
                text,
            })),
            Command::NICK(new) => Ok(Some(Event::NickChanged {
                old: sender.unwrap_or_default(),
                new,
            })),
            Command::Raw(ref cmd, ref args) if cmd == "ERROR" => Ok(Some(Event::Disconnected {
                reason: args
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "server error".to_string()),
            })),
            _ => Ok(None),
        }
    }
}
