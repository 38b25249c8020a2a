//! Protocol session state machine.
//!
//! One [`Session`] owns one connection's lifecycle: registration handshake,
//! nickname-collision recovery, channel join, and event dispatch while
//! joined. Decoded protocol events arrive one at a time in arrival order;
//! activity-log records therefore appear in exactly the order the events
//! were observed.

use std::path::PathBuf;

use linkbot_proto::{Command, Message};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::db::UserDb;
use crate::error::SessionError;
use crate::logger::{ActivityLog, asctime_now};

/// Fixed reply to a direct/private message.
pub const PERSONAL_GREETING: &str = "Thanks for contacting me personally.";

/// Fixed reply body when addressed by name on the channel.
pub const UNKNOWN_COMMAND_REPLY: &str = "I don't know what to do when you talk to me yet.";

/// Suffix appended to a nickname rejected as already in use.
pub const COLLISION_SUFFIX: &str = "|stolen";

/// Connection lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connecting,
    Registering,
    Joining,
    Joined,
    Disconnected,
}

/// Decoded protocol events delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Transport-level connect succeeded.
    Connected,
    /// The server rejected `proposed` as already in use.
    Collision { proposed: String },
    /// Identity registration completed (server welcome).
    Registered,
    /// Our join to `channel` was acknowledged.
    Joined { channel: String },
    /// Channel or private message. `sender` is the full source identity.
    Message {
        sender: String,
        target: String,
        text: String,
    },
    /// CTCP ACTION in the channel.
    Action { sender: String, text: String },
    /// A user changed nick. `old` is the full source identity.
    NickChanged { old: String, new: String },
    /// The connection dropped.
    Disconnected { reason: String },
}

/// Keep only the portion of a source identity before the first `!`.
fn strip_identity(sender: &str) -> &str {
    match sender.split_once('!') {
        Some((nick, _)) => nick,
        None => sender,
    }
}

/// One live connection's state and behavior from handshake to disconnect.
pub struct Session {
    nickname: String,
    channel: String,
    phase: Phase,
    log: ActivityLog,
    users_db: Option<PathBuf>,
    db: Option<UserDb>,
    outbound: mpsc::Sender<Message>,
}

impl Session {
    /// Build a session around an already-open activity log.
    ///
    /// The log is opened by the caller before the handshake so that an
    /// unopenable sink aborts the connection attempt early.
    pub fn new(
        nickname: String,
        channel: String,
        log: ActivityLog,
        users_db: Option<PathBuf>,
        outbound: mpsc::Sender<Message>,
    ) -> Self {
        Self {
            nickname,
            channel,
            phase: Phase::Connecting,
            log,
            users_db,
            db: None,
            outbound,
        }
    }

    /// Current nickname (changes after a collision retry).
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    async fn send(&self, msg: Message) -> Result<(), SessionError> {
        self.outbound
            .send(msg)
            .await
            .map_err(|_| SessionError::ConnectionLost("outbound channel closed".to_string()))
    }

    /// Dispatch one decoded protocol event.
    pub async fn handle_event(&mut self, event: Event) -> Result<(), SessionError> {
        match event {
            Event::Connected => self.on_connected().await,
            Event::Collision { proposed } => self.on_collision(proposed).await,
            Event::Registered => self.on_registered().await,
            Event::Joined { channel } => self.on_joined(&channel),
            Event::Message {
                sender,
                target,
                text,
            } => self.on_message(&sender, &target, &text).await,
            Event::Action { sender, text } => self.on_action(&sender, &text),
            Event::NickChanged { old, new } => self.on_nick_changed(&old, &new),
            Event::Disconnected { reason } => self.on_disconnected(&reason).await,
        }
    }

    /// Connect: record the connection, bring up the users db for the
    /// account-tracking variant, and start identity registration.
    async fn on_connected(&mut self) -> Result<(), SessionError> {
        self.log
            .log(&format!("[Connected at {}]", asctime_now()))?;

        if let Some(path) = self.users_db.clone() {
            self.db = Some(UserDb::open(&path, &mut self.log).await?);
        }

        self.phase = Phase::Registering;
        self.send(Message::nick(self.nickname.as_str())).await?;
        self.send(Message::from_command(Command::USER(
            self.nickname.clone(),
            "0".to_string(),
            self.nickname.clone(),
        )))
        .await?;
        Ok(())
    }

    /// Nickname collision: retry with a deterministic alternate. The
    /// transform is a single fixed suffix applied to whatever nick was
    /// just rejected.
    async fn on_collision(&mut self, proposed: String) -> Result<(), SessionError> {
        let retry = format!("{}{}", proposed, COLLISION_SUFFIX);
        debug!(rejected = %proposed, retry = %retry, "nickname collision");
        self.nickname = retry.clone();
        self.send(Message::nick(retry)).await
    }

    /// Registration completed: join the configured channel.
    async fn on_registered(&mut self) -> Result<(), SessionError> {
        self.phase = Phase::Joining;
        self.send(Message::join(self.channel.as_str())).await
    }

    fn on_joined(&mut self, channel: &str) -> Result<(), SessionError> {
        self.phase = Phase::Joined;
        self.log.log(&format!("[Joined channel {}]", channel))?;
        info!(channel = %channel, "joined");
        Ok(())
    }

    /// Channel or private message: always log first, then decide on a
    /// reply. A direct message gets the personal greeting; an on-channel
    /// message addressed `nickname:` gets the not-implemented reply, which
    /// is itself logged.
    async fn on_message(
        &mut self,
        sender: &str,
        target: &str,
        text: &str,
    ) -> Result<(), SessionError> {
        let sender = strip_identity(sender);
        self.log
            .log(&format!("{} <{}> {}", asctime_now(), sender, text))?;

        if target == self.nickname {
            self.send(Message::privmsg(sender, PERSONAL_GREETING)).await?;
            return Ok(());
        }

        if text.starts_with(&format!("{}:", self.nickname)) {
            let reply = format!("{}: {}", sender, UNKNOWN_COMMAND_REPLY);
            self.send(Message::privmsg(self.channel.as_str(), reply.as_str()))
                .await?;
            self.log.log(&format!("<{}> {}", self.nickname, reply))?;
        }
        Ok(())
    }

    fn on_action(&mut self, sender: &str, text: &str) -> Result<(), SessionError> {
        let sender = strip_identity(sender);
        self.log.log(&format!("* {} {}", sender, text))?;
        Ok(())
    }

    fn on_nick_changed(&mut self, old: &str, new: &str) -> Result<(), SessionError> {
        let old = strip_identity(old);
        self.log
            .log(&format!(">>> {} is now known as {}", old, new))?;
        Ok(())
    }

    /// Disconnect: record it and release the users db. The activity log
    /// itself is released when the session is dropped.
    async fn on_disconnected(&mut self, reason: &str) -> Result<(), SessionError> {
        self.log
            .log(&format!("[Disconnected at {}]", asctime_now()))?;
        debug!(reason = %reason, "disconnected");

        if let Some(db) = self.db.take() {
            db.close(&mut self.log).await?;
        }

        self.phase = Phase::Disconnected;
        Ok(())
    }
}
