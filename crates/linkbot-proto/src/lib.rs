//! # linkbot-proto
//!
//! IRC protocol parsing and encoding for the linkbot client.
//!
//! Provides an owned [`Message`] model (prefix + command), a line codec and
//! an IRC message codec for tokio, and the numeric reply constants the
//! client's registration state machine reacts to.
//!
//! ## Quick Start
//!
//! ```rust
//! use linkbot_proto::{Command, Message};
//!
//! let raw = ":nick!user@host PRIVMSG #channel :Hello!";
//! let message: Message = raw.parse().expect("valid IRC message");
//! assert!(matches!(message.command, Command::PRIVMSG(_, _)));
//!
//! let reply = Message::privmsg("#channel", "Hello yourself");
//! assert_eq!(reply.to_string(), "PRIVMSG #channel :Hello yourself\r\n");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
pub mod error;
pub mod irc;
pub mod line;
pub mod message;
pub mod prefix;
pub mod response;

pub use self::command::Command;
pub use self::error::{MessageParseError, ProtocolError};
pub use self::irc::IrcCodec;
pub use self::line::LineCodec;
pub use self::message::Message;
pub use self::prefix::Prefix;
