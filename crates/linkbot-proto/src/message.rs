//! Owned IRC message type with parsing and serialization.

use std::fmt;
use std::str::FromStr;

use crate::command::Command;
use crate::error::{MessageParseError, ProtocolError};
use crate::prefix::Prefix;

/// An owned IRC message.
///
/// Contains the parsed representation of one wire line: an optional
/// prefix/source and the command with parameters. IRCv3 tags, if present on
/// the wire, are skipped during parsing; this client never negotiates them.
///
/// # Example
///
/// ```
/// use linkbot_proto::Message;
///
/// let msg: Message = ":nick!user@host PRIVMSG #channel :Hello!".parse().unwrap();
/// assert_eq!(msg.source_nickname(), Some("nick"));
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct Message {
    /// Message prefix/source (e.g., `nick!user@host`).
    pub prefix: Option<Prefix>,
    /// The IRC command and its parameters.
    pub command: Command,
}

impl Message {
    /// Create a message from a command, without a prefix.
    pub fn from_command(command: Command) -> Self {
        Message {
            prefix: None,
            command,
        }
    }

    /// Create a `PRIVMSG` to a target with text.
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Message::from_command(Command::PRIVMSG(target.into(), text.into()))
    }

    /// Create a `NICK` command.
    pub fn nick(nickname: impl Into<String>) -> Self {
        Message::from_command(Command::NICK(nickname.into()))
    }

    /// Create a `JOIN` command.
    pub fn join(channel: impl Into<String>) -> Self {
        Message::from_command(Command::JOIN(channel.into()))
    }

    /// Get the nickname from the message prefix, if present.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }

    /// The full source identity string (`nick!user@host` or server name).
    pub fn source_string(&self) -> Option<String> {
        self.prefix.as_ref().map(Prefix::to_string)
    }

    /// If this message is a CTCP `ACTION`, return the action text.
    ///
    /// `PRIVMSG target :\x01ACTION waves\x01` yields `Some("waves")`.
    pub fn action_text(&self) -> Option<&str> {
        let Command::PRIVMSG(_, text) = &self.command else {
            return None;
        };
        let inner = text.strip_prefix('\u{1}')?;
        let inner = inner.strip_suffix('\u{1}').unwrap_or(inner);
        inner.strip_prefix("ACTION ")
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        parse_message(s).map_err(|cause| ProtocolError::InvalidMessage {
            string: s.to_owned(),
            cause,
        })
    }
}

fn parse_message(s: &str) -> Result<Message, MessageParseError> {
    let mut rest = s.trim_end_matches(['\r', '\n']);
    if rest.is_empty() {
        return Err(MessageParseError::EmptyMessage);
    }

    // Skip IRCv3 tags if a server sends them unnegotiated.
    if rest.starts_with('@') {
        rest = rest
            .split_once(' ')
            .map(|(_, r)| r)
            .ok_or(MessageParseError::InvalidCommand)?;
    }

    let prefix = if let Some(after) = rest.strip_prefix(':') {
        let (raw_prefix, remainder) = after
            .split_once(' ')
            .ok_or(MessageParseError::InvalidCommand)?;
        if raw_prefix.is_empty() {
            return Err(MessageParseError::InvalidPrefix(String::new()));
        }
        rest = remainder;
        Some(Prefix::new_from_str(raw_prefix))
    } else {
        None
    };

    // Split off the trailing parameter, then whitespace-split the middle.
    let (middle, trailing) = match rest.split_once(" :") {
        Some((middle, trailing)) => (middle, Some(trailing)),
        None => (rest, None),
    };

    let mut tokens = middle.split(' ').filter(|t| !t.is_empty());
    let cmd = tokens.next().ok_or(MessageParseError::InvalidCommand)?;
    let mut args: Vec<String> = tokens.map(str::to_owned).collect();
    if let Some(trailing) = trailing {
        args.push(trailing.to_owned());
    }

    Ok(Message {
        prefix,
        command: Command::new(cmd, args)?,
    })
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        write!(f, "{}\r\n", self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_privmsg_with_prefix() {
        let msg: Message = ":alice!ally@host PRIVMSG #chat :hello world"
            .parse()
            .unwrap();
        assert_eq!(
            msg.command,
            Command::PRIVMSG("#chat".into(), "hello world".into())
        );
        assert_eq!(msg.source_nickname(), Some("alice"));
        assert_eq!(msg.source_string().as_deref(), Some("alice!ally@host"));
    }

    #[test]
    fn parses_numeric_reply() {
        let msg: Message = ":irc.oftc.net 433 * linkbot :Nickname is already in use."
            .parse()
            .unwrap();
        assert_eq!(
            msg.command,
            Command::Response(
                433,
                vec![
                    "*".into(),
                    "linkbot".into(),
                    "Nickname is already in use.".into()
                ]
            )
        );
    }

    #[test]
    fn parses_without_prefix() {
        let msg: Message = "PING :irc.oftc.net".parse().unwrap();
        assert_eq!(msg.command, Command::PING("irc.oftc.net".into(), None));
        assert_eq!(msg.prefix, None);
    }

    #[test]
    fn skips_unnegotiated_tags() {
        let msg: Message = "@time=2023-01-01T00:00:00Z :a!b@c PRIVMSG #chat :hi"
            .parse()
            .unwrap();
        assert_eq!(msg.command, Command::PRIVMSG("#chat".into(), "hi".into()));
    }

    #[test]
    fn strips_crlf() {
        let msg: Message = "PING :token\r\n".parse().unwrap();
        assert_eq!(msg.command, Command::PING("token".into(), None));
    }

    #[test]
    fn rejects_empty_input() {
        assert!("".parse::<Message>().is_err());
        assert!("\r\n".parse::<Message>().is_err());
    }

    #[test]
    fn serializes_with_crlf() {
        let msg = Message::privmsg("#chat", "hello world");
        assert_eq!(msg.to_string(), "PRIVMSG #chat :hello world\r\n");
    }

    #[test]
    fn detects_ctcp_action() {
        let msg: Message = ":carol!c@h PRIVMSG #chat :\u{1}ACTION waves\u{1}"
            .parse()
            .unwrap();
        assert_eq!(msg.action_text(), Some("waves"));

        let plain: Message = ":carol!c@h PRIVMSG #chat :waves".parse().unwrap();
        assert_eq!(plain.action_text(), None);
    }

    #[test]
    fn nick_change_round_trip() {
        let msg: Message = ":dave!d@h NICK :dave2".parse().unwrap();
        assert_eq!(msg.command, Command::NICK("dave2".into()));
        assert_eq!(msg.to_string(), ":dave!d@h NICK dave2\r\n");
    }
}
