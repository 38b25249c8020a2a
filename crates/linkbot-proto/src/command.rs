//! IRC command types.
//!
//! Type-safe representations of the IRC commands a client bot exchanges
//! with a server. Unknown commands are captured in the `Raw` variant.
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol

use std::fmt;

use crate::error::MessageParseError;

/// IRC command with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Command {
    /// `NICK nickname`
    NICK(String),
    /// `USER username mode realname`
    USER(String, String, String),
    /// `JOIN channel`
    JOIN(String),
    /// `PART channel [message]`
    PART(String, Option<String>),
    /// `PRIVMSG target text`
    PRIVMSG(String, String),
    /// `NOTICE target text`
    NOTICE(String, String),
    /// `PING server [server2]`
    PING(String, Option<String>),
    /// `PONG server [server2]`
    PONG(String, Option<String>),
    /// `QUIT [message]`
    QUIT(Option<String>),
    /// Numeric server reply: `001 nick :Welcome ...`
    Response(u16, Vec<String>),
    /// Any command not otherwise recognized.
    Raw(String, Vec<String>),
}

impl Command {
    /// Construct a command from a raw command token and its arguments.
    ///
    /// Numeric tokens become [`Command::Response`]; anything with an
    /// unexpected argument count falls back to [`Command::Raw`].
    pub fn new(cmd: &str, args: Vec<String>) -> Result<Command, MessageParseError> {
        if cmd.is_empty() {
            return Err(MessageParseError::InvalidCommand);
        }

        if cmd.chars().all(|c| c.is_ascii_digit()) {
            let code = cmd
                .parse::<u16>()
                .map_err(|_| MessageParseError::InvalidCommand)?;
            return Ok(Command::Response(code, args));
        }

        Ok(match (cmd.to_ascii_uppercase().as_str(), args.len()) {
            ("NICK", 1) => Command::NICK(take1(args)),
            ("USER", 4) => {
                let mut it = args.into_iter();
                let user = it.next().unwrap_or_default();
                let mode = it.next().unwrap_or_default();
                let _unused = it.next();
                let realname = it.next().unwrap_or_default();
                Command::USER(user, mode, realname)
            }
            ("JOIN", 1) => Command::JOIN(take1(args)),
            ("PART", 1) => Command::PART(take1(args), None),
            ("PART", 2) => {
                let mut it = args.into_iter();
                Command::PART(it.next().unwrap_or_default(), it.next())
            }
            ("PRIVMSG", 2) => {
                let mut it = args.into_iter();
                Command::PRIVMSG(it.next().unwrap_or_default(), it.next().unwrap_or_default())
            }
            ("NOTICE", 2) => {
                let mut it = args.into_iter();
                Command::NOTICE(it.next().unwrap_or_default(), it.next().unwrap_or_default())
            }
            ("PING", 1) => Command::PING(take1(args), None),
            ("PING", 2) => {
                let mut it = args.into_iter();
                Command::PING(it.next().unwrap_or_default(), it.next())
            }
            ("PONG", 1) => Command::PONG(take1(args), None),
            ("PONG", 2) => {
                let mut it = args.into_iter();
                Command::PONG(it.next().unwrap_or_default(), it.next())
            }
            ("QUIT", 0) => Command::QUIT(None),
            ("QUIT", 1) => Command::QUIT(Some(take1(args))),
            _ => Command::Raw(cmd.to_owned(), args),
        })
    }
}

fn take1(args: Vec<String>) -> String {
    args.into_iter().next().unwrap_or_default()
}

/// Whether an argument must be sent as a trailing `:`-prefixed parameter.
fn needs_colon_prefix(arg: &str) -> bool {
    arg.is_empty() || arg.contains(' ') || arg.starts_with(':')
}

/// Write a command name followed by its arguments, colon-prefixing the last
/// argument when required.
fn write_cmd(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    f.write_str(cmd)?;
    for (i, arg) in args.iter().enumerate() {
        f.write_str(" ")?;
        if i == args.len() - 1 && needs_colon_prefix(arg) {
            f.write_str(":")?;
        }
        f.write_str(arg)?;
    }
    Ok(())
}

/// Write a command whose final argument is always trailing (free-form text).
fn write_cmd_trailing(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    f.write_str(cmd)?;
    for (i, arg) in args.iter().enumerate() {
        f.write_str(" ")?;
        if i == args.len() - 1 {
            f.write_str(":")?;
        }
        f.write_str(arg)?;
    }
    Ok(())
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::NICK(n) => write_cmd(f, "NICK", &[n]),
            Command::USER(u, m, r) => write_cmd_trailing(f, "USER", &[u, m, "*", r]),
            Command::JOIN(c) => write_cmd(f, "JOIN", &[c]),
            Command::PART(c, Some(m)) => write_cmd_trailing(f, "PART", &[c, m]),
            Command::PART(c, None) => write_cmd(f, "PART", &[c]),
            Command::PRIVMSG(t, m) => write_cmd_trailing(f, "PRIVMSG", &[t, m]),
            Command::NOTICE(t, m) => write_cmd_trailing(f, "NOTICE", &[t, m]),
            Command::PING(s, Some(s2)) => write_cmd(f, "PING", &[s, s2]),
            Command::PING(s, None) => write_cmd(f, "PING", &[s]),
            Command::PONG(s, Some(s2)) => write_cmd(f, "PONG", &[s, s2]),
            Command::PONG(s, None) => write_cmd(f, "PONG", &[s]),
            Command::QUIT(Some(m)) => write_cmd_trailing(f, "QUIT", &[m]),
            Command::QUIT(None) => write_cmd(f, "QUIT", &[]),
            Command::Response(code, args) => {
                write!(f, "{:03}", code)?;
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                for (i, arg) in args.iter().enumerate() {
                    f.write_str(" ")?;
                    if i == args.len() - 1 && needs_colon_prefix(arg) {
                        f.write_str(":")?;
                    }
                    f.write_str(arg)?;
                }
                Ok(())
            }
            Command::Raw(cmd, args) => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                write_cmd(f, cmd, &args)
            }
        }
    }
}
