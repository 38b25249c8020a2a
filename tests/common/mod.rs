//! Integration test common infrastructure.
//!
//! Provides a scripted in-process IRC server: it accepts exactly one
//! connection from the bot under test, walks it through registration and
//! join, injects channel traffic, and records every line the bot sends.

use futures_util::{SinkExt, StreamExt};
use linkbot_proto::{Command, IrcCodec, Message};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;

/// What the scripted server should do with its one connection.
#[derive(Default)]
pub struct ServerScript {
    /// Reject the first NICK with 433 before accepting registration.
    pub reject_first_nick: bool,
    /// Raw lines injected once the bot has joined and answered the sync PING.
    pub traffic: Vec<String>,
    /// Number of bot replies to collect after the traffic, before closing.
    pub expected_replies: usize,
}

/// A one-shot scripted IRC server bound to a local port.
pub struct ScriptedServer {
    listener: TcpListener,
    pub port: u16,
}

impl ScriptedServer {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        Self { listener, port }
    }

    /// Accept one connection, play the script, close, and return every
    /// message the bot sent.
    pub async fn serve(self, script: ServerScript) -> Vec<Message> {
        let ScriptedServer { listener, .. } = self;
        let (stream, _) = listener.accept().await.unwrap();
        // No second connection is ever accepted; a reconnect attempt after
        // this session must be refused.
        drop(listener);

        let mut framed = Framed::new(stream, IrcCodec::new());
        let mut received: Vec<Message> = Vec::new();

        // Registration: NICK (optionally rejected once), then welcome.
        let first = recv_until(&mut framed, &mut received, |c| {
            matches!(c, Command::NICK(_))
        })
        .await;
        let Command::NICK(mut nick) = first.command else {
            unreachable!()
        };

        if script.reject_first_nick {
            send_line(
                &mut framed,
                &format!(":irc.test 433 * {} :Nickname is already in use.", nick),
            )
            .await;
            let retry = recv_until(&mut framed, &mut received, |c| {
                matches!(c, Command::NICK(_))
            })
            .await;
            let Command::NICK(retry_nick) = retry.command else {
                unreachable!()
            };
            nick = retry_nick;
        }

        send_line(
            &mut framed,
            &format!(":irc.test 001 {} :Welcome to TestNet, {}", nick, nick),
        )
        .await;

        // Join: echo the bot's JOIN back with its full mask.
        let join = recv_until(&mut framed, &mut received, |c| {
            matches!(c, Command::JOIN(_))
        })
        .await;
        let Command::JOIN(channel) = join.command else {
            unreachable!()
        };
        send_line(&mut framed, &format!(":{}!bot@test JOIN :{}", nick, channel)).await;

        // Transport check: the bot must answer PING below the event layer.
        send_line(&mut framed, "PING :sync-token").await;
        recv_until(&mut framed, &mut received, |c| {
            matches!(c, Command::PONG(_, _))
        })
        .await;

        for line in &script.traffic {
            send_line(&mut framed, line).await;
        }

        for _ in 0..script.expected_replies {
            recv_until(&mut framed, &mut received, |c| {
                matches!(c, Command::PRIVMSG(_, _))
            })
            .await;
        }

        received
    }
}

async fn send_line(framed: &mut Framed<TcpStream, IrcCodec>, line: &str) {
    let msg: Message = line.parse().expect("fixture line must parse");
    framed.send(msg).await.expect("bot hung up early");
}

async fn recv_until(
    framed: &mut Framed<TcpStream, IrcCodec>,
    received: &mut Vec<Message>,
    pred: impl Fn(&Command) -> bool,
) -> Message {
    loop {
        let msg = framed
            .next()
            .await
            .expect("bot closed the connection early")
            .expect("bot sent an unparseable line");
        received.push(msg.clone());
        if pred(&msg.command) {
            return msg;
        }
    }
}
