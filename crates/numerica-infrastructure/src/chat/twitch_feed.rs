use async_trait::async_trait;
use log::{debug, error, info, trace, warn};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use numerica_domain::chat::{ChatFeed, ChatMessage};
use numerica_domain::shared::{ChannelName, DomainError};

use super::irc::IrcMessage;
use crate::config::{TimeoutConfig, TwitchConfig};

const IRC_TARGET: &str = "numerica::irc";

/// IRCv3 tag section (8191 bytes plus `@`) and a 512-byte IRC message
const MAX_LINE_BYTES: u64 = 8192 + 512;

type SharedWriter = Arc<Mutex<OwnedWriteHalf>>;

/// Read-only Twitch chat client over IRC.
///
/// A reader task owns the socket's read half and pushes chat lines into a
/// bounded queue drained by [`ChatFeed::next_message`]. The task is aborted on
/// `disconnect` and on drop.
pub struct TwitchChatFeed {
    config: TwitchConfig,
    timeouts: TimeoutConfig,
    nick: String,
    connection: Option<Connection>,
}

struct Connection {
    channel: ChannelName,
    writer: SharedWriter,
    reader: JoinHandle<()>,
    messages: mpsc::Receiver<ChatMessage>,
}

impl TwitchChatFeed {
    pub fn new(config: TwitchConfig) -> Self {
        Self::with_timeouts(config, TimeoutConfig::default())
    }

    pub fn with_timeouts(config: TwitchConfig, timeouts: TimeoutConfig) -> Self {
        let nick = config.login_nick();
        Self {
            config,
            timeouts,
            nick,
            connection: None,
        }
    }

    /// Nick this client logs in with
    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn is_connected(&self) -> bool {
        self.connection
            .as_ref()
            .is_some_and(|connection| !connection.reader.is_finished())
    }

    async fn open(
        &self,
        channel: &ChannelName,
    ) -> Result<(BufReader<OwnedReadHalf>, SharedWriter), DomainError> {
        let address = self.config.address();
        let stream = TcpStream::connect(&address)
            .await
            .map_err(|e| DomainError::Connection(format!("Failed to connect to {address}: {e}")))?;
        stream.set_nodelay(true).ok();

        let (read_half, write_half) = stream.into_split();
        let writer: SharedWriter = Arc::new(Mutex::new(write_half));
        let mut reader = BufReader::new(read_half);

        send_line(&writer, "CAP REQ :twitch.tv/tags twitch.tv/commands", false).await?;
        if let Some(pass) = self.config.pass() {
            // Never echo the token, even in debug mode
            send_line(&writer, &format!("PASS {pass}"), false).await?;
        }
        send_line(&writer, &format!("NICK {}", self.nick), self.config.debug).await?;

        self.await_welcome(&mut reader, &writer).await?;

        send_line(
            &writer,
            &format!("JOIN {}", channel.irc_channel()),
            self.config.debug,
        )
        .await?;

        Ok((reader, writer))
    }

    /// Wait for RPL_WELCOME (001); login failures arrive as NOTICE first
    async fn await_welcome(
        &self,
        reader: &mut BufReader<OwnedReadHalf>,
        writer: &SharedWriter,
    ) -> Result<(), DomainError> {
        let mut buf = Vec::new();
        loop {
            let Some(line) = read_line_lossy(reader, &mut buf)
                .await
                .map_err(|e| DomainError::Connection(format!("Failed to read from server: {e}")))?
            else {
                return Err(DomainError::Connection(
                    "Server closed the connection during login".to_string(),
                ));
            };

            if self.config.debug {
                trace!(target: IRC_TARGET, "< {}", line.trim_end());
            }

            let Some(message) = IrcMessage::parse(&line) else {
                continue;
            };

            match message.command.as_str() {
                "001" => return Ok(()),
                "PING" => {
                    let payload = message.trailing().unwrap_or("tmi.twitch.tv");
                    send_line(writer, &format!("PONG :{payload}"), self.config.debug).await?;
                }
                "NOTICE" => {
                    let text = message.trailing().unwrap_or_default();
                    if text.contains("authentication failed")
                        || text.contains("Improperly formatted auth")
                    {
                        return Err(DomainError::Connection(format!("Login rejected: {text}")));
                    }
                    warn!("Twitch notice during login: {}", text);
                }
                _ => {}
            }
        }
    }
}

#[async_trait]
impl ChatFeed for TwitchChatFeed {
    async fn connect(&mut self, channel: &ChannelName) -> Result<(), DomainError> {
        if self.connection.is_some() {
            warn!("Already connected, dropping previous connection before joining {}", channel);
            self.disconnect().await?;
        }

        info!(
            "Connecting to {} as {} for channel {}",
            self.config.address(),
            self.nick,
            channel
        );

        let (reader, writer) = timeout(self.timeouts.chat_connect, self.open(channel))
            .await
            .map_err(|_| {
                DomainError::Timeout(format!(
                    "Connecting to {} took longer than {:?}",
                    self.config.address(),
                    self.timeouts.chat_connect
                ))
            })??;

        let (tx, rx) = mpsc::channel(self.config.message_buffer.max(1));
        let reader = tokio::spawn(read_loop(reader, writer.clone(), tx, self.config.debug));

        self.connection = Some(Connection {
            channel: channel.clone(),
            writer,
            reader,
            messages: rx,
        });

        info!("Joined {}", channel.irc_channel());
        Ok(())
    }

    async fn next_message(&mut self) -> Option<ChatMessage> {
        match self.connection.as_mut() {
            Some(connection) => connection.messages.recv().await,
            None => None,
        }
    }

    async fn disconnect(&mut self) -> Result<(), DomainError> {
        let Some(connection) = self.connection.take() else {
            return Ok(());
        };

        let debug = self.config.debug;
        let farewell = async {
            send_line(
                &connection.writer,
                &format!("PART {}", connection.channel.irc_channel()),
                debug,
            )
            .await?;
            send_line(&connection.writer, "QUIT", debug).await?;
            connection
                .writer
                .lock()
                .await
                .shutdown()
                .await
                .map_err(|e| DomainError::Connection(format!("Failed to close socket: {e}")))
        };

        let result = match timeout(self.timeouts.chat_disconnect, farewell).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::Timeout(format!(
                "Disconnect took longer than {:?}",
                self.timeouts.chat_disconnect
            ))),
        };

        connection.reader.abort();
        info!("Left {}", connection.channel.irc_channel());

        result
    }
}

impl Drop for TwitchChatFeed {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            debug!("Dropping live connection to {}", connection.channel);
            connection.reader.abort();
        }
    }
}

async fn send_line(writer: &SharedWriter, line: &str, debug: bool) -> Result<(), DomainError> {
    if debug {
        trace!(target: IRC_TARGET, "> {}", line);
    }

    let mut writer = writer.lock().await;
    writer
        .write_all(format!("{line}\r\n").as_bytes())
        .await
        .map_err(|e| DomainError::Connection(format!("Failed to send IRC line: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| DomainError::Connection(format!("Failed to flush IRC line: {e}")))
}

/// Read one `\n`-terminated line, replacing invalid UTF-8. `None` on EOF.
/// Lines longer than `MAX_LINE_BYTES` are an `InvalidData` error.
async fn read_line_lossy<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let read = (&mut *reader)
        .take(MAX_LINE_BYTES)
        .read_until(b'\n', buf)
        .await?;
    if read == 0 {
        return Ok(None);
    }
    if read as u64 == MAX_LINE_BYTES && buf.last() != Some(&b'\n') {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("IRC line exceeds {MAX_LINE_BYTES} bytes"),
        ));
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

async fn read_loop(
    mut reader: BufReader<OwnedReadHalf>,
    writer: SharedWriter,
    tx: mpsc::Sender<ChatMessage>,
    debug: bool,
) {
    let mut buf = Vec::new();
    loop {
        let line = match read_line_lossy(&mut reader, &mut buf).await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Twitch closed the connection");
                break;
            }
            Err(e) => {
                error!("Failed to read from Twitch: {}", e);
                break;
            }
        };

        if debug {
            trace!(target: IRC_TARGET, "< {}", line.trim_end());
        }

        let Some(message) = IrcMessage::parse(&line) else {
            continue;
        };

        match message.command.as_str() {
            "PING" => {
                let payload = message.trailing().unwrap_or("tmi.twitch.tv");
                if let Err(e) = send_line(&writer, &format!("PONG :{payload}"), debug).await {
                    error!("Failed to answer PING: {}", e);
                }
            }
            "PRIVMSG" => {
                if let Some(chat) = to_chat_message(&message) {
                    if tx.send(chat).await.is_err() {
                        debug!("Message queue closed, stopping reader");
                        break;
                    }
                }
            }
            "RECONNECT" => warn!("Twitch requested a reconnect; messages will stop when it drops us"),
            "NOTICE" => warn!("Twitch notice: {}", message.trailing().unwrap_or_default()),
            "JOIN" | "PART" => debug!(
                "{} {} {}",
                message.nick().unwrap_or("?"),
                message.command,
                message.params.first().map(String::as_str).unwrap_or_default()
            ),
            _ => {}
        }
    }
}

/// Convert a received PRIVMSG into a chat message attributed to its sender.
///
/// The sender is the `display-name` tag, falling back to the prefix nick.
/// `/me` actions are unwrapped. Messages without any sender are dropped.
/// Twitch never echoes a connection's own PRIVMSGs and this client sends
/// none, so received lines are never self-sent, even when the login matches
/// our nick.
pub fn to_chat_message(message: &IrcMessage) -> Option<ChatMessage> {
    if message.command != "PRIVMSG" {
        return None;
    }

    let login = message.nick().unwrap_or_default();
    let sender = message
        .tag("display-name")
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(login);
    if sender.is_empty() {
        return None;
    }

    let text = message.trailing().unwrap_or_default();
    let text = text
        .strip_prefix("\u{1}ACTION ")
        .and_then(|action| action.strip_suffix('\u{1}'))
        .unwrap_or(text);

    Some(ChatMessage::new(sender, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> IrcMessage {
        IrcMessage::parse(line).unwrap()
    }

    #[test]
    fn test_display_name_is_preferred() {
        let msg = parse("@display-name=Alice :alice!alice@alice.tmi.twitch.tv PRIVMSG #c :1");
        let chat = to_chat_message(&msg).unwrap();
        assert_eq!(chat, ChatMessage::new("Alice", "1"));
    }

    #[test]
    fn test_login_is_used_without_display_name() {
        let msg = parse("@display-name= :bob!bob@bob.tmi.twitch.tv PRIVMSG #c :2");
        let chat = to_chat_message(&msg).unwrap();
        assert_eq!(chat.sender, "bob");

        let untagged = parse(":carol!carol@carol.tmi.twitch.tv PRIVMSG #c :3");
        assert_eq!(to_chat_message(&untagged).unwrap().sender, "carol");
    }

    #[test]
    fn test_message_without_sender_is_dropped() {
        let msg = parse("PRIVMSG #c :4");
        assert_eq!(to_chat_message(&msg), None);
    }

    #[test]
    fn test_received_message_from_own_login_still_counts() {
        // a streamer logged in as themselves typing in the web chat
        let msg = parse(
            "@display-name=RothioTome :rothiotome!rothiotome@rothiotome.tmi.twitch.tv PRIVMSG #rothiotome :1",
        );
        let chat = to_chat_message(&msg).unwrap();
        assert!(!chat.is_self);
        assert_eq!(chat, ChatMessage::new("RothioTome", "1"));
    }

    #[tokio::test]
    async fn test_read_line_lossy_splits_lines() {
        let mut reader = BufReader::new(&b"PING :a\r\nPING :b\r\n"[..]);
        let mut buf = Vec::new();

        let first = read_line_lossy(&mut reader, &mut buf).await.unwrap();
        assert_eq!(first.as_deref(), Some("PING :a\r\n"));
        let second = read_line_lossy(&mut reader, &mut buf).await.unwrap();
        assert_eq!(second.as_deref(), Some("PING :b\r\n"));
        assert_eq!(read_line_lossy(&mut reader, &mut buf).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_line_lossy_rejects_unterminated_flood() {
        let flood = vec![b'a'; MAX_LINE_BYTES as usize * 4];
        let mut reader = BufReader::new(&flood[..]);
        let mut buf = Vec::new();

        let err = read_line_lossy(&mut reader, &mut buf).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        assert_eq!(buf.len(), MAX_LINE_BYTES as usize);
    }

    #[tokio::test]
    async fn test_read_line_lossy_accepts_line_at_limit() {
        let mut line = vec![b'a'; MAX_LINE_BYTES as usize - 1];
        line.push(b'\n');
        let mut reader = BufReader::new(&line[..]);
        let mut buf = Vec::new();

        let read = read_line_lossy(&mut reader, &mut buf).await.unwrap().unwrap();
        assert_eq!(read.len(), MAX_LINE_BYTES as usize);
    }

    #[test]
    fn test_action_is_unwrapped() {
        let msg = parse(":dave!dave@dave.tmi.twitch.tv PRIVMSG #c :\u{1}ACTION 6\u{1}");
        assert_eq!(to_chat_message(&msg).unwrap().text, "6");
    }

    #[test]
    fn test_non_privmsg_is_ignored() {
        let msg = parse(":tmi.twitch.tv NOTICE #c :hello");
        assert_eq!(to_chat_message(&msg), None);
    }

    #[tokio::test]
    async fn test_disconnect_without_connection_is_ok() {
        let mut feed = TwitchChatFeed::new(TwitchConfig::default());
        assert!(!feed.is_connected());
        assert!(feed.disconnect().await.is_ok());
        assert_eq!(feed.next_message().await, None);
    }
}
