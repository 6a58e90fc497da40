#![allow(dead_code)]

use sqlx::SqlitePool;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use numerica_infrastructure::config::TwitchConfig;
use numerica_infrastructure::persistence::Database;

/// In-memory SQLite database with all migrations applied
pub async fn setup_in_memory_db() -> SqlitePool {
    let database = Database::in_memory().await.expect("open in-memory db");
    database.run_migrations().await.expect("run migrations");
    database.pool().clone()
}

/// How the fake Twitch server answers the login
pub enum Login {
    Welcome,
    Reject,
    Silent,
}

/// Single-connection fake of Twitch IRC.
///
/// Answers NICK according to `login`, writes `after_join` once JOIN arrives,
/// then records everything until the client hangs up (or closes right away
/// when `close_after_join` is set). The handle yields every line received.
pub async fn spawn_fake_twitch(
    login: Login,
    after_join: Vec<String>,
    close_after_join: bool,
) -> (TwitchConfig, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();
        let mut received = Vec::new();

        while let Ok(Some(line)) = lines.next_line().await {
            received.push(line.clone());

            if line.starts_with("NICK ") {
                let reply = match login {
                    Login::Welcome => ":tmi.twitch.tv 001 justinfan :Welcome, GLHF!\r\n",
                    Login::Reject => ":tmi.twitch.tv NOTICE * :Login authentication failed\r\n",
                    Login::Silent => continue,
                };
                write_half.write_all(reply.as_bytes()).await.expect("write login");
            }

            if line.starts_with("JOIN ") {
                for scripted in &after_join {
                    write_half
                        .write_all(format!("{scripted}\r\n").as_bytes())
                        .await
                        .expect("write scripted line");
                }
                if close_after_join {
                    write_half.shutdown().await.ok();
                    break;
                }
            }
        }

        received
    });

    let config = TwitchConfig {
        host: "127.0.0.1".to_string(),
        port,
        ..TwitchConfig::default()
    };

    (config, handle)
}
