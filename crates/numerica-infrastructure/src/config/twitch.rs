use rand::Rng;
use serde::{Deserialize, Serialize};

/// Twitch IRC endpoint and identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitchConfig {
    pub host: String,
    pub port: u16,
    /// Login nick; anonymous `justinfan` login when unset
    pub nickname: Option<String>,
    /// `oauth:` token, only needed with a real nickname
    pub oauth_token: Option<String>,
    /// Log raw IRC traffic at trace level
    pub debug: bool,
    /// Capacity of the queue between the socket reader and the game
    pub message_buffer: usize,
}

impl Default for TwitchConfig {
    fn default() -> Self {
        Self {
            host: "irc.chat.twitch.tv".to_string(),
            port: 6667,
            nickname: None,
            oauth_token: None,
            debug: false,
            message_buffer: 256,
        }
    }
}

impl TwitchConfig {
    /// Nick to log in with. Anonymous nicks get a random suffix per call.
    pub fn login_nick(&self) -> String {
        match self.nickname.as_deref().map(str::trim) {
            Some(nick) if !nick.is_empty() => nick.to_ascii_lowercase(),
            _ => anonymous_nick(),
        }
    }

    /// `PASS` argument, normalized to carry the `oauth:` prefix
    pub fn pass(&self) -> Option<String> {
        let token = self.oauth_token.as_deref()?.trim();
        if token.is_empty() {
            return None;
        }
        if token.starts_with("oauth:") {
            Some(token.to_string())
        } else {
            Some(format!("oauth:{token}"))
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn anonymous_nick() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(10_000..100_000);
    format!("justinfan{suffix}")
}
