use std::collections::HashMap;

/// One IRC line with IRCv3 tags:
/// `@key=value;key2 :nick!user@host COMMAND param1 param2 :trailing text`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IrcMessage {
    pub tags: HashMap<String, String>,
    pub prefix: Option<String>,
    pub command: String,
    pub params: Vec<String>,
}

impl IrcMessage {
    /// Parse a raw line; returns `None` for blank lines or lines without a command
    pub fn parse(line: &str) -> Option<Self> {
        let mut rest = line.trim_end_matches(['\r', '\n']).trim_start_matches(' ');
        let mut message = IrcMessage::default();

        if let Some(tagged) = rest.strip_prefix('@') {
            let (tags, remainder) = tagged.split_once(' ')?;
            message.tags = parse_tags(tags);
            rest = remainder.trim_start_matches(' ');
        }

        if let Some(prefixed) = rest.strip_prefix(':') {
            let (prefix, remainder) = prefixed.split_once(' ')?;
            message.prefix = Some(prefix.to_string());
            rest = remainder.trim_start_matches(' ');
        }

        let (command, mut params) = match rest.split_once(' ') {
            Some((command, params)) => (command, params),
            None => (rest, ""),
        };
        if command.is_empty() {
            return None;
        }
        message.command = command.to_ascii_uppercase();

        loop {
            params = params.trim_start_matches(' ');
            if params.is_empty() {
                break;
            }
            if let Some(trailing) = params.strip_prefix(':') {
                message.params.push(trailing.to_string());
                break;
            }
            match params.split_once(' ') {
                Some((param, remainder)) => {
                    message.params.push(param.to_string());
                    params = remainder;
                }
                None => {
                    message.params.push(params.to_string());
                    break;
                }
            }
        }

        Some(message)
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Nick portion of the prefix (`nick` in `nick!user@host`)
    pub fn nick(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        let nick = prefix.split(['!', '@']).next().unwrap_or(prefix);
        (!nick.is_empty()).then_some(nick)
    }

    /// Last parameter, which carries the text for PRIVMSG/NOTICE/PING
    pub fn trailing(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }
}

fn parse_tags(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_string(), unescape_tag_value(value)),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

fn unescape_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(':') => out.push(';'),
            Some('s') => out.push(' '),
            Some('\\') => out.push('\\'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
