//! Client commands.
//!
//! Every inbound line is `<KEYWORD> <payload>`. The keyword is matched
//! case-sensitively; the payload is everything after the first whitespace
//! character and may be empty.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Separator between the two halves of a PRIVATE or KICKUSER payload.
pub const PAIR_SEPARATOR: char = '-';

/// A command sent by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `HELO <username>`: log in.
    Helo(String),
    /// `BCST <text>`: broadcast to every other logged-in client.
    Bcst(String),
    /// `PRIVATE <user>-<text>`: deliver text to one client.
    Private(String),
    /// `NEWGROUP <name>`: create a group owned by the sender.
    NewGroup(String),
    /// `ALLGROUPS`: list groups and their sizes.
    AllGroups,
    /// `JOINGROUP <name>`
    JoinGroup(String),
    /// `QUITGROUP <name>`
    QuitGroup(String),
    /// `KICKUSER <group>-<user>`: owner removes a member.
    KickUser(String),
    /// `ALLCLIENTS`: list logged-in clients.
    AllClients,
    /// `QUIT`
    Quit,
    /// Anything else. Carries the unrecognised keyword.
    Unknown(String),
}

impl Command {
    /// Parse one line. Never fails: unrecognised keywords become [`Command::Unknown`].
    ///
    /// A single trailing `\n` or `\r\n` is ignored.
    pub fn parse(line: &str) -> Self {
        let line = line
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(line);

        let (keyword, payload) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let payload = payload.to_string();

        match keyword {
            "HELO" => Command::Helo(payload),
            "BCST" => Command::Bcst(payload),
            "PRIVATE" => Command::Private(payload),
            "NEWGROUP" => Command::NewGroup(payload),
            "ALLGROUPS" => Command::AllGroups,
            "JOINGROUP" => Command::JoinGroup(payload),
            "QUITGROUP" => Command::QuitGroup(payload),
            "KICKUSER" => Command::KickUser(payload),
            "ALLCLIENTS" => Command::AllClients,
            "QUIT" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        }
    }

    /// The wire keyword, or `UNKNOWN` for unrecognised commands.
    ///
    /// Static so it can be used as a metrics label.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Helo(_) => "HELO",
            Command::Bcst(_) => "BCST",
            Command::Private(_) => "PRIVATE",
            Command::NewGroup(_) => "NEWGROUP",
            Command::AllGroups => "ALLGROUPS",
            Command::JoinGroup(_) => "JOINGROUP",
            Command::QuitGroup(_) => "QUITGROUP",
            Command::KickUser(_) => "KICKUSER",
            Command::AllClients => "ALLCLIENTS",
            Command::Quit => "QUIT",
            Command::Unknown(_) => "UNKNOWN",
        }
    }

    /// Whether this command may be issued before a successful HELO.
    pub fn allowed_before_login(&self) -> bool {
        matches!(self, Command::Helo(_) | Command::Quit | Command::Unknown(_))
    }

    fn payload(&self) -> Option<&str> {
        match self {
            Command::Helo(p)
            | Command::Bcst(p)
            | Command::Private(p)
            | Command::NewGroup(p)
            | Command::JoinGroup(p)
            | Command::QuitGroup(p)
            | Command::KickUser(p) => Some(p),
            _ => None,
        }
    }
}

impl FromStr for Command {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Command::parse(s))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Command::Unknown(keyword) = self {
            return f.write_str(keyword);
        }
        match self.payload() {
            Some(payload) => write!(f, "{} {}", self.name(), payload),
            None => f.write_str(self.name()),
        }
    }
}

/// Split a PRIVATE / KICKUSER payload on the first [`PAIR_SEPARATOR`].
///
/// The left half can therefore never contain the separator; the right half
/// may. Returns `None` when the separator is absent.
pub fn split_pair(payload: &str) -> Option<(&str, &str)> {
    payload.split_once(PAIR_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyword_and_payload() {
        assert_eq!(
            Command::parse("HELO alice123"),
            Command::Helo("alice123".to_string())
        );
        assert_eq!(
            Command::parse("BCST hello there world"),
            Command::Bcst("hello there world".to_string())
        );
        assert_eq!(Command::parse("ALLGROUPS"), Command::AllGroups);
        assert_eq!(Command::parse("QUIT"), Command::Quit);
    }

    #[test]
    fn test_parse_strips_line_endings() {
        assert_eq!(
            Command::parse("JOINGROUP team1\r\n"),
            Command::JoinGroup("team1".to_string())
        );
        assert_eq!(
            Command::parse("JOINGROUP team1\n"),
            Command::JoinGroup("team1".to_string())
        );
    }

    #[test]
    fn test_parse_empty_payload() {
        assert_eq!(Command::parse("BCST"), Command::Bcst(String::new()));
        assert_eq!(Command::parse("BCST "), Command::Bcst(String::new()));
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(Command::parse("helo bob"), Command::Unknown("helo".to_string()));
        assert_eq!(Command::parse(""), Command::Unknown(String::new()));
    }

    #[test]
    fn test_any_whitespace_ends_keyword() {
        assert_eq!(Command::parse("HELO\talice"), Command::Helo("alice".to_string()));
        assert_eq!(
            Command::parse("BCST\tsee you there"),
            Command::Bcst("see you there".to_string())
        );
        assert_eq!(Command::parse("QUIT\t"), Command::Quit);
    }

    #[test]
    fn test_payload_keeps_inner_spacing() {
        assert_eq!(
            Command::parse("BCST  two  spaces"),
            Command::Bcst(" two  spaces".to_string())
        );
    }

    #[test]
    fn test_display_matches_wire_form() {
        assert_eq!(
            Command::KickUser("team1-bob".to_string()).to_string(),
            "KICKUSER team1-bob"
        );
        assert_eq!(Command::AllClients.to_string(), "ALLCLIENTS");
    }

    #[test]
    fn test_split_pair_first_separator_only() {
        assert_eq!(split_pair("bob-hi-there"), Some(("bob", "hi-there")));
        assert_eq!(split_pair("bob-"), Some(("bob", "")));
        assert_eq!(split_pair("bob"), None);
    }

    #[test]
    fn test_allowed_before_login() {
        assert!(Command::Helo("x".into()).allowed_before_login());
        assert!(Command::Quit.allowed_before_login());
        assert!(!Command::Bcst("x".into()).allowed_before_login());
        assert!(!Command::AllClients.allowed_before_login());
    }
}
