//! Parsing of the leading `<@USER>` address token in a message.

use std::sync::LazyLock;

use regex::Regex;

/// A mention at the very start of the message: `<@U123>` or `<@U123|name>`, then the rest.
static MENTION_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)^<@([^>|\s]+)(?:\|[^>]*)?>(.*)$").expect("hardcoded regex"));

/// Result of looking for a direct mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention<'a> {
    /// The addressed user, if the message starts with a mention.
    pub user_id: Option<&'a str>,
    /// The text after the mention (or the whole text), trimmed.
    pub remainder: &'a str,
}

/// Split a direct mention off the front of `text`.
///
/// Never fails: text without a leading mention comes back trimmed with no user id.
pub fn parse_mention(text: &str) -> Mention<'_> {
    match MENTION_REGEX.captures(text) {
        Some(captures) => {
            let user_id = captures.get(1).map(|m| m.as_str());
            let remainder = captures.get(2).map(|m| m.as_str()).unwrap_or_default().trim();

            Mention { user_id, remainder }
        }
        None => Mention { user_id: None, remainder: text.trim() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_mention() {
        let mention = parse_mention("<@U123> how do I deploy?");

        assert_eq!(mention.user_id, Some("U123"));
        assert_eq!(mention.remainder, "how do I deploy?");
    }

    #[test]
    fn passes_through_plain_text() {
        let mention = parse_mention("  just chatting ");

        assert_eq!(mention.user_id, None);
        assert_eq!(mention.remainder, "just chatting");
    }

    #[test]
    fn mention_without_text_leaves_empty_remainder() {
        let mention = parse_mention("<@W42>");

        assert_eq!(mention.user_id, Some("W42"));
        assert_eq!(mention.remainder, "");
    }

    #[test]
    fn empty_input() {
        let mention = parse_mention("");

        assert_eq!(mention.user_id, None);
        assert_eq!(mention.remainder, "");
    }

    #[test]
    fn mention_must_lead() {
        let mention = parse_mention("hey <@U123> what's up");

        assert_eq!(mention.user_id, None);
        assert_eq!(mention.remainder, "hey <@U123> what's up");
    }

    #[test]
    fn labelled_mention_and_multiline_remainder() {
        let mention = parse_mention("<@U123|faqbot>\nhow do I\nrun the tests?\n");

        assert_eq!(mention.user_id, Some("U123"));
        assert_eq!(mention.remainder, "how do I\nrun the tests?");
    }
}
