//! Canned reply text and default lists used by the bot.

/// The keyword the default reply points users at.
pub const HELP_COMMAND: &str = "help";

/// Event types that are too noisy to be worth a debug line.
///
/// Suppressing these only affects diagnostics; classification is unchanged.
pub const FILTERED_EVENT_TYPES: &[&str] = &[
    "desktop_notification",
    "user_typing",
    "user_change",
    "dnd_updated_user",
    "channel_created",
    "file_comment_added",
    "file_shared",
    "member_joined_channel",
    "file_public",
    "reaction_added",
    "bot_added",
    "apps_changed",
    "apps_installed",
    "file_change",
    "commands_changed",
    "subteam_updated",
    "team_join",
    "reaction_removed",
    "bot_changed",
];

/// Fallback reply when a message is not a question, or no keyword matches.
pub fn default_reply(user_id: &str, help_command: &str) -> String {
    format!("Not sure what you mean, <@{user_id}>. Try *{help_command}*.")
}

/// Reply to the help command, listing every keyword the bot knows.
pub fn help_reply<'a>(keywords: impl IntoIterator<Item = &'a str>) -> String {
    let keywords = keywords.into_iter().map(|k| format!("• `{k}`")).collect::<Vec<_>>();

    if keywords.is_empty() {
        return "I don't have any answers loaded right now.".to_string();
    }

    format!("Ask me a question that mentions one of these:\n{}", keywords.join("\n"))
}
