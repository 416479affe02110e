//! Command keywords recognised by the dialogues.

/// Opens a report in a direct message.
pub const REPORT: &str = "report";
/// Opens a review in the moderator channel.
pub const REVIEW: &str = "review";
/// Cancels the open report or review.
pub const CANCEL: &str = "cancel";
/// Prints usage.
pub const HELP: &str = "help";
/// Shows a reporter's trust score in the moderator channel.
pub const TRUST: &str = "trust";

/// Generic rejection for input a dialogue state does not accept.
pub const INVALID_ACTION: &str = "Invalid action. Please select only valid actions.";

/// Returns `true` if `input` is exactly `keyword`, ignoring case and
/// surrounding whitespace.
#[must_use]
pub fn matches(input: &str, keyword: &str) -> bool {
    input.trim().eq_ignore_ascii_case(keyword)
}

/// A yes/no answer: exactly `yes` or `no`, surrounding whitespace aside.
#[must_use]
pub fn yes_no(input: &str) -> Option<bool> {
    match input.trim() {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}
