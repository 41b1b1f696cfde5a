//! Message body validation and carrier-safe sanitization.

use crate::error::ValidationError;

/// Longest body accepted for a single message, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 1600;

/// Typographic punctuation replaced before an SMS send.
const SMART_PUNCTUATION: &[(char, &str)] = &[
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{2026}', "..."),
];

/// Validate message content and return it trimmed.
///
/// Rejects empty or whitespace-only bodies and bodies longer than
/// [`MAX_MESSAGE_LENGTH`] characters after trimming.
pub fn validate_message_content(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Empty("message"));
    }

    let length = trimmed.chars().count();
    if length > MAX_MESSAGE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "message",
            max: MAX_MESSAGE_LENGTH,
            actual: length,
        });
    }

    Ok(trimmed.to_string())
}

/// Replace smart punctuation with ASCII and drop control characters.
///
/// Newlines survive; every other control character (tabs, carriage returns,
/// NUL, ...) is removed. Applied to app-origin text before dispatch only.
pub fn sanitize_for_sms(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for c in text.chars() {
        if let Some((_, ascii)) = SMART_PUNCTUATION.iter().find(|(smart, _)| *smart == c) {
            out.push_str(ascii);
        } else if c == '\n' || !c.is_control() {
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_trims() {
        assert_eq!(validate_message_content("  hello \n").unwrap(), "hello");
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert_eq!(
            validate_message_content(""),
            Err(ValidationError::Empty("message"))
        );
        assert_eq!(
            validate_message_content(" \t\n "),
            Err(ValidationError::Empty("message"))
        );
    }

    #[test]
    fn test_validate_length_limit() {
        let max = "a".repeat(MAX_MESSAGE_LENGTH);
        assert!(validate_message_content(&max).is_ok());

        let padded = format!("   {max}   ");
        assert_eq!(validate_message_content(&padded).unwrap().len(), MAX_MESSAGE_LENGTH);

        let over = "a".repeat(MAX_MESSAGE_LENGTH + 1);
        assert_eq!(
            validate_message_content(&over),
            Err(ValidationError::TooLong {
                field: "message",
                max: MAX_MESSAGE_LENGTH,
                actual: MAX_MESSAGE_LENGTH + 1,
            })
        );
    }

    #[test]
    fn test_validate_counts_chars_not_bytes() {
        let emoji = "\u{1F600}".repeat(MAX_MESSAGE_LENGTH);
        assert!(validate_message_content(&emoji).is_ok());
    }

    #[test]
    fn test_sanitize_smart_punctuation() {
        let input = "\u{201C}Don\u{2019}t\u{201D} \u{2013} wait\u{2014}now\u{2026} \u{2018}ok\u{2019}";
        assert_eq!(sanitize_for_sms(input), "\"Don't\" - wait-now... 'ok'");
    }

    #[test]
    fn test_sanitize_strips_control_keeps_newline() {
        assert_eq!(sanitize_for_sms("a\tb\r\nc\u{0007}d\u{0000}"), "ab\ncd");
    }

    #[test]
    fn test_sanitize_leaves_other_unicode() {
        assert_eq!(sanitize_for_sms("caf\u{e9} \u{1F600}"), "caf\u{e9} \u{1F600}");
    }
}
