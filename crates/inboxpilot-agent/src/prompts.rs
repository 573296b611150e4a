//! Prompt builders for summarization and reply drafting.
//!
//! Bodies are truncated to a fixed character budget before being embedded so
//! a long thread cannot blow the context window.  Truncation counts `char`s,
//! never bytes, so multi-byte text is always cut on a boundary.

/// Maximum body characters embedded in a summarization prompt.
pub const SUMMARY_BODY_LIMIT: usize = 3000;

/// Maximum body characters embedded in a reply-drafting prompt.
pub const REPLY_BODY_LIMIT: usize = 2000;

/// Truncate to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Build the prompt asking the model for a concise email summary.
pub fn summary_prompt(subject: &str, body: &str) -> String {
    format!(
        "Summarize the following email concisely:\n\n\
         Subject: {subject}\n\n\
         Body:\n{}\n\n\
         Summary:",
        truncate_chars(body, SUMMARY_BODY_LIMIT)
    )
}

/// Build the prompt asking the model for a reply draft.
///
/// The draft is body-only: salutations and closings are excluded so the
/// caller can frame the text however it likes.
pub fn reply_prompt(original_subject: &str, original_body: &str) -> String {
    format!(
        "Generate a professional and concise reply draft for the following email.\n\
         Focus on addressing the main points or questions. Omit salutations \
         (like \"Hi Name,\") and closings (like \"Best,\").\n\n\
         Original Email Subject: {original_subject}\n\
         Original Email Body (first {REPLY_BODY_LIMIT} chars):\n\
         ---\n\
         {}\n\
         ---\n\n\
         Generated Reply Draft (body only):",
        truncate_chars(original_body, REPLY_BODY_LIMIT)
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_chars_short_input_is_unchanged() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
    }

    #[test]
    fn truncate_chars_cuts_at_limit() {
        assert_eq!(truncate_chars("hello world", 5), "hello");
    }

    #[test]
    fn truncate_chars_counts_chars_not_bytes() {
        // Four 3-byte characters; a byte-based cut at 5 would split one.
        let text = "日本語文字";
        assert_eq!(truncate_chars(text, 2), "日本");
    }

    #[test]
    fn summary_prompt_embeds_subject_and_body() {
        let prompt = summary_prompt("Budget", "numbers inside");
        assert!(prompt.contains("Subject: Budget"));
        assert!(prompt.contains("numbers inside"));
        assert!(prompt.ends_with("Summary:"));
    }

    #[test]
    fn summary_prompt_truncates_long_bodies() {
        let body = "x".repeat(SUMMARY_BODY_LIMIT + 500);
        let prompt = summary_prompt("s", &body);
        assert!(!prompt.contains(&"x".repeat(SUMMARY_BODY_LIMIT + 1)));
        assert!(prompt.contains(&"x".repeat(SUMMARY_BODY_LIMIT)));
    }

    #[test]
    fn reply_prompt_embeds_subject_and_truncated_body() {
        let body = "y".repeat(REPLY_BODY_LIMIT + 100);
        let prompt = reply_prompt("Plans", &body);
        assert!(prompt.contains("Original Email Subject: Plans"));
        assert!(!prompt.contains(&"y".repeat(REPLY_BODY_LIMIT + 1)));
        assert!(prompt.ends_with("Generated Reply Draft (body only):"));
    }

    #[test]
    fn reply_prompt_accepts_empty_body() {
        let prompt = reply_prompt("Plans", "");
        assert!(prompt.contains("Original Email Subject: Plans"));
    }
}
