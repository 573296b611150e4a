//! Header and body extraction from the MIME part tree.
//!
//! Body selection policy, applied per level of the tree:
//!
//! 1. the first top-level `text/plain` part with content wins;
//! 2. failing that, recurse depth-first left-to-right into nested multiparts
//!    and take the first non-empty nested result; otherwise capture the
//!    *first* `text/html` part as a fallback — later HTML parts are ignored
//!    even when the first decodes to an empty string;
//! 3. a leaf payload whose content type starts with `text/` decodes directly;
//! 4. anything else yields an empty string.  Extraction never fails.
//!
//! Recursion is capped at [`MAX_PART_DEPTH`]; parts nested deeper than that
//! are treated as having no body.

use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};

use crate::types::{Header, MessagePayload};

/// Default subject when the header is absent.
pub const NO_SUBJECT: &str = "No Subject";

/// Default sender when the From header is absent.
pub const UNKNOWN_SENDER: &str = "Unknown Sender";

/// Default date when the Date header is absent.
pub const NO_DATE: &str = "No Date";

/// Maximum nesting depth honored when walking the part tree.
pub const MAX_PART_DEPTH: usize = 32;

// ---------------------------------------------------------------------------
// Headers
// ---------------------------------------------------------------------------

/// Look up a header value by case-insensitive name.
pub fn header_value<'a>(headers: &'a [Header], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

/// Look up a header value, falling back to the given default when absent.
pub fn header_or<'a>(headers: &'a [Header], name: &str, default: &'a str) -> &'a str {
    header_value(headers, name).unwrap_or(default)
}

/// Extract the bare address from a possibly-decorated From header.
///
/// `"Ada Lovelace <ada@example.com>"` yields `ada@example.com`.  When no
/// `<...>` pair is present (or the brackets are out of order) the input is
/// returned unchanged.
pub fn sender_address(from: &str) -> &str {
    if let (Some(open), Some(close)) = (from.find('<'), from.find('>'))
        && open + 1 < close
    {
        return &from[open + 1..close];
    }
    from
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// Decode a part's transport-encoded content to text.
///
/// Accepts URL-safe base64 with or without padding.  Invalid base64 yields
/// an empty string and invalid UTF-8 bytes are replaced; decoding never
/// fails.
pub fn decode_part_data(data: &str) -> String {
    let bytes = URL_SAFE
        .decode(data)
        .or_else(|_| URL_SAFE_NO_PAD.decode(data));
    match bytes {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    }
}

/// Extract the best plain-text body from a message part tree.
pub fn extract_body(payload: &MessagePayload) -> String {
    body_at_depth(payload, 0)
}

fn body_at_depth(payload: &MessagePayload, depth: usize) -> String {
    if depth > MAX_PART_DEPTH {
        return String::new();
    }

    if !payload.parts.is_empty() {
        // First pass: a direct text/plain child wins outright.
        for part in &payload.parts {
            if part.mime_type == "text/plain"
                && let Some(data) = part.body.data.as_deref()
                && !data.is_empty()
            {
                return decode_part_data(data);
            }
        }

        // Second pass: recurse into containers; first non-empty nested
        // result wins.  Only the first HTML part is kept as a fallback.
        let mut html_fallback: Option<String> = None;
        for part in &payload.parts {
            if !part.parts.is_empty() {
                let nested = body_at_depth(part, depth + 1);
                if !nested.is_empty() {
                    return nested;
                }
            } else if part.mime_type == "text/html"
                && html_fallback.is_none()
                && let Some(data) = part.body.data.as_deref()
                && !data.is_empty()
            {
                html_fallback = Some(decode_part_data(data));
            }
        }
        return html_fallback.unwrap_or_default();
    }

    // Leaf message: decode directly when it is text-typed.
    if payload.mime_type.starts_with("text/")
        && let Some(data) = payload.body.data.as_deref()
        && !data.is_empty()
    {
        return decode_part_data(data);
    }

    String::new()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
