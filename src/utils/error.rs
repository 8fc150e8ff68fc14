/// Collapse a raw error/tool-output string into a single bounded line.
///
/// Signer stdout can include full transaction dumps after a `payload:` tag;
/// those are elided rather than truncated mid-JSON so the classification
/// markers that precede them survive intact.
pub fn compact_error_message(message: &str, max_len: usize) -> String {
    let mut raw = message.to_string();
    if let Some((prefix, _)) = raw.split_once(" payload: ") {
        raw = format!("{prefix} payload=<omitted>");
    }
    if let Some((prefix, _)) = raw.split_once("Stack backtrace:") {
        raw = prefix.to_string();
    }

    let mut compact = String::with_capacity(raw.len().min(max_len.saturating_add(16)));
    let mut prev_ws = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !prev_ws && !compact.is_empty() {
                compact.push(' ');
            }
            prev_ws = true;
            continue;
        }
        compact.push(ch);
        prev_ws = false;
        if compact.len() > max_len {
            break;
        }
    }
    if compact.len() <= max_len {
        compact
    } else {
        compact.truncate(max_len);
        compact.push_str("...(truncated)");
        compact
    }
}

#[cfg(test)]
mod tests {
    use super::compact_error_message;

    #[test]
    fn test_compact_error_message_elides_payload_and_backtrace() {
        let raw = "signer failed: cooldown active payload: {\"tx\":\"0x...huge...\"}\nStack backtrace:\n 0: frame";
        let compact = compact_error_message(raw, 200);
        assert!(compact.contains("payload=<omitted>"));
        assert!(compact.contains("cooldown active"));
        assert!(!compact.contains("Stack backtrace"));
        assert!(!compact.contains('\n'));
    }

    #[test]
    fn test_compact_error_message_bounds_length() {
        let raw = "x".repeat(4_096);
        let compact = compact_error_message(&raw, 120);
        assert!(compact.len() <= 120 + "...(truncated)".len() + 4);
        assert!(compact.ends_with("...(truncated)"));
    }
}
