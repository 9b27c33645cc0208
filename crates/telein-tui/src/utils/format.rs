/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Fit input text into a fixed-width field, keeping the tail visible
/// so the cursor end is always shown.
pub fn fit_field(s: &str, width: usize) -> String {
    let len = s.chars().count();
    let visible: String = if len > width {
        s.chars().skip(len - width).collect()
    } else {
        s.to_string()
    };
    format!("{:<width$}", visible, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Videoconferência", 8), "Video...");
    }

    #[test]
    fn test_fit_field() {
        assert_eq!(fit_field("abc", 5), "abc  ");
        assert_eq!(fit_field("user@example.com", 8), "mple.com");
        assert_eq!(fit_field("", 3), "   ");
    }
}
