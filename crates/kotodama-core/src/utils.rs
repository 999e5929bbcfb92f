//! Utility helpers: path resolution and string manipulation.

use std::path::PathBuf;

/// Get the Kotodama data directory (e.g. `~/.kotodama/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".kotodama")
}

/// Directory holding one JSON file per brand voice.
pub fn get_brand_voices_path() -> PathBuf {
    get_data_path().join("brand_voices")
}

/// Directory holding one JSON file per analyzed target profile.
pub fn get_profiles_path() -> PathBuf {
    get_data_path().join("profiles")
}

/// JSON-lines file of generated posts.
pub fn get_history_path() -> PathBuf {
    get_data_path().join("history.jsonl")
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Sanitize a string for use as a filename.
pub fn safe_filename(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        let result = truncate_string("hello world, this is a long string", 15);
        assert_eq!(result, "hello world,...");
    }

    #[test]
    fn test_truncate_unicode() {
        let result = truncate_string("こんにちは世界です", 5);
        assert_eq!(result, "こん...");
    }

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename("profile_@jack"), "profile__jack");
        assert_eq!(safe_filename("a/b/c"), "a_b_c");
        assert_eq!(safe_filename("my-voice_v2.json"), "my-voice_v2.json");
    }

    #[test]
    fn test_store_paths_live_under_data_dir() {
        assert!(get_data_path().ends_with(".kotodama"));
        assert!(get_brand_voices_path().ends_with("brand_voices"));
        assert!(get_profiles_path().parent().unwrap().ends_with(".kotodama"));
        assert!(get_history_path().ends_with("history.jsonl"));
    }
}
