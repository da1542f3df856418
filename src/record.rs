use serde::{Deserialize, Serialize};

pub const DEFAULT_NOTES: &str = "Use this space to clear your mind...";

/// A checklist entry; list order is display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }
}

/// A named bookmark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub url: String,
}

impl Link {
    /// Builds a link, prefixing `https://` when the url carries no http/ftp scheme
    pub fn new(name: impl Into<String>, url: &str) -> Self {
        Self {
            name: name.into(),
            url: normalize_url(url),
        }
    }
}

pub fn normalize_url(url: &str) -> String {
    if url.starts_with("http") || url.starts_with("ftp") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Everything that survives a restart. Missing keys fall back to the
/// defaults below and unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionRecord {
    pub sessions_completed: u32,
    pub tasks: Vec<Task>,
    pub notes_content: String,
    pub links: Vec<Link>,
    pub last_date: String,
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self {
            sessions_completed: 0,
            tasks: Vec::new(),
            notes_content: DEFAULT_NOTES.to_string(),
            links: Vec::new(),
            last_date: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_adds_https_to_bare_host() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
    }

    #[test]
    fn normalize_keeps_known_schemes() {
        assert_eq!(normalize_url("http://x"), "http://x");
        assert_eq!(normalize_url("https://x"), "https://x");
        assert_eq!(normalize_url("ftp://files.local"), "ftp://files.local");
    }

    #[test]
    fn normalize_is_a_plain_prefix_check() {
        // "httpbin.org" already starts with "http"
        assert_eq!(normalize_url("httpbin.org"), "httpbin.org");
    }

    #[test]
    fn missing_keys_take_defaults() {
        let rec: SessionRecord = serde_json::from_str(r#"{"sessions_completed": 3}"#).unwrap();
        assert_eq!(rec.sessions_completed, 3);
        assert!(rec.tasks.is_empty());
        assert_eq!(rec.notes_content, DEFAULT_NOTES);
        assert!(rec.links.is_empty());
        assert_eq!(rec.last_date, "");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let rec: SessionRecord =
            serde_json::from_str(r#"{"theme": "dark", "tasks": [{"text": "a", "completed": true, "tag": 1}]}"#)
                .unwrap();
        assert_eq!(rec.tasks, vec![Task { text: "a".into(), completed: true }]);
    }

    #[test]
    fn task_without_completed_flag_is_open() {
        let task: Task = serde_json::from_str(r#"{"text": "write"}"#).unwrap();
        assert!(!task.completed);
    }
}
