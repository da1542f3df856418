use crate::error::{Result, ZenError};
use crate::record::{Link, SessionRecord, Task};

/// Mutable view over the persisted record. Every mutation either fully
/// applies or leaves the record untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    record: SessionRecord,
}

impl SessionState {
    pub fn new(record: SessionRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    pub fn tasks(&self) -> &[Task] {
        &self.record.tasks
    }

    pub fn links(&self) -> &[Link] {
        &self.record.links
    }

    pub fn notes(&self) -> &str {
        &self.record.notes_content
    }

    pub fn sessions_completed(&self) -> u32 {
        self.record.sessions_completed
    }

    /// Appends an open task. Empty text is ignored; returns whether a task was added.
    pub fn add_task(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        self.record.tasks.push(Task::new(text));
        true
    }

    pub fn remove_task(&mut self, index: usize) -> Result<Task> {
        ZenError::check_index(index, self.record.tasks.len())?;
        Ok(self.record.tasks.remove(index))
    }

    pub fn set_task_completed(&mut self, index: usize, value: bool) -> Result<()> {
        ZenError::check_index(index, self.record.tasks.len())?;
        self.record.tasks[index].completed = value;
        Ok(())
    }

    /// Flips the completed flag and returns the new value
    pub fn toggle_task(&mut self, index: usize) -> Result<bool> {
        ZenError::check_index(index, self.record.tasks.len())?;
        let task = &mut self.record.tasks[index];
        task.completed = !task.completed;
        Ok(task.completed)
    }

    pub fn add_link(&mut self, name: &str, url: &str) -> Result<&Link> {
        if name.is_empty() || url.is_empty() {
            return Err(ZenError::Validation("Enter name and URL".to_string()));
        }
        self.record.links.push(Link::new(name, url));
        Ok(&self.record.links[self.record.links.len() - 1])
    }

    pub fn remove_link(&mut self, index: usize) -> Result<Link> {
        ZenError::check_index(index, self.record.links.len())?;
        Ok(self.record.links.remove(index))
    }

    pub fn set_notes(&mut self, text: impl Into<String>) {
        self.record.notes_content = text.into();
    }

    pub fn increment_session_count(&mut self) {
        self.record.sessions_completed = self.record.sessions_completed.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn with_tasks(texts: &[&str]) -> SessionState {
        let mut state = SessionState::default();
        for t in texts {
            state.add_task(t);
        }
        state
    }

    #[test]
    fn add_task_appends_open_task() {
        let mut state = SessionState::default();
        assert!(state.add_task("write report"));
        assert_eq!(state.tasks(), &[Task::new("write report")]);
    }

    #[test]
    fn add_task_ignores_empty_text() {
        let mut state = SessionState::default();
        assert!(!state.add_task(""));
        assert!(state.tasks().is_empty());
    }

    #[test]
    fn remove_task_preserves_order() {
        let mut state = with_tasks(&["a", "b", "c"]);
        let removed = state.remove_task(1).unwrap();
        assert_eq!(removed.text, "b");
        let texts: Vec<&str> = state.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "c"]);
    }

    #[test]
    fn remove_task_out_of_range_leaves_list_alone() {
        let mut state = with_tasks(&["a", "b"]);
        let before = state.clone();
        assert_matches!(
            state.remove_task(2),
            Err(ZenError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn set_task_completed_and_toggle() {
        let mut state = with_tasks(&["a"]);
        state.set_task_completed(0, true).unwrap();
        assert!(state.tasks()[0].completed);
        assert!(!state.toggle_task(0).unwrap());
        assert!(!state.tasks()[0].completed);
        assert_matches!(
            state.set_task_completed(5, true),
            Err(ZenError::IndexOutOfRange { .. })
        );
        assert_matches!(state.toggle_task(1), Err(ZenError::IndexOutOfRange { .. }));
    }

    #[test]
    fn add_link_normalizes_url() {
        let mut state = SessionState::default();
        assert_eq!(state.add_link("Docs", "example.com").unwrap().url, "https://example.com");
        assert_eq!(state.add_link("Docs", "http://x").unwrap().url, "http://x");
        assert_eq!(state.links().len(), 2);
    }

    #[test]
    fn add_link_requires_name_and_url() {
        let mut state = SessionState::default();
        assert_matches!(state.add_link("", "example.com"), Err(ZenError::Validation(_)));
        assert_matches!(state.add_link("Docs", ""), Err(ZenError::Validation(_)));
        assert!(state.links().is_empty());
    }

    #[test]
    fn remove_link_checks_index() {
        let mut state = SessionState::default();
        state.add_link("Docs", "docs.rs").unwrap();
        assert_matches!(state.remove_link(1), Err(ZenError::IndexOutOfRange { .. }));
        assert_eq!(state.remove_link(0).unwrap().name, "Docs");
        assert!(state.links().is_empty());
    }

    #[test]
    fn set_notes_is_verbatim() {
        let mut state = SessionState::default();
        state.set_notes("  line one\n\nline three  ");
        assert_eq!(state.notes(), "  line one\n\nline three  ");
    }

    #[test]
    fn increment_session_count() {
        let mut state = SessionState::default();
        state.increment_session_count();
        state.increment_session_count();
        assert_eq!(state.sessions_completed(), 2);
    }
}
