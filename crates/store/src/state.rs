//! Application state owned by the store.

use crate::pagination::Pagination;
use portaria_client::{Document, SearchResult, SourceRef};
use serde::Serialize;

/// Who produced a conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Error,
}

/// One turn of the conversation. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationEntry {
    pub role: Role,
    pub text: String,

    /// Present on assistant entries, possibly empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceRef>>,
}

impl ConversationEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            sources: None,
        }
    }

    pub fn assistant(text: impl Into<String>, sources: Vec<SourceRef>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            sources: Some(sources),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            role: Role::Error,
            text: text.into(),
            sources: None,
        }
    }
}

/// Progress of one kind of request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestState {
    pub loading: bool,
    pub error: Option<String>,
}

impl RequestState {
    pub(crate) fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreState {
    /// Chronological, most recent last
    pub conversation: Vec<ConversationEntry>,
    pub ask: RequestState,
    pub search: RequestState,
    pub fetch: RequestState,
    pub search_results: Vec<SearchResult>,
    pub selected_document: Option<Document>,
}

impl StoreState {
    /// Sources of the most recent assistant entry that carries any.
    pub fn latest_sources(&self) -> &[SourceRef] {
        self.conversation
            .iter()
            .rev()
            .filter(|entry| entry.role == Role::Assistant)
            .find_map(|entry| entry.sources.as_deref())
            .unwrap_or(&[])
    }

    /// One page of the current search results.
    pub fn search_page(&self, page: usize, per_page: usize) -> (Pagination, &[SearchResult]) {
        let pagination = Pagination::new(page, self.search_results.len(), per_page);
        let items = pagination.slice(&self.search_results);
        (pagination, items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            title: format!("Portaria {}", id),
            score: None,
            snippet: None,
        }
    }

    #[test]
    fn test_latest_sources_skips_later_user_and_error_entries() {
        let s1 = SourceRef::new("S1", "Portaria S1");
        let state = StoreState {
            conversation: vec![
                ConversationEntry::user("a"),
                ConversationEntry::assistant("b", vec![s1.clone()]),
                ConversationEntry::user("c"),
                ConversationEntry::error("d"),
            ],
            ..Default::default()
        };

        assert_eq!(state.latest_sources(), &[s1]);
    }

    #[test]
    fn test_latest_sources_prefers_most_recent_assistant() {
        let state = StoreState {
            conversation: vec![
                ConversationEntry::assistant("old", vec![SourceRef::new("1", "Um")]),
                ConversationEntry::assistant("new", vec![]),
            ],
            ..Default::default()
        };

        assert!(state.latest_sources().is_empty());
    }

    #[test]
    fn test_latest_sources_empty_history() {
        assert!(StoreState::default().latest_sources().is_empty());
    }

    #[test]
    fn test_search_page() {
        let state = StoreState {
            search_results: (1..=12).map(|i| result(&i.to_string())).collect(),
            ..Default::default()
        };

        let (page, items) = state.search_page(2, 5);
        assert_eq!(page.total_pages, 3);
        let ids: Vec<_> = items.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["6", "7", "8", "9", "10"]);
    }

    #[test]
    fn test_entry_serialization() {
        let json = serde_json::to_value(ConversationEntry::user("oi")).unwrap();
        assert_eq!(json, serde_json::json!({ "role": "user", "text": "oi" }));
    }
}
