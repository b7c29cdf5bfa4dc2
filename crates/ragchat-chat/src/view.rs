//! Paginated results view model.
//!
//! Every bot message that carries results gets its own page window and
//! expand/collapse flag, both keyed by [`MessageId`]. Pages are 1-based;
//! a message without an entry is on page 1.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::ChatError;
use crate::transcript::{Transcript, TranscriptState};
use crate::types::{Message, MessageId, ResponseKind, ResultItem};

/// Page window of one message's results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub current_page: usize,
    pub page_count: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Results block under a bot message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsView {
    pub expanded: bool,
    pub total: usize,
    /// Only the current page.
    pub items: Vec<ResultItem>,
    /// Present only when there is more than one page.
    pub pagination: Option<PageWindow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum MessageView {
    User {
        id: MessageId,
        created_at: DateTime<Utc>,
        text: String,
    },
    Pending {
        id: MessageId,
        created_at: DateTime<Utc>,
    },
    Bot {
        id: MessageId,
        created_at: DateTime<Utc>,
        text: String,
        kind: ResponseKind,
        results: Option<ResultsView>,
    },
}

/// Snapshot of everything the presentation layer draws.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptView {
    pub state: TranscriptState,
    pub page_size: usize,
    pub messages: Vec<MessageView>,
}

impl TranscriptView {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Transcript {
    fn page_count_for(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    /// Current 1-based page of a message.
    pub fn current_page(&self, id: MessageId) -> usize {
        self.pages.get(&id).copied().unwrap_or(1)
    }

    pub fn is_expanded(&self, id: MessageId) -> bool {
        self.expanded.get(&id).copied().unwrap_or(false)
    }

    /// Move a message's results to `page`, clamped to the valid range.
    ///
    /// Returns the page actually set. Messages without results stay on page 1.
    pub fn set_page(&mut self, id: MessageId, page: usize) -> Result<usize, ChatError> {
        let total = self
            .find(id)
            .ok_or(ChatError::MessageNotFound(id))?
            .body
            .results()
            .len();
        if total == 0 {
            return Ok(1);
        }

        let last = self.page_count_for(total);
        let clamped = page.clamp(1, last);
        if clamped != page {
            debug!(%id, requested = page, clamped, "Page request clamped");
        }
        self.pages.insert(id, clamped);
        Ok(clamped)
    }

    /// Results on the message's current page.
    ///
    /// Empty for unknown ids and messages without results.
    pub fn visible_slice(&self, id: MessageId) -> &[ResultItem] {
        let Some(message) = self.find(id) else {
            return &[];
        };
        let results = message.body.results();
        let start = (self.current_page(id) - 1) * self.page_size;
        if start >= results.len() {
            return &[];
        }
        let end = (start + self.page_size).min(results.len());
        &results[start..end]
    }

    /// Flip a message's expanded flag. Pagination is left as is.
    pub fn toggle_expansion(&mut self, id: MessageId) -> Result<bool, ChatError> {
        if self.find(id).is_none() {
            return Err(ChatError::MessageNotFound(id));
        }
        let flag = self.expanded.entry(id).or_insert(false);
        *flag = !*flag;
        Ok(*flag)
    }

    fn page_window(&self, id: MessageId, total: usize) -> Option<PageWindow> {
        if total <= self.page_size {
            return None;
        }
        let page_count = self.page_count_for(total);
        let current_page = self.current_page(id);
        Some(PageWindow {
            current_page,
            page_count,
            has_prev: current_page > 1,
            has_next: current_page < page_count,
        })
    }

    /// Build the render snapshot.
    pub fn view(&self) -> TranscriptView {
        let messages = self
            .messages
            .iter()
            .map(|m| match &m.body {
                Message::User { text } => MessageView::User {
                    id: m.id,
                    created_at: m.created_at,
                    text: text.clone(),
                },
                Message::Pending => MessageView::Pending {
                    id: m.id,
                    created_at: m.created_at,
                },
                Message::Bot {
                    text,
                    kind,
                    results,
                } => MessageView::Bot {
                    id: m.id,
                    created_at: m.created_at,
                    text: text.clone(),
                    kind: *kind,
                    results: (*kind == ResponseKind::WithResults).then(|| ResultsView {
                        expanded: self.is_expanded(m.id),
                        total: results.len(),
                        items: self.visible_slice(m.id).to_vec(),
                        pagination: self.page_window(m.id, results.len()),
                    }),
                },
            })
            .collect();

        TranscriptView {
            state: self.state(),
            page_size: self.page_size,
            messages,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
