//! Hosting-page side effects.
//!
//! Desktop-name and clipboard events only ever touch the hosting page,
//! through [`PageHost`]. [`MemoryHost`] keeps the effects in memory for
//! headless use.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

// ============================================================================
// PageHost
// ============================================================================

/// Side-effect surface of the hosting page.
pub trait PageHost: Send {
    /// Replaces the page (tab) title.
    fn set_title(&mut self, title: &str);

    /// Writes text to the platform clipboard. Fire-and-forget.
    fn write_clipboard(&mut self, text: &str);
}

// ============================================================================
// MemoryHost
// ============================================================================

/// Clipboard writes retained by [`MemoryHost`]; older ones are dropped.
pub const CLIPBOARD_HISTORY_LIMIT: usize = 32;

#[derive(Debug, Default)]
struct MemoryHostState {
    title: Option<String>,
    clipboard: VecDeque<String>,
}

/// In-memory [`PageHost`].
///
/// Clones share state, so one clone can be handed to a session and the
/// other inspected. Only the last [`CLIPBOARD_HISTORY_LIMIT`] clipboard
/// writes are kept.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    inner: Arc<Mutex<MemoryHostState>>,
}

impl MemoryHost {
    /// Creates a host with no title and an empty clipboard.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current title, if one was set.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.inner.lock().title.clone()
    }

    /// Returns the most recent clipboard text.
    #[must_use]
    pub fn clipboard(&self) -> Option<String> {
        self.inner.lock().clipboard.back().cloned()
    }

    /// Returns the retained clipboard writes, oldest first.
    #[must_use]
    pub fn clipboard_history(&self) -> Vec<String> {
        self.inner.lock().clipboard.iter().cloned().collect()
    }
}

impl PageHost for MemoryHost {
    fn set_title(&mut self, title: &str) {
        self.inner.lock().title = Some(title.to_string());
    }

    fn write_clipboard(&mut self, text: &str) {
        let mut state = self.inner.lock();
        if state.clipboard.len() == CLIPBOARD_HISTORY_LIMIT {
            state.clipboard.pop_front();
        }
        state.clipboard.push_back(text.to_string());
    }
}

// ============================================================================
// Tests
// ============================================================================
