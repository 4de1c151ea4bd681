//! Application controller.
//!
//! [`App`] owns the [`Store`] (and through it the terminal [`Views`]) plus
//! the UI-local bits that are not application state: keyboard focus, list
//! selection and the queue of URLs waiting to be fetched.  Every state
//! mutation goes through [`Store::apply`].

use ratatui::widgets::ListState;
use tracing::{info, warn};

use crate::error::FeedError;
use crate::model::{Feed, LoadingProcess, PostId};
use crate::poll::{self, PolledFeed};
use crate::source::ParsedFeed;
use crate::state::{StateChange, Store};
use crate::validate::validate;
use crate::view::{Renderer, Views};

/// Which pane receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Form,
    Posts,
}

pub struct App<R = Views> {
    pub store: Store<R>,
    /// Selection in the posts list (indexes the newest-first order).
    pub list_state: ListState,
    pub focus: Focus,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Validated URLs that still have to be fetched.
    pending: Vec<String>,
}

impl<R: Renderer> App<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            store: Store::new(renderer),
            list_state: ListState::default(),
            focus: Focus::Form,
            quit: false,
            pending: Vec::new(),
        }
    }

    // -- subscription --------------------------------------------------------

    /// Validate `url` and, if it passes, queue it for fetching.
    ///
    /// A rejected URL is reported through the form state.
    pub fn submit(&mut self, url: &str) -> anyhow::Result<()> {
        if let Err(e) = validate(url, &self.store.state().feeds) {
            info!(url, rule = e.kind(), "submission rejected");
            return self.fail(e.into());
        }
        self.store
            .apply(StateChange::LoadingProcess(Some(LoadingProcess::Loading)));
        self.pending.push(url.to_string());
        Ok(())
    }

    /// URLs queued by [`App::submit`] since the last call.
    pub fn take_pending(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }

    /// Apply the outcome of fetching a submitted URL.
    ///
    /// Unclassified errors are returned without touching the state.
    pub fn complete_subscription(
        &mut self,
        url: String,
        result: Result<ParsedFeed, FeedError>,
    ) -> anyhow::Result<()> {
        let parsed = match result {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(%url, error = %e, "subscription failed");
                return self.fail(e);
            }
        };

        let id = self.store.next_feed_id();
        let posts = poll::into_posts(&mut self.store, &id, parsed.items);
        info!(%url, feed = %id, posts = posts.len(), "subscribed");

        self.store.apply(StateChange::FeedAdded(Feed {
            id,
            url,
            title: parsed.title,
            description: parsed.description,
        }));
        self.store.apply(StateChange::PostsAdded(posts));
        self.store
            .apply(StateChange::LoadingProcess(Some(LoadingProcess::Loaded)));
        self.store.apply(StateChange::FormValidity(Some(true)));
        self.store.apply(StateChange::FormError(None));
        Ok(())
    }

    /// Report a classified error under the form.
    fn fail(&mut self, err: FeedError) -> anyhow::Result<()> {
        let key = err.into_message_key()?;
        self.store.apply(StateChange::FormError(Some(key)));
        self.store
            .apply(StateChange::LoadingProcess(Some(LoadingProcess::Failure)));
        self.store.apply(StateChange::FormValidity(Some(false)));
        Ok(())
    }

    /// Merge a poll cycle; returns the number of new posts.
    ///
    /// New posts land on top of the newest-first list, so the selection is
    /// shifted down to stay on the same post.
    pub fn merge_polled(&mut self, batch: Vec<PolledFeed>) -> usize {
        let added = poll::apply_batch(&mut self.store, batch);
        if let Some(i) = self.list_state.selected() {
            if added > 0 {
                self.list_state.select(Some(i + added));
            }
        }
        added
    }

    /// URLs of all subscribed feeds, for the poller.
    pub fn feed_urls(&self) -> Vec<String> {
        self.store.state().feeds.iter().map(|f| f.url.clone()).collect()
    }

    // -- reading -------------------------------------------------------------

    /// Id of the selected post.  Index 0 is the newest post.
    pub fn selected_post(&self) -> Option<PostId> {
        let posts = &self.store.state().posts;
        let i = self.list_state.selected()?;
        posts.iter().rev().nth(i).map(|p| p.id.clone())
    }

    /// Mark the selected post as read.
    pub fn mark_selected_read(&mut self) {
        if let Some(id) = self.selected_post() {
            self.store.apply(StateChange::PostViewed(id));
        }
    }

    /// Mark the selected post as read and show it in the preview.
    pub fn preview_selected(&mut self) {
        if let Some(id) = self.selected_post() {
            self.store.apply(StateChange::PostViewed(id.clone()));
            self.store.apply(StateChange::DisplayedPost(Some(id)));
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Form => Focus::Posts,
            Focus::Posts => Focus::Form,
        };
        if self.focus == Focus::Posts && self.list_state.selected().is_none() {
            self.select_first();
        }
    }

    // -- navigation ----------------------------------------------------------

    fn post_count(&self) -> usize {
        self.store.state().posts.len()
    }

    pub fn select_next(&mut self) {
        let len = self.post_count();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.post_count() == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if self.post_count() > 0 {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.post_count();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }
}

impl App<Views> {
    /// Submit whatever is typed into the form.
    pub fn submit_input(&mut self) -> anyhow::Result<()> {
        let url = self.store.renderer().form.input.clone();
        self.submit(&url)
    }

    /// Type into the URL input unless it is read-only.
    pub fn push_char(&mut self, c: char) {
        let form = &mut self.store.renderer_mut().form;
        if !form.read_only {
            form.input.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        let form = &mut self.store.renderer_mut().form;
        if !form.read_only {
            form.input.pop();
        }
    }

    pub fn modal_open(&self) -> bool {
        self.store.renderer().modal.is_some()
    }

    pub fn close_modal(&mut self) {
        self.store.renderer_mut().close_modal();
    }
}
