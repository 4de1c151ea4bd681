//! Application state and its single update entry point.
//!
//! [`State`] is plain data.  It is only ever changed through
//! [`Store::apply`], which takes a [`StateChange`] (the new value for one
//! tracked path), writes it, and synchronously notifies the view binder with
//! that path.  One change, one notification: nothing is batched or
//! coalesced.

use tracing::trace;

use crate::model::{Feed, FeedId, LoadingProcess, Post, PostId};
use crate::view::{self, Renderer};

/// Outcome of the last form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    /// `None` until the first submission.
    pub is_valid: Option<bool>,
    /// Localization key of the last error.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    /// Posts the user has opened, in the order they were opened.  Grows
    /// monotonically; the same post may appear more than once.
    pub viewed_posts: Vec<PostId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modal {
    pub displayed_post: Option<PostId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    pub form_input: FormInput,
    pub loading_process: Option<LoadingProcess>,
    pub ui_state: UiState,
    pub modal: Modal,
    /// Subscribed feeds, in subscription order.
    pub feeds: Vec<Feed>,
    /// Stored posts, oldest first; views show them newest first.
    pub posts: Vec<Post>,
}

impl State {
    pub fn post(&self, id: &PostId) -> Option<&Post> {
        self.posts.iter().find(|p| &p.id == id)
    }

    pub fn feed(&self, id: &FeedId) -> Option<&Feed> {
        self.feeds.iter().find(|f| &f.id == id)
    }

    pub fn is_viewed(&self, id: &PostId) -> bool {
        self.ui_state.viewed_posts.contains(id)
    }

    /// The post the modal currently shows, if it still resolves.
    pub fn displayed_post(&self) -> Option<&Post> {
        self.modal.displayed_post.as_ref().and_then(|id| self.post(id))
    }
}

/// A tracked location in [`State`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatePath {
    LoadingProcess,
    FormInputIsValid,
    FormInputError,
    Feeds,
    Posts,
    UiViewedPosts,
    ModalDisplayedPost,
}

/// A mutation of exactly one tracked path, carrying the new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    LoadingProcess(Option<LoadingProcess>),
    FormValidity(Option<bool>),
    FormError(Option<String>),
    /// Append one feed.
    FeedAdded(Feed),
    /// Append posts, in the given order, as one mutation.
    PostsAdded(Vec<Post>),
    /// Append a post to the read list.
    PostViewed(PostId),
    DisplayedPost(Option<PostId>),
}

impl StateChange {
    pub fn path(&self) -> StatePath {
        match self {
            StateChange::LoadingProcess(_) => StatePath::LoadingProcess,
            StateChange::FormValidity(_) => StatePath::FormInputIsValid,
            StateChange::FormError(_) => StatePath::FormInputError,
            StateChange::FeedAdded(_) => StatePath::Feeds,
            StateChange::PostsAdded(_) => StatePath::Posts,
            StateChange::PostViewed(_) => StatePath::UiViewedPosts,
            StateChange::DisplayedPost(_) => StatePath::ModalDisplayedPost,
        }
    }
}

/// Owner of the [`State`] and of the renderer it notifies.
pub struct Store<R> {
    state: State,
    renderer: R,
    next_id: u64,
}

impl<R: Renderer> Store<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            state: State::default(),
            renderer,
            next_id: 1,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Apply one change and notify the binder with its path.
    pub fn apply(&mut self, change: StateChange) {
        let path = change.path();
        match change {
            StateChange::LoadingProcess(v) => self.state.loading_process = v,
            StateChange::FormValidity(v) => self.state.form_input.is_valid = v,
            StateChange::FormError(v) => self.state.form_input.error = v,
            StateChange::FeedAdded(feed) => self.state.feeds.push(feed),
            StateChange::PostsAdded(posts) => self.state.posts.extend(posts),
            StateChange::PostViewed(id) => self.state.ui_state.viewed_posts.push(id),
            StateChange::DisplayedPost(v) => self.state.modal.displayed_post = v,
        }
        trace!(?path, "state changed");
        view::dispatch(path, &self.state, &mut self.renderer);
    }

    /// A fresh feed id.
    pub fn next_feed_id(&mut self) -> FeedId {
        FeedId(self.bump().to_string())
    }

    /// A fresh post id scoped to `feed`.
    pub fn next_post_id(&mut self, feed: &FeedId) -> PostId {
        let n = self.bump();
        PostId(format!("{feed}_{n}"))
    }

    fn bump(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::testing::{Recorder, Routine};

    fn feed(id: &str) -> Feed {
        Feed {
            id: FeedId(id.to_string()),
            url: format!("https://example.com/{id}.xml"),
            title: format!("Feed {id}"),
            description: None,
        }
    }

    fn post(id: &str, feed_id: &str, title: &str) -> Post {
        Post {
            id: PostId(id.to_string()),
            feed_id: FeedId(feed_id.to_string()),
            title: title.to_string(),
            link: None,
            description: None,
            published: None,
        }
    }

    #[test]
    fn new_store_starts_empty() {
        let store = Store::new(Recorder::default());
        assert_eq!(store.state(), &State::default());
        assert!(store.state().loading_process.is_none());
        assert!(store.state().form_input.is_valid.is_none());
        assert!(store.renderer().calls.is_empty());
    }

    #[test]
    fn every_change_notifies_once() {
        let mut store = Store::new(Recorder::default());
        store.apply(StateChange::FormValidity(Some(true)));
        store.apply(StateChange::FormValidity(Some(true)));
        assert_eq!(store.renderer().calls, vec![Routine::Form, Routine::Form]);
    }

    #[test]
    fn form_validity_only_renders_form() {
        let mut store = Store::new(Recorder::default());
        store.apply(StateChange::FormValidity(Some(false)));
        assert_eq!(store.renderer().calls, vec![Routine::Form]);
        assert_eq!(store.state().form_input.is_valid, Some(false));
    }

    #[test]
    fn feed_and_post_changes_never_render_form() {
        let mut store = Store::new(Recorder::default());
        store.apply(StateChange::FeedAdded(feed("1")));
        store.apply(StateChange::PostsAdded(vec![post("1_2", "1", "A")]));
        assert_eq!(store.renderer().calls, vec![Routine::Feeds, Routine::Posts]);
    }

    #[test]
    fn form_error_is_not_rendered() {
        let mut store = Store::new(Recorder::default());
        store.apply(StateChange::FormError(Some("form.errors.url".to_string())));
        assert!(store.renderer().calls.is_empty());
        assert_eq!(store.state().form_input.error.as_deref(), Some("form.errors.url"));
    }

    #[test]
    fn posts_are_appended_in_given_order() {
        let mut store = Store::new(Recorder::default());
        store.apply(StateChange::PostsAdded(vec![post("a", "1", "A"), post("b", "1", "B")]));
        store.apply(StateChange::PostsAdded(vec![post("c", "1", "C")]));
        let titles: Vec<_> = store.state().posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn viewed_posts_grow_monotonically() {
        let mut store = Store::new(Recorder::default());
        store.apply(StateChange::PostsAdded(vec![post("a", "1", "A")]));
        let id = PostId("a".to_string());
        store.apply(StateChange::PostViewed(id.clone()));
        store.apply(StateChange::PostViewed(id.clone()));
        assert_eq!(store.state().ui_state.viewed_posts, vec![id.clone(), id.clone()]);
        assert!(store.state().is_viewed(&id));
    }

    #[test]
    fn displayed_post_resolves_through_posts() {
        let mut store = Store::new(Recorder::default());
        store.apply(StateChange::PostsAdded(vec![post("a", "1", "A")]));
        store.apply(StateChange::DisplayedPost(Some(PostId("a".to_string()))));
        assert_eq!(store.state().displayed_post().map(|p| p.title.as_str()), Some("A"));
        assert_eq!(store.renderer().calls.last(), Some(&Routine::Modal));
    }

    #[test]
    fn ids_are_unique_and_post_ids_scoped_to_feed() {
        let mut store = Store::new(Recorder::default());
        let f1 = store.next_feed_id();
        let p1 = store.next_post_id(&f1);
        let p2 = store.next_post_id(&f1);
        let f2 = store.next_feed_id();
        assert_ne!(f1, f2);
        assert_ne!(p1, p2);
        assert!(p1.0.starts_with(&format!("{f1}_")));
        assert!(p2.0.starts_with(&format!("{f1}_")));
    }

    #[test]
    fn lookups_by_id() {
        let mut store = Store::new(Recorder::default());
        store.apply(StateChange::FeedAdded(feed("1")));
        assert_eq!(store.state().feed(&FeedId("1".to_string())).unwrap().title, "Feed 1");
        assert!(store.state().feed(&FeedId("2".to_string())).is_none());
        assert!(store.state().post(&PostId("x".to_string())).is_none());
    }
}
