//! Reactive view binding.
//!
//! [`dispatch`] is the binder: a static table from [`StatePath`] to exactly
//! one render routine of a [`Renderer`].  [`Views`] is the terminal
//! renderer.  Each routine rebuilds the model of one screen region from the
//! current state; [`crate::ui`] then draws whatever the models hold.  A
//! region is therefore only recomputed when its path changes.

use chrono::{DateTime, Utc};

use crate::i18n::I18n;
use crate::model::LoadingProcess;
use crate::state::{State, StatePath};

/// The render routines, one per screen region.
pub trait Renderer {
    fn render_add_button(&mut self, state: &State);
    fn render_form(&mut self, state: &State);
    fn render_feeds(&mut self, state: &State);
    fn render_posts(&mut self, state: &State);
    fn render_modal(&mut self, state: &State);
}

/// Invoke the one routine that `path` is bound to.
///
/// Paths without a binding are ignored.
pub fn dispatch<R: Renderer>(path: StatePath, state: &State, renderer: &mut R) {
    match path {
        StatePath::LoadingProcess => renderer.render_add_button(state),
        StatePath::FormInputIsValid => renderer.render_form(state),
        StatePath::Feeds => renderer.render_feeds(state),
        StatePath::Posts | StatePath::UiViewedPosts => renderer.render_posts(state),
        StatePath::ModalDisplayedPost => renderer.render_modal(state),
        StatePath::FormInputError => {}
    }
}

// ---------------------------------------------------------------------------
// Region models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Danger,
}

/// The text line under the URL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub text: String,
}

/// The URL input and its feedback line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormView {
    /// What the user has typed so far.
    pub input: String,
    /// Highlights the input as rejected.
    pub invalid: bool,
    /// Input is read-only while a submission is loading.
    pub read_only: bool,
    pub feedback: Option<Feedback>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub label: String,
    /// Dims the button while loading.  Cosmetic only: Enter still submits,
    /// concurrent submissions are not guarded.
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLine {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostLine {
    pub title: String,
    pub published: Option<DateTime<Utc>>,
    pub viewed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalView {
    pub title: String,
    /// Title of the feed the post belongs to.
    pub feed_title: String,
    pub body: String,
    pub link: Option<String>,
}

/// The terminal renderer: one model per region plus the localization
/// bundle used to resolve message keys.
pub struct Views {
    i18n: I18n,
    pub form: FormView,
    pub add_button: ButtonView,
    pub feeds: Vec<FeedLine>,
    /// Newest first.
    pub posts: Vec<PostLine>,
    /// `Some` while the preview is open.
    pub modal: Option<ModalView>,
}

impl Views {
    pub fn new(i18n: I18n) -> Self {
        let add_button = ButtonView {
            label: i18n.t("form.add").to_string(),
            disabled: false,
        };
        Self {
            i18n,
            form: FormView::default(),
            add_button,
            feeds: Vec::new(),
            posts: Vec::new(),
            modal: None,
        }
    }

    /// Shorthand for translating a key.
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.i18n.t(key)
    }

    /// Hide the preview.  The state keeps the displayed post.
    pub fn close_modal(&mut self) {
        self.modal = None;
    }
}

impl Renderer for Views {
    fn render_add_button(&mut self, state: &State) {
        let loading = state.loading_process == Some(LoadingProcess::Loading);
        let key = if loading { "form.loading" } else { "form.add" };
        self.add_button = ButtonView {
            label: self.i18n.t(key).to_string(),
            disabled: loading,
        };
        self.form.read_only = loading;
    }

    fn render_form(&mut self, state: &State) {
        match state.form_input.is_valid {
            Some(true) => {
                self.form.invalid = false;
                self.form.input.clear();
                self.form.feedback = Some(Feedback {
                    kind: FeedbackKind::Success,
                    text: self.i18n.t("form.success").to_string(),
                });
            }
            Some(false) => {
                self.form.invalid = true;
                self.form.feedback = state.form_input.error.as_deref().map(|key| Feedback {
                    kind: FeedbackKind::Danger,
                    text: self.i18n.t(key).to_string(),
                });
            }
            None => {
                self.form.invalid = false;
                self.form.feedback = None;
            }
        }
    }

    fn render_feeds(&mut self, state: &State) {
        // Newest subscription on top.
        self.feeds = state
            .feeds
            .iter()
            .rev()
            .map(|feed| FeedLine {
                title: feed.title.clone(),
                description: feed.description.clone().unwrap_or_default(),
            })
            .collect();
    }

    fn render_posts(&mut self, state: &State) {
        self.posts = state
            .posts
            .iter()
            .rev()
            .map(|post| PostLine {
                title: post.title.clone(),
                published: post.published,
                viewed: state.is_viewed(&post.id),
            })
            .collect();
    }

    fn render_modal(&mut self, state: &State) {
        self.modal = state.displayed_post().map(|post| ModalView {
            title: post.title.clone(),
            feed_title: state
                .feed(&post.feed_id)
                .map(|f| f.title.clone())
                .unwrap_or_default(),
            body: post.description.clone().unwrap_or_default(),
            link: post.link.clone(),
        });
    }
}
