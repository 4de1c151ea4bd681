//! Background fetching and merging of feed updates.
//!
//! Network work runs on the tokio runtime and never touches the store.
//! Results travel to the UI thread as [`WorkerMsg`]s over an unbounded
//! channel, and the UI thread merges them into the store.
//!
//! The poll loop re-fetches every subscribed feed concurrently, waits for
//! all of them, then sleeps for the configured interval.  A cycle is all or
//! nothing: if any feed fails, no feed's results from that cycle are
//! merged.  The next cycle is scheduled regardless, so a feed that keeps
//! failing holds back updates for every feed until it recovers.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::error::FeedError;
use crate::model::{FeedId, Post};
use crate::source::{self, FeedItem, FeedSource, ParsedFeed};
use crate::state::{State, StateChange, Store};
use crate::view::Renderer;

/// Messages sent from background tasks to the UI thread.
#[derive(Debug)]
pub enum WorkerMsg {
    /// A form submission finished fetching.
    Subscribed {
        url: String,
        result: Result<ParsedFeed, FeedError>,
    },
    /// A poll cycle fetched every feed successfully.
    Polled(Vec<PolledFeed>),
}

/// One feed's payload from a poll cycle.
#[derive(Debug)]
pub struct PolledFeed {
    /// The subscribed URL that was fetched.
    pub url: String,
    pub feed: ParsedFeed,
}

/// Handle used by the UI thread to start fetches and to tell the poller
/// which feeds exist.
pub struct Worker<S> {
    handle: Handle,
    source: Arc<S>,
    tx: mpsc::UnboundedSender<WorkerMsg>,
    feeds: watch::Sender<Vec<String>>,
}

impl<S: FeedSource + 'static> Worker<S> {
    /// Fetch and parse `url` for a form submission.
    pub fn subscribe(&self, url: String) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let result = source::load(&*source, &url).await;
            if let Err(e) = &result {
                debug!(feed = %url, error = %e, "subscription fetch failed");
            }
            // The UI may already be gone; nothing to report to.
            let _ = tx.send(WorkerMsg::Subscribed { url, result });
        });
    }

    /// Replace the list of feed URLs the poller fetches from the next cycle
    /// on.
    pub fn publish_feeds(&self, urls: Vec<String>) {
        self.feeds.send_replace(urls);
    }
}

/// Start the poll loop on `handle`.
///
/// Returns the [`Worker`] handle and the receiver the main loop should drain
/// on every tick.  The loop runs until the receiver is dropped.
pub fn spawn<S: FeedSource + 'static>(
    handle: Handle,
    source: Arc<S>,
    interval: Duration,
) -> (Worker<S>, mpsc::UnboundedReceiver<WorkerMsg>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (feeds, feeds_rx) = watch::channel(Vec::new());

    handle.spawn(run(Arc::clone(&source), feeds_rx, tx.clone(), interval));

    let worker = Worker {
        handle,
        source,
        tx,
        feeds,
    };
    (worker, rx)
}

async fn run<S: FeedSource>(
    source: Arc<S>,
    feeds: watch::Receiver<Vec<String>>,
    tx: mpsc::UnboundedSender<WorkerMsg>,
    interval: Duration,
) {
    info!(interval_secs = interval.as_secs(), "poller started");

    loop {
        let urls = feeds.borrow().clone();
        match poll_cycle(&*source, &urls).await {
            Ok(batch) if batch.is_empty() => {}
            Ok(batch) => {
                debug!(feeds = batch.len(), "poll cycle fetched");
                if tx.send(WorkerMsg::Polled(batch)).is_err() {
                    return;
                }
            }
            Err(e) => warn!(error = %e, "poll cycle failed, skipping merge"),
        }
        if tx.is_closed() {
            return;
        }
        tokio::time::sleep(interval).await;
    }
}

/// Fetch and parse every URL concurrently.
///
/// The first failure fails the whole cycle.
pub async fn poll_cycle<S: FeedSource>(
    source: &S,
    urls: &[String],
) -> Result<Vec<PolledFeed>, FeedError> {
    try_join_all(urls.iter().map(|url| async move {
        let feed = source::load(source, url).await?;
        Ok::<_, FeedError>(PolledFeed {
            url: url.clone(),
            feed,
        })
    }))
    .await
}

/// Turn parsed items into posts of `feed_id`.
///
/// Ids are assigned in payload order; the result is reversed so that a
/// newest-first payload is appended oldest-first.
pub fn into_posts<R: Renderer>(
    store: &mut Store<R>,
    feed_id: &FeedId,
    items: Vec<FeedItem>,
) -> Vec<Post> {
    let mut posts: Vec<Post> = items
        .into_iter()
        .map(|item| Post {
            id: store.next_post_id(feed_id),
            feed_id: feed_id.clone(),
            title: item.title,
            link: item.link,
            description: item.description,
            published: item.published,
        })
        .collect();
    posts.reverse();
    posts
}

/// Find the feed new posts belong to.
///
/// Matches on the parsed channel title and takes the first hit, so feeds
/// sharing a title all resolve to the earliest one.  Falls back to the
/// fetched URL when no title matches (the channel was renamed upstream).
fn resolve_owner(state: &State, polled: &PolledFeed) -> Option<FeedId> {
    state
        .feeds
        .iter()
        .find(|f| f.title == polled.feed.title)
        .or_else(|| state.feeds.iter().find(|f| f.url == polled.url))
        .map(|f| f.id.clone())
}

/// Merge one polled feed into the store.
///
/// Items whose title is already present among stored posts are dropped; the
/// rest are appended as a single mutation.  Returns how many were added.
pub fn merge<R: Renderer>(store: &mut Store<R>, polled: PolledFeed) -> usize {
    let owner = resolve_owner(store.state(), &polled);
    let seen: HashSet<&str> = store
        .state()
        .posts
        .iter()
        .map(|p| p.title.as_str())
        .collect();
    let fresh: Vec<FeedItem> = polled
        .feed
        .items
        .into_iter()
        .filter(|item| !seen.contains(item.title.as_str()))
        .collect();

    if fresh.is_empty() {
        return 0;
    }

    let Some(owner) = owner else {
        warn!(feed = %polled.url, "polled feed is no longer subscribed, dropping posts");
        return 0;
    };

    let posts = into_posts(store, &owner, fresh);
    let added = posts.len();
    store.apply(StateChange::PostsAdded(posts));
    added
}

/// Merge a whole poll cycle, feed by feed.  Returns the number of new posts.
pub fn apply_batch<R: Renderer>(store: &mut Store<R>, batch: Vec<PolledFeed>) -> usize {
    let added: usize = batch.into_iter().map(|polled| merge(store, polled)).sum();
    if added > 0 {
        info!(added, "new posts merged");
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Feed;
    use crate::source::fake::{rss_payload, FakeSource};
    use crate::view::testing::{Recorder, Routine};

    const URL: &str = "https://example.com/feed.xml";

    /// A store with one subscribed feed holding `titles` (payload order).
    fn subscribed(url: &str, title: &str, titles: &[&str]) -> (Store<Recorder>, FeedId) {
        let mut store = Store::new(Recorder::default());
        let id = add_feed(&mut store, url, title, titles);
        store.renderer_mut().calls.clear();
        (store, id)
    }

    fn add_feed(store: &mut Store<Recorder>, url: &str, title: &str, titles: &[&str]) -> FeedId {
        let id = store.next_feed_id();
        store.apply(StateChange::FeedAdded(Feed {
            id: id.clone(),
            url: url.to_string(),
            title: title.to_string(),
            description: None,
        }));
        let items = titles.iter().map(|t| FeedItem::titled(*t)).collect();
        let posts = into_posts(store, &id, items);
        store.apply(StateChange::PostsAdded(posts));
        id
    }

    fn titles(store: &Store<Recorder>) -> Vec<&str> {
        store.state().posts.iter().map(|p| p.title.as_str()).collect()
    }

    fn polled(url: &str, title: &str, items: &[&str]) -> PolledFeed {
        PolledFeed {
            url: url.to_string(),
            feed: ParsedFeed {
                title: title.to_string(),
                description: None,
                items: items.iter().map(|t| FeedItem::titled(*t)).collect(),
            },
        }
    }

    #[test]
    fn into_posts_reverses_payload_order() {
        let mut store = Store::new(Recorder::default());
        let feed = store.next_feed_id();
        let posts = into_posts(
            &mut store,
            &feed,
            vec![FeedItem::titled("A"), FeedItem::titled("B")],
        );
        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A"]);
        assert!(posts.iter().all(|p| p.feed_id == feed));
    }

    #[test]
    fn merge_appends_only_unseen_titles() {
        let (mut store, feed) = subscribed(URL, "Example", &["A", "B"]);
        assert_eq!(titles(&store), vec!["B", "A"]);

        let added = merge(&mut store, polled(URL, "Example", &["C", "A", "B"]));

        assert_eq!(added, 1);
        assert_eq!(titles(&store), vec!["B", "A", "C"]);
        assert_eq!(store.state().posts[2].feed_id, feed);
        assert_eq!(store.renderer().calls, vec![Routine::Posts]);
    }

    #[test]
    fn merge_reverses_new_posts() {
        let (mut store, _) = subscribed(URL, "Example", &["A"]);
        merge(&mut store, polled(URL, "Example", &["D", "C", "A"]));
        assert_eq!(titles(&store), vec!["A", "C", "D"]);
    }

    #[test]
    fn merge_without_new_posts_does_not_notify() {
        let (mut store, _) = subscribed(URL, "Example", &["A", "B"]);
        assert_eq!(merge(&mut store, polled(URL, "Example", &["A", "B"])), 0);
        assert!(store.renderer().calls.is_empty());
    }

    #[test]
    fn merge_is_idempotent() {
        let (mut store, _) = subscribed(URL, "Example", &["A"]);
        merge(&mut store, polled(URL, "Example", &["B", "A"]));
        let before = store.state().posts.clone();
        merge(&mut store, polled(URL, "Example", &["B", "A"]));
        assert_eq!(store.state().posts, before);
    }

    #[test]
    fn dedup_spans_all_feeds() {
        let (mut store, _) = subscribed(URL, "One", &["Shared"]);
        add_feed(&mut store, "https://two.example/rss", "Two", &[]);
        let added = merge(&mut store, polled("https://two.example/rss", "Two", &["Shared", "Own"]));
        assert_eq!(added, 1);
        assert_eq!(titles(&store), vec!["Shared", "Own"]);
    }

    #[test]
    fn shared_channel_titles_resolve_to_first_feed() {
        let (mut store, first) = subscribed(URL, "Same", &[]);
        let second = add_feed(&mut store, "https://two.example/rss", "Same", &[]);

        merge(&mut store, polled("https://two.example/rss", "Same", &["X"]));

        let post = &store.state().posts[0];
        assert_eq!(post.feed_id, first);
        assert_ne!(post.feed_id, second);
    }

    #[test]
    fn renamed_channel_falls_back_to_url() {
        let (mut store, feed) = subscribed(URL, "Old name", &[]);
        merge(&mut store, polled(URL, "New name", &["X"]));
        assert_eq!(store.state().posts[0].feed_id, feed);
    }

    #[test]
    fn unknown_feed_is_dropped() {
        let (mut store, _) = subscribed(URL, "Example", &[]);
        let added = merge(&mut store, polled("https://gone.example/rss", "Gone", &["X"]));
        assert_eq!(added, 0);
        assert!(store.state().posts.is_empty());
    }

    #[test]
    fn apply_batch_merges_each_feed_as_one_mutation() {
        let (mut store, _) = subscribed(URL, "One", &[]);
        add_feed(&mut store, "https://two.example/rss", "Two", &[]);
        store.renderer_mut().calls.clear();

        let added = apply_batch(
            &mut store,
            vec![
                polled(URL, "One", &["A", "B"]),
                polled("https://two.example/rss", "Two", &["C"]),
            ],
        );

        assert_eq!(added, 3);
        assert_eq!(store.renderer().calls, vec![Routine::Posts, Routine::Posts]);
        assert_eq!(titles(&store), vec!["B", "A", "C"]);
    }

    #[tokio::test]
    async fn poll_cycle_fetches_every_feed() {
        let source = FakeSource::default();
        source.set(URL, rss_payload("One", &["A"]));
        source.set("https://two.example/rss", rss_payload("Two", &["B"]));

        let urls = vec![URL.to_string(), "https://two.example/rss".to_string()];
        let batch = poll_cycle(&source, &urls).await.unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].url, URL);
        assert_eq!(batch[0].feed.title, "One");
        assert_eq!(batch[1].feed.items[0].title, "B");
    }

    #[tokio::test]
    async fn poll_cycle_fails_as_a_whole() {
        let source = FakeSource::default();
        source.set(URL, rss_payload("One", &["A"]));

        let urls = vec![URL.to_string(), "https://broken.example/rss".to_string()];
        let err = poll_cycle(&source, &urls).await.unwrap_err();
        assert!(matches!(err, FeedError::Network(_)));
    }

    #[tokio::test]
    async fn poll_cycle_with_no_feeds_is_empty() {
        let source = FakeSource::default();
        assert!(poll_cycle(&source, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn poll_cycle_twice_with_unchanged_payload_adds_nothing() {
        let source = FakeSource::default();
        source.set(URL, rss_payload("Example", &["A", "B"]));
        let (mut store, _) = subscribed(URL, "Example", &["A", "B"]);
        let urls = vec![URL.to_string()];

        for _ in 0..2 {
            let batch = poll_cycle(&source, &urls).await.unwrap();
            assert_eq!(apply_batch(&mut store, batch), 0);
        }
        assert_eq!(store.state().posts.len(), 2);
    }

    #[tokio::test]
    async fn poller_keeps_running_after_a_failed_cycle() {
        let source = Arc::new(FakeSource::default());
        let (worker, mut rx) = spawn(Handle::current(), Arc::clone(&source), Duration::from_millis(10));

        // Nothing serves this URL yet, so the first cycles fail.
        worker.publish_feeds(vec![URL.to_string()]);
        tokio::time::sleep(Duration::from_millis(30)).await;
        source.set(URL, rss_payload("Example", &["A"]));

        let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("poller should deliver a batch")
            .unwrap();
        match msg {
            WorkerMsg::Polled(batch) => assert_eq!(batch[0].feed.items[0].title, "A"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn poller_skips_cycles_while_one_feed_fails() {
        const BROKEN: &str = "https://broken.example/rss";
        let source = Arc::new(FakeSource::default());
        source.set(URL, rss_payload("Example", &["A"]));
        source.set(BROKEN, "<html>maintenance</html>");
        let (worker, mut rx) = spawn(Handle::current(), Arc::clone(&source), Duration::from_millis(10));

        worker.publish_feeds(vec![URL.to_string(), BROKEN.to_string()]);
        // Drain anything delivered before the broken feed was published.
        tokio::time::sleep(Duration::from_millis(30)).await;
        while rx.try_recv().is_ok() {}

        let quiet = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(quiet.is_err(), "no batch may be delivered while a feed fails");

        source.set(BROKEN, rss_payload("Back", &["B"]));
        let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert!(matches!(msg, Some(WorkerMsg::Polled(_))));
    }

    #[tokio::test]
    async fn subscribe_reports_result() {
        let source = Arc::new(FakeSource::default());
        source.set(URL, rss_payload("Example", &["A", "B"]));
        let (worker, mut rx) = spawn(Handle::current(), source, Duration::from_secs(60));

        worker.subscribe(URL.to_string());
        let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        match msg {
            Some(WorkerMsg::Subscribed { url, result }) => {
                assert_eq!(url, URL);
                assert_eq!(result.unwrap().items.len(), 2);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn subscribe_reports_failure() {
        let source = Arc::new(FakeSource::default());
        let (worker, mut rx) = spawn(Handle::current(), source, Duration::from_secs(60));

        worker.subscribe(URL.to_string());
        let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert!(matches!(
            msg,
            Some(WorkerMsg::Subscribed { result: Err(FeedError::Network(_)), .. })
        ));
    }
}
