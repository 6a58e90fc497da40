use std::future::Future;
use std::pin::Pin;
use tracing::{debug, error, info, info_span, warn, Instrument};

use numerica_domain::chat::{ChatFeed, ChatMessage};
use numerica_domain::game::{Scoreboard, StreakTracker, Transition};
use numerica_domain::shared::{ChannelName, SessionId};

use super::best_score_store::BestScoreStore;
use crate::presentation::view::ScoreboardView;

/// One channel page: feeds chat into the tracker and renders every change.
///
/// The session is the only consumer of the feed. Each message is fully
/// handled, including the best-score write, before the next one is read.
pub struct GameSession<F: ChatFeed, V: ScoreboardView> {
    id: SessionId,
    channel: ChannelName,
    feed: F,
    tracker: StreakTracker,
    store: BestScoreStore,
    view: V,
}

impl<F: ChatFeed, V: ScoreboardView> GameSession<F, V> {
    pub fn new(channel: ChannelName, feed: F, store: BestScoreStore, view: V) -> Self {
        Self {
            id: SessionId::new(),
            channel,
            feed,
            tracker: StreakTracker::new(),
            store,
            view,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn scoreboard(&self) -> Scoreboard {
        self.tracker.scoreboard(self.store.max_score())
    }

    /// Play until `shutdown` resolves and return the final board.
    ///
    /// The feed is disconnected on every exit path. A failed connect or a
    /// closed feed is logged and the session idles until shutdown.
    pub async fn run<S>(mut self, shutdown: S) -> Scoreboard
    where
        S: Future<Output = ()>,
    {
        let span = info_span!("session", id = %self.id, channel = %self.channel);

        async move {
            tokio::pin!(shutdown);
            self.render();

            match self.feed.connect(&self.channel).await {
                Ok(()) => {
                    info!("Listening to chat");
                    self.consume(shutdown.as_mut()).await;
                }
                Err(e) => {
                    error!("Failed to join chat: {}", e.format_with_code());
                    shutdown.as_mut().await;
                }
            }

            if let Err(e) = self.feed.disconnect().await {
                error!("Failed to leave chat: {}", e.format_with_code());
            }

            let board = self.scoreboard();
            info!(
                "Session over: count {}, best score {}",
                board.count, board.max_score
            );
            board
        }
        .instrument(span)
        .await
    }

    async fn consume<S>(&mut self, mut shutdown: Pin<&mut S>)
    where
        S: Future<Output = ()>,
    {
        loop {
            let message = tokio::select! {
                _ = shutdown.as_mut() => {
                    info!("Shutdown requested");
                    return;
                }
                message = self.feed.next_message() => message,
            };

            match message {
                Some(message) => self.handle(message).await,
                None => {
                    warn!("Chat feed closed, waiting for shutdown");
                    shutdown.as_mut().await;
                    return;
                }
            }
        }
    }

    async fn handle(&mut self, message: ChatMessage) {
        if message.is_self {
            debug!("Skipping own message");
            return;
        }

        match self.tracker.submit(&message.sender, &message.text) {
            Transition::Ignored(reason) => {
                debug!(sender = %message.sender, ?reason, "Submission ignored");
                return;
            }
            Transition::Advanced { count } => {
                debug!(sender = %message.sender, count, "Streak advanced");
            }
            Transition::Broken {
                broken_count,
                status,
            } => {
                info!(sender = %message.sender, broken_count, %status, "Streak broken");
                self.store.register_new_score(broken_count).await;
            }
        }

        self.render();
    }

    fn render(&mut self) {
        let board = self.scoreboard();
        self.view.render(&board);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};
    use tokio::sync::oneshot;

    use numerica_domain::best_score::{BestScore, BestScoreRepository, ScoreNamespace};
    use numerica_domain::game::GameStatus;
    use numerica_domain::shared::DomainError;

    #[derive(Default)]
    struct FeedLog {
        connected: bool,
        connects: usize,
        disconnects: usize,
    }

    /// Scripted feed: hands out queued messages, then either closes or stalls.
    /// Running out of messages fires `drained`, which tests use to sequence
    /// the shutdown signal.
    struct MockChatFeed {
        messages: VecDeque<ChatMessage>,
        fail_connect: bool,
        close_when_drained: bool,
        drained: Option<oneshot::Sender<()>>,
        log: Arc<Mutex<FeedLog>>,
    }

    impl MockChatFeed {
        fn new(messages: Vec<ChatMessage>) -> (Self, Arc<Mutex<FeedLog>>, oneshot::Receiver<()>) {
            let log = Arc::new(Mutex::new(FeedLog::default()));
            let (drained_tx, drained_rx) = oneshot::channel();
            let feed = Self {
                messages: messages.into(),
                fail_connect: false,
                close_when_drained: true,
                drained: Some(drained_tx),
                log: log.clone(),
            };
            (feed, log, drained_rx)
        }
    }

    async fn after(signal: oneshot::Receiver<()>) {
        let _ = signal.await;
    }

    #[async_trait]
    impl ChatFeed for MockChatFeed {
        async fn connect(&mut self, _channel: &ChannelName) -> Result<(), DomainError> {
            let mut log = self.log.lock().unwrap();
            log.connects += 1;
            if self.fail_connect {
                return Err(DomainError::Connection("refused".to_string()));
            }
            log.connected = true;
            Ok(())
        }

        async fn next_message(&mut self) -> Option<ChatMessage> {
            if let Some(message) = self.messages.pop_front() {
                return Some(message);
            }
            if let Some(drained) = self.drained.take() {
                let _ = drained.send(());
            }
            if self.close_when_drained {
                None
            } else {
                std::future::pending().await
            }
        }

        async fn disconnect(&mut self) -> Result<(), DomainError> {
            let mut log = self.log.lock().unwrap();
            log.disconnects += 1;
            log.connected = false;
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingView {
        boards: Arc<Mutex<Vec<Scoreboard>>>,
    }

    impl ScoreboardView for RecordingView {
        fn render(&mut self, board: &Scoreboard) {
            self.boards.lock().unwrap().push(board.clone());
        }
    }

    struct InMemoryBestScoreRepository {
        scores: tokio::sync::RwLock<HashMap<String, BestScore>>,
    }

    #[async_trait]
    impl BestScoreRepository for InMemoryBestScoreRepository {
        async fn get(&self, namespace: &ScoreNamespace) -> Result<BestScore, DomainError> {
            let scores = self.scores.read().await;
            Ok(scores.get(namespace.as_str()).cloned().unwrap_or_default())
        }

        async fn set(
            &self,
            namespace: &ScoreNamespace,
            score: &BestScore,
        ) -> Result<(), DomainError> {
            let mut scores = self.scores.write().await;
            scores.insert(namespace.as_str().to_string(), score.clone());
            Ok(())
        }
    }

    async fn store_with(max_score: u64) -> (BestScoreStore, Arc<InMemoryBestScoreRepository>) {
        let repo = Arc::new(InMemoryBestScoreRepository {
            scores: tokio::sync::RwLock::new(HashMap::new()),
        });
        repo.set(
            &ScoreNamespace::default(),
            &BestScore::restore(max_score, chrono::Utc::now()),
        )
        .await
        .unwrap();
        let store = BestScoreStore::load(repo.clone(), ScoreNamespace::default())
            .await
            .unwrap();
        (store, repo)
    }

    fn channel() -> ChannelName {
        ChannelName::new("rothiotome").unwrap()
    }

    #[tokio::test]
    async fn test_scenario_breaks_streak_and_records_best_score() {
        let (feed, log, drained) = MockChatFeed::new(vec![
            ChatMessage::new("A", "1"),
            ChatMessage::new("B", "2"),
            ChatMessage::new("A", "4"),
        ]);
        let (store, repo) = store_with(1).await;
        let view = RecordingView::default();
        let boards = view.boards.clone();

        let session = GameSession::new(channel(), feed, store, view);
        let board = session.run(after(drained)).await;

        assert_eq!(board.status, GameStatus::GameOver);
        assert_eq!(board.count, 0);
        assert_eq!(board.last_user, "A");
        assert_eq!(board.max_score, 2);

        let rendered: Vec<String> = boards
            .lock()
            .unwrap()
            .iter()
            .map(crate::presentation::view::format_scoreboard)
            .collect();
        assert_eq!(
            rendered,
            vec![
                "Max Score: 1 | 0",
                "Max Score: 1 | 1 | A",
                "Max Score: 1 | 2 | B",
                "Max Score: 2 | 0 | Blame on A!",
            ]
        );

        let persisted = repo.get(&ScoreNamespace::default()).await.unwrap();
        assert_eq!(persisted.max_score(), 2);

        let log = log.lock().unwrap();
        assert_eq!(log.connects, 1);
        assert_eq!(log.disconnects, 1);
        assert!(!log.connected);
    }

    #[tokio::test]
    async fn test_ignored_submissions_do_not_render() {
        let (feed, _log, drained) = MockChatFeed::new(vec![
            ChatMessage::new("A", "1"),
            ChatMessage::new("A", "2"),
            ChatMessage::new("B", "hello"),
            ChatMessage::new("B", "2.5"),
            ChatMessage::new("B", "2"),
        ]);
        let (store, _repo) = store_with(0).await;
        let view = RecordingView::default();
        let boards = view.boards.clone();

        let board = GameSession::new(channel(), feed, store, view)
            .run(after(drained))
            .await;

        assert_eq!(board.status, GameStatus::Started);
        assert_eq!(board.count, 2);
        assert_eq!(board.last_user, "B");
        // initial render plus two advances
        assert_eq!(boards.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_own_messages_never_reach_the_tracker() {
        let (feed, _log, drained) = MockChatFeed::new(vec![
            ChatMessage::new("A", "1"),
            ChatMessage::from_self("CountBot", "5"),
            ChatMessage::new("B", "2"),
        ]);
        let (store, _repo) = store_with(0).await;

        let board = GameSession::new(channel(), feed, store, RecordingView::default())
            .run(after(drained))
            .await;

        assert_eq!(board.status, GameStatus::Started);
        assert_eq!(board.count, 2);
    }

    #[tokio::test]
    async fn test_zero_length_break_returns_to_idle() {
        let (feed, _log, drained) = MockChatFeed::new(vec![ChatMessage::new("A", "5")]);
        let (store, _repo) = store_with(3).await;

        let board = GameSession::new(channel(), feed, store, RecordingView::default())
            .run(after(drained))
            .await;

        assert_eq!(board.status, GameStatus::Idle);
        assert_eq!(board.count, 0);
        assert_eq!(board.max_score, 3);
    }

    #[tokio::test]
    async fn test_shutdown_disconnects_a_live_feed() {
        let (mut feed, log, drained) = MockChatFeed::new(vec![ChatMessage::new("A", "1")]);
        feed.close_when_drained = false;
        let (store, _repo) = store_with(0).await;
        let (tx, rx) = oneshot::channel::<()>();

        let session = GameSession::new(channel(), feed, store, RecordingView::default());
        let handle = tokio::spawn(session.run(after(rx)));

        // the feed is connected and idle once its queue has been read empty
        drained.await.unwrap();
        assert!(log.lock().unwrap().connected);

        tx.send(()).unwrap();
        let board = handle.await.unwrap();

        assert_eq!(board.count, 1);
        let log = log.lock().unwrap();
        assert_eq!(log.disconnects, 1);
        assert!(!log.connected);
    }

    #[tokio::test]
    async fn test_connect_failure_waits_for_shutdown_and_disconnects() {
        let (mut feed, log, _drained) = MockChatFeed::new(vec![ChatMessage::new("A", "1")]);
        feed.fail_connect = true;
        let (store, _repo) = store_with(0).await;
        let view = RecordingView::default();
        let boards = view.boards.clone();

        let board = GameSession::new(channel(), feed, store, view)
            .run(async {})
            .await;

        assert_eq!(board.count, 0);
        assert_eq!(board.status, GameStatus::Idle);
        assert_eq!(boards.lock().unwrap().len(), 1);

        let log = log.lock().unwrap();
        assert_eq!(log.connects, 1);
        assert_eq!(log.disconnects, 1);
    }
}
