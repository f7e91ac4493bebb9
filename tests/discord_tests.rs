use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{TimeDelta, TimeZone, Utc};

use bundesliga_ticker::config::FeedSettings;
use bundesliga_ticker::discord::{BoardPublisher, Discord, DiscordRenderer, WebhookPoster};
use bundesliga_ticker::error::FeedError;
use bundesliga_ticker::feed::build_views;
use bundesliga_ticker::model::match_view::MatchView;
use bundesliga_ticker::model::raw_match::{MatchResult, RawMatch};
use bundesliga_ticker::openliga::OpenLiga;
use bundesliga_ticker::render::Renderer;
use bundesliga_ticker::ticker::{MatchSource, Ticker};

#[derive(Clone, Default)]
struct RecordingPoster {
    posts: Arc<Mutex<Vec<String>>>,
    fail: Arc<AtomicBool>,
}

impl WebhookPoster for RecordingPoster {
    fn post(&self, content: &str) -> Result<(), String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("webhook unavailable".to_string());
        }
        self.posts.lock().unwrap().push(content.to_string());
        Ok(())
    }
}

/// Hangs in `post` until the test opens the gate, like a webhook that never answers.
struct GatedPoster {
    entered: Sender<()>,
    gate: Receiver<()>,
    posts: Arc<Mutex<Vec<String>>>,
}

impl WebhookPoster for GatedPoster {
    fn post(&self, content: &str) -> Result<(), String> {
        let _ = self.entered.send(());
        self.gate.recv().map_err(|_| "gate closed".to_string())?;
        self.posts.lock().unwrap().push(content.to_string());
        Ok(())
    }
}

struct Gate {
    entered: Receiver<()>,
    open: Sender<()>,
    posts: Arc<Mutex<Vec<String>>>,
}

fn gated_poster() -> (GatedPoster, Gate) {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (open_tx, open_rx) = mpsc::channel();
    let posts = Arc::new(Mutex::new(Vec::new()));
    let poster = GatedPoster { entered: entered_tx, gate: open_rx, posts: Arc::clone(&posts) };
    (poster, Gate { entered: entered_rx, open: open_tx, posts })
}

struct NoMatches;

impl MatchSource for NoMatches {
    fn fetch_matches(&self) -> Result<Vec<RawMatch>, FeedError> {
        Err(FeedError::Empty)
    }
}

fn wait_for_posts(posts: &Arc<Mutex<Vec<String>>>, count: usize) -> Vec<String> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        let current = posts.lock().unwrap().clone();
        if current.len() >= count {
            return current;
        }
        thread::sleep(Duration::from_millis(10));
    }
    panic!("expected {} posts, got {:?}", count, posts.lock().unwrap());
}

/// Board as seen `elapsed` minutes after 14:00 UTC; kickoffs stay fixed.
fn board(score: Option<(f64, f64)>, elapsed: i64) -> Vec<MatchView> {
    let base = Utc.with_ymd_and_hms(2024, 8, 24, 14, 0, 0).unwrap();
    let now = base + TimeDelta::minutes(elapsed);
    let live = RawMatch {
        match_id: Some(1),
        team1: Some("Borussia Dortmund".into()),
        team2: Some("Eintracht Frankfurt".into()),
        kickoff: base - TimeDelta::minutes(30),
        finished: false,
        live: Some(true),
        results: score
            .map(|(a, b)| vec![MatchResult { result_type_id: Some(1), name: None, points_team1: Some(a), points_team2: Some(b) }])
            .unwrap_or_default(),
    };
    let soon = RawMatch {
        match_id: Some(2),
        team1: Some("RB Leipzig".into()),
        team2: None,
        kickoff: base + TimeDelta::minutes(45),
        finished: false,
        live: None,
        results: vec![],
    };
    build_views(&[live, soon], now, &FeedSettings::default())
}

#[test]
fn discord_debug_shows_hook_url() {
    let d1 = Discord::new("https://example.invalid/webhook".to_string(), Duration::from_secs(5));
    let d2 = d1.clone();
    assert_eq!(format!("{:?}", d1), format!("{:?}", d2));
    assert!(format!("{:?}", d1).contains("https://example.invalid/webhook"));
}

#[test]
fn discord_post_gives_up_after_timeout() {
    // Accepts connections (via the backlog) but never answers.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/webhook", listener.local_addr().unwrap());
    let discord = Discord::new(url, Duration::from_secs(1));

    let started = Instant::now();
    let result = discord.post("hello");
    assert!(result.is_err(), "post should time out");
    assert!(started.elapsed() < Duration::from_secs(10), "took {:?}", started.elapsed());
    drop(listener);
}

#[test]
fn board_message_lists_every_match() {
    let msg = BoardPublisher::<RecordingPoster>::board_message(&board(Some((1.0, 0.0)), 0)).unwrap();
    assert!(msg.contains("Borussia Dortmund - Eintracht Frankfurt  1:0  LIVE"), "message was: {}", msg);
    assert!(msg.contains("RB Leipzig - Team B  -:-  In Kürze • 45 Min"), "message was: {}", msg);
    assert!(BoardPublisher::<RecordingPoster>::board_message(&[]).is_none());
}

#[test]
fn posts_only_when_scores_or_statuses_change() {
    let poster = RecordingPoster::default();
    let posts = Arc::clone(&poster.posts);
    let mut publisher = BoardPublisher::new(poster);

    assert!(publisher.publish(&board(Some((1.0, 0.0)), 0)));
    // Only the countdown moved.
    assert!(!publisher.publish(&board(Some((1.0, 0.0)), 1)));
    assert_eq!(posts.lock().unwrap().len(), 1);

    assert!(publisher.publish(&board(Some((2.0, 0.0)), 1)));
    assert_eq!(posts.lock().unwrap().len(), 2);
    assert!(posts.lock().unwrap()[1].contains("2:0"));
}

#[test]
fn failed_post_is_retried_with_next_board() {
    let poster = RecordingPoster::default();
    let posts = Arc::clone(&poster.posts);
    let fail = Arc::clone(&poster.fail);
    let mut publisher = BoardPublisher::new(poster);

    fail.store(true, Ordering::SeqCst);
    assert!(!publisher.publish(&board(None, 0)));
    assert!(posts.lock().unwrap().is_empty());

    fail.store(false, Ordering::SeqCst);
    assert!(publisher.publish(&board(None, 0)));
    assert_eq!(posts.lock().unwrap().len(), 1);
}

#[test]
fn empty_board_is_not_posted() {
    let poster = RecordingPoster::default();
    let posts = Arc::clone(&poster.posts);
    let mut publisher = BoardPublisher::new(poster);
    assert!(!publisher.publish(&[]));
    assert!(posts.lock().unwrap().is_empty());
}

#[test]
fn renderer_posts_in_background() {
    let poster = RecordingPoster::default();
    let posts = Arc::clone(&poster.posts);
    let mut renderer = DiscordRenderer::new(poster);
    renderer.render(&board(Some((1.0, 0.0)), 0), "Aktualisiert: 16:00:00");
    let posts = wait_for_posts(&posts, 1);
    assert!(posts[0].contains("1:0"), "posts were: {:?}", posts);
}

#[test]
fn renderer_returns_while_webhook_hangs_and_skips_stale_boards() {
    let (poster, gate) = gated_poster();
    let mut renderer = DiscordRenderer::new(poster);

    renderer.render(&board(Some((1.0, 0.0)), 0), "a");
    gate.entered.recv_timeout(Duration::from_secs(5)).expect("first post started");

    // The worker is stuck in the first post; these must not wait for it.
    let (done_tx, done_rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        renderer.render(&board(Some((2.0, 0.0)), 1), "b");
        renderer.render(&board(Some((3.0, 0.0)), 2), "c");
        let _ = done_tx.send(());
        renderer
    });
    done_rx.recv_timeout(Duration::from_secs(5)).expect("render blocked on the webhook");
    let _renderer = handle.join().unwrap();

    gate.open.send(()).unwrap();
    gate.entered.recv_timeout(Duration::from_secs(5)).expect("second post started");
    gate.open.send(()).unwrap();

    let posts = wait_for_posts(&gate.posts, 2);
    assert_eq!(posts.len(), 2);
    assert!(posts[0].contains("1:0"));
    assert!(posts[1].contains("3:0"), "newest board wins: {:?}", posts);
}

#[test]
fn hanging_webhook_does_not_block_the_ticker() {
    let body = std::fs::read_to_string("tests/matchdata_bl1.json").expect("failed to read matchdata_bl1.json");
    let matches = OpenLiga::parse_matches(&body, chrono_tz::Europe::Berlin).expect("fixture parses");
    let (poster, gate) = gated_poster();
    let renderers: Vec<Box<dyn Renderer>> = vec![Box::new(DiscordRenderer::new(poster))];
    let ticker = Arc::new(Ticker::new(Arc::new(NoMatches), renderers, FeedSettings::default()));

    let (done_tx, done_rx) = mpsc::channel();
    let worker = Arc::clone(&ticker);
    thread::spawn(move || {
        let first = worker.begin_cycle();
        let now = Utc.with_ymd_and_hms(2024, 8, 25, 12, 0, 0).unwrap();
        worker.complete_cycle(first, Ok(matches), now);
        let _ = done_tx.send(worker.begin_cycle().id());
    });

    gate.entered.recv_timeout(Duration::from_secs(5)).expect("webhook post started");
    let next = done_rx.recv_timeout(Duration::from_secs(5)).expect("ticker stayed locked while the webhook hung");
    assert_eq!(next, 2);
    assert_eq!(ticker.matches().len(), 4);
}
