//! Request handler driven end to end with mock backend and messenger

mod mocks;

use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use teloxide::types::{ChatId, MessageId};

use grabbot::telegram::handlers::request::{
    DELIVERY_FAILED_TEXT, DOWNLOADING_TEXT, DOWNLOAD_FAILED_TEXT, INVALID_URL_TEXT, SENDING_TEXT, TIMEOUT_TEXT,
};
use grabbot::telegram::{RequestHandler, RequestOutcome};
use mocks::{MockBehavior, MockDownloader, MockMessenger, SentEvent};

const MIB: u64 = 1024 * 1024;
const CHAT: ChatId = ChatId(42);
const REQUEST: MessageId = MessageId(7);

fn handler(root: &Path, downloader: Arc<MockDownloader>, timeout: Duration) -> RequestHandler {
    RequestHandler::new(downloader, root, timeout, 50 * MIB)
}

fn files_under(root: &Path) -> Vec<std::path::PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else {
                found.push(path);
            }
        }
    }
    found
}

#[tokio::test]
async fn test_small_video_is_delivered_and_removed() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = Arc::new(MockDownloader::producing("Cat video", "mp4", 3 * MIB));
    let messenger = MockMessenger::new();

    let outcome = handler(dir.path(), downloader.clone(), Duration::from_secs(5))
        .handle_url(&messenger, CHAT, REQUEST, "  https://example.com/watch?v=1  ")
        .await;

    assert_eq!(outcome, RequestOutcome::Delivered);
    assert_eq!(downloader.calls(), 1);

    let events = messenger.events();
    let status_id = match &events[0] {
        SentEvent::Text { text, message_id, .. } => {
            assert_eq!(text, DOWNLOADING_TEXT);
            *message_id
        }
        other => panic!("expected status message, got {:?}", other),
    };
    assert_eq!(
        events[1],
        SentEvent::Edit {
            message_id: status_id,
            text: SENDING_TEXT.to_string()
        }
    );
    match &events[2] {
        SentEvent::Video { caption, existed, path } => {
            assert_eq!(caption, "Your video: Cat video");
            assert!(*existed);
            assert!(path.starts_with(dir.path().join("42-7")));
        }
        other => panic!("expected video upload, got {:?}", other),
    }
    assert_eq!(events[3], SentEvent::Delete { message_id: status_id });

    assert!(files_under(dir.path()).is_empty());
    assert!(!dir.path().join("42-7").exists());
}

#[tokio::test]
async fn test_oversize_file_is_never_sent_and_deleted() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = Arc::new(MockDownloader::producing("Huge", "mp4", 60 * MIB));
    let messenger = MockMessenger::new();

    let outcome = handler(dir.path(), downloader, Duration::from_secs(5))
        .handle_url(&messenger, CHAT, REQUEST, "https://example.com/huge")
        .await;

    assert_eq!(outcome, RequestOutcome::Oversize { size_bytes: 60 * MIB });
    assert!(messenger.videos().is_empty());

    let last = messenger.last_text().unwrap();
    assert!(last.contains("too large"), "unexpected text: {}", last);
    assert!(last.contains("60.0"), "unexpected text: {}", last);

    assert!(files_under(dir.path()).is_empty());
}

#[tokio::test]
async fn test_file_exactly_at_limit_is_sent() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = Arc::new(MockDownloader::producing("Edge", "mp4", 50 * MIB));
    let messenger = MockMessenger::new();

    let outcome = handler(dir.path(), downloader, Duration::from_secs(5))
        .handle_url(&messenger, CHAT, REQUEST, "https://example.com/edge")
        .await;

    assert_eq!(outcome, RequestOutcome::Delivered);
    assert_eq!(messenger.videos().len(), 1);
}

#[tokio::test]
async fn test_download_failure_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = Arc::new(MockDownloader::new(MockBehavior::Fail {
        message: "ERROR: Unsupported URL".into(),
    }));
    let messenger = MockMessenger::new();

    let outcome = handler(dir.path(), downloader, Duration::from_secs(5))
        .handle_url(&messenger, CHAT, REQUEST, "https://example.com/nothing")
        .await;

    assert_eq!(outcome, RequestOutcome::DownloadFailed);
    assert_eq!(messenger.texts(), vec![DOWNLOADING_TEXT.to_string(), DOWNLOAD_FAILED_TEXT.to_string()]);
    assert!(messenger.videos().is_empty());
    assert!(files_under(dir.path()).is_empty());
    assert!(!dir.path().join("42-7").exists());
}

#[tokio::test]
async fn test_timeout_stops_download_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = Arc::new(MockDownloader::new(MockBehavior::Hang));
    let messenger = MockMessenger::new();

    let outcome = tokio::time::timeout(
        Duration::from_secs(10),
        handler(dir.path(), downloader, Duration::from_millis(100)).handle_url(
            &messenger,
            CHAT,
            REQUEST,
            "https://example.com/slow",
        ),
    )
    .await
    .expect("handler must give up after the download timeout");

    assert_eq!(outcome, RequestOutcome::TimedOut);
    assert_eq!(messenger.last_text().unwrap(), TIMEOUT_TEXT);
    assert!(files_under(dir.path()).is_empty());
    assert!(!dir.path().join("42-7").exists());
}

#[tokio::test]
async fn test_delivery_failure_still_removes_file() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = Arc::new(MockDownloader::producing("Clip", "webm", MIB));
    let messenger = MockMessenger::failing_video();

    let outcome = handler(dir.path(), downloader, Duration::from_secs(5))
        .handle_url(&messenger, CHAT, REQUEST, "https://example.com/clip")
        .await;

    assert_eq!(outcome, RequestOutcome::DeliveryFailed);
    assert_eq!(messenger.last_text().unwrap(), DELIVERY_FAILED_TEXT);
    assert!(files_under(dir.path()).is_empty());
}

#[tokio::test]
async fn test_invalid_link_is_rejected_without_download() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = Arc::new(MockDownloader::producing("x", "mp4", 1));
    let messenger = MockMessenger::new();
    let handler = handler(dir.path(), downloader.clone(), Duration::from_secs(5));

    for text in ["hello", "ftp://example.com/file", "https://"] {
        let outcome = handler.handle_url(&messenger, CHAT, REQUEST, text).await;
        assert_eq!(outcome, RequestOutcome::InvalidUrl, "text: {:?}", text);
    }

    assert_eq!(downloader.calls(), 0);
    assert_eq!(messenger.texts(), vec![INVALID_URL_TEXT.to_string(); 3]);
}

#[tokio::test]
async fn test_concurrent_requests_use_separate_directories() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = Arc::new(MockDownloader::producing("Same title", "mp4", MIB));
    let messenger = MockMessenger::new();
    let handler = handler(dir.path(), downloader.clone(), Duration::from_secs(5));

    let (a, b) = tokio::join!(
        handler.handle_url(&messenger, CHAT, MessageId(1), "https://example.com/a"),
        handler.handle_url(&messenger, ChatId(43), MessageId(1), "https://example.com/b"),
    );

    assert_eq!(a, RequestOutcome::Delivered);
    assert_eq!(b, RequestOutcome::Delivered);
    assert_eq!(downloader.calls(), 2);
    assert_eq!(messenger.videos().len(), 2);
    assert!(files_under(dir.path()).is_empty());
}
