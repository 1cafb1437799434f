//! Fixtures that run a collector on an ephemeral port, writing into a
//! temporary directory, with its session events captured on a channel.

use std::{
    fs,
    net::SocketAddr,
    path::PathBuf,
    thread,
    time::Duration,
};

use crossbeam_channel::{Receiver, unbounded};
use linecast::{CollectorConfig, LogCollector, SessionEvent};
use rstest::fixture;
use tempfile::TempDir;

/// How long tests wait for a session event before failing.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct CollectorHarness {
    pub addr: SocketAddr,
    pub log_path: PathBuf,
    pub events: Receiver<SessionEvent>,
    _dir: TempDir,
}

impl CollectorHarness {
    /// Start a collector using `config` with its address, log path and
    /// event channel overridden.
    pub fn start(config: CollectorConfig) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let log_path = dir.path().join("app.log");
        let (tx, rx) = unbounded();
        let collector = LogCollector::with_config(
            config
                .with_addr("127.0.0.1:0")
                .with_log_path(&log_path)
                .with_events(tx),
        )
        .bind()
        .expect("bind collector");
        let addr = collector.local_addr();
        thread::spawn(move || collector.serve());
        Self {
            addr,
            log_path,
            events: rx,
            _dir: dir,
        }
    }

    /// Block until `count` sessions have disconnected, returning their events.
    #[allow(dead_code)]
    pub fn wait_for_disconnects(&self, count: usize) -> Vec<SessionEvent> {
        let mut seen = Vec::with_capacity(count);
        while seen.len() < count {
            let event = self
                .events
                .recv_timeout(EVENT_TIMEOUT)
                .expect("session event within timeout");
            if matches!(event, SessionEvent::Disconnected { .. }) {
                seen.push(event);
            }
        }
        seen
    }

    #[allow(dead_code)]
    pub fn contents(&self) -> Vec<u8> {
        fs::read(&self.log_path).unwrap_or_default()
    }

    #[allow(dead_code)]
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8(self.contents())
            .expect("log file is UTF-8")
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

/// Collector with default settings.
#[fixture]
pub fn collector() -> CollectorHarness {
    CollectorHarness::start(CollectorConfig::default())
}
