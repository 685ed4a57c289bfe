//! Live device log stream.
//!
//! Clears the device log buffer, then follows `logcat` and prints the lines
//! that match the filter, with the keyword emphasized. Runs until the stream
//! closes or the cancellation token fires.

use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::process::Child;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::bridge::Bridge;
use crate::cancel::CancelToken;
use crate::config::{LogsConfig, Project};
use crate::error::{Error, Result};
use crate::log_status;
use crate::utils::command::CommandRunner;
use crate::utils::style;

/// How long the foreground loop waits for a line before re-checking the
/// cancellation token.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamState {
    Idle,
    BufferCleared,
    Streaming,
    Interrupted,
    StreamClosed,
}

/// One step of a line source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Line(String),
    Closed,
    Cancelled,
}

/// A cancellable, unbounded sequence of log lines.
pub trait LineSource {
    /// Block until the next line, the end of the stream, or cancellation.
    fn next_line(&mut self, cancel: &CancelToken) -> StreamEvent;
}

/// Decides which lines are shown and how.
#[derive(Debug, Clone)]
pub struct LogFilter {
    keyword: String,
    runtime_marker: String,
    error_marker: String,
    color: bool,
}

impl LogFilter {
    pub fn new(
        keyword: impl Into<String>,
        runtime_marker: impl Into<String>,
        error_marker: impl Into<String>,
        color: bool,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            runtime_marker: runtime_marker.into(),
            error_marker: error_marker.into().to_lowercase(),
            color,
        }
    }

    pub fn from_config(config: &LogsConfig) -> Self {
        Self::new(
            config.keyword.clone(),
            config.runtime_marker.clone(),
            config.error_marker.clone(),
            config.color,
        )
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Plain substring tests; the error marker is case-insensitive.
    pub fn matches(&self, line: &str) -> bool {
        contains(line, &self.keyword)
            || contains(line, &self.runtime_marker)
            || (!self.error_marker.is_empty()
                && line.to_lowercase().contains(&self.error_marker))
    }

    /// Replace every keyword occurrence with its emphasized rendering.
    pub fn render(&self, line: &str) -> String {
        if !self.color || self.keyword.is_empty() {
            return line.to_string();
        }
        line.replace(&self.keyword, &style::emphasize(&self.keyword))
    }

    /// The rendered line when it matches, `None` when it is dropped.
    pub fn apply(&self, line: &str) -> Option<String> {
        if self.matches(line) {
            Some(self.render(line))
        } else {
            None
        }
    }
}

fn contains(line: &str, needle: &str) -> bool {
    !needle.is_empty() && line.contains(needle)
}

/// Strip the line boundary only; everything else is kept verbatim.
fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamOutcome {
    pub state: StreamState,
    pub lines_seen: u64,
    pub lines_emitted: u64,
}

/// Drive a line source through the filter until it closes or is cancelled.
///
/// Each matching line is written and flushed before the next one is read, so
/// cancellation drops at most the line in flight.
pub fn pump(
    source: &mut dyn LineSource,
    filter: &LogFilter,
    cancel: &CancelToken,
    out: &mut dyn Write,
) -> Result<StreamOutcome> {
    let mut outcome = StreamOutcome {
        state: StreamState::Streaming,
        lines_seen: 0,
        lines_emitted: 0,
    };

    loop {
        match source.next_line(cancel) {
            StreamEvent::Line(line) => {
                outcome.lines_seen += 1;
                let Some(rendered) = filter.apply(strip_line_ending(&line)) else {
                    continue;
                };
                match writeln!(out, "{}", rendered).and_then(|_| out.flush()) {
                    Ok(()) => outcome.lines_emitted += 1,
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                        outcome.state = StreamState::StreamClosed;
                        return Ok(outcome);
                    }
                    Err(e) => {
                        return Err(Error::internal_io(
                            e.to_string(),
                            Some("write log line".to_string()),
                        ))
                    }
                }
            }
            StreamEvent::Closed => {
                outcome.state = StreamState::StreamClosed;
                return Ok(outcome);
            }
            StreamEvent::Cancelled => {
                outcome.state = StreamState::Interrupted;
                return Ok(outcome);
            }
        }
    }
}

/// Owns a child process and kills it when dropped, on every exit path.
struct ChildGuard {
    child: Child,
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

/// Lines from a child's stdout, read on a helper thread and handed over a
/// channel so the caller can poll the cancellation token between lines.
pub struct ProcessLineSource {
    _guard: ChildGuard,
    lines: Receiver<Vec<u8>>,
}

impl ProcessLineSource {
    /// Take over a spawned child whose stdout is piped.
    pub fn from_child(mut child: Child) -> Result<Self> {
        let stdout = child.stdout.take().ok_or_else(|| {
            Error::internal_unexpected("log stream process has no piped stdout")
        })?;
        let guard = ChildGuard { child };

        let (tx, rx) = mpsc::channel();
        // Detached: a daemon forked by the bridge can keep the pipe open after
        // the child is killed, so joining could block forever.
        thread::spawn(move || {
            let mut reader = BufReader::new(stdout);
            loop {
                let mut buf = Vec::new();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {
                        if tx.send(buf).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Ok(Self {
            _guard: guard,
            lines: rx,
        })
    }
}

impl LineSource for ProcessLineSource {
    fn next_line(&mut self, cancel: &CancelToken) -> StreamEvent {
        loop {
            if cancel.is_cancelled() {
                return StreamEvent::Cancelled;
            }
            match self.lines.recv_timeout(POLL_INTERVAL) {
                Ok(bytes) => return StreamEvent::Line(String::from_utf8_lossy(&bytes).into_owned()),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return end_of_stream(cancel),
            }
        }
    }
}

/// The interrupt also reaches the bridge child, which may exit before the
/// next poll sees the token. A close after cancellation counts as cancelled.
fn end_of_stream(cancel: &CancelToken) -> StreamEvent {
    if cancel.is_cancelled() {
        StreamEvent::Cancelled
    } else {
        StreamEvent::Closed
    }
}

/// Sleep for `duration` in poll-sized steps. Returns false when cancelled.
fn settle(duration: Duration, cancel: &CancelToken) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        if cancel.is_cancelled() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSessionReport {
    pub buffer_cleared: bool,
    pub keyword: String,
    /// Every state the session passed through, ending in a terminal one.
    pub transitions: Vec<StreamState>,
    #[serde(flatten)]
    pub outcome: StreamOutcome,
}

/// Clear the device buffer, then stream and filter the log until it closes or
/// `cancel` fires. A failed buffer clear is reported and the stream still opens.
pub fn follow(
    project: &Project,
    bridge: &Bridge,
    runner: &dyn CommandRunner,
    cancel: &CancelToken,
    out: &mut dyn Write,
) -> Result<LogSessionReport> {
    let config = &project.config.logs;
    let filter = LogFilter::from_config(config);
    let mut report = LogSessionReport {
        buffer_cleared: false,
        keyword: filter.keyword().to_string(),
        transitions: vec![StreamState::Idle],
        outcome: StreamOutcome {
            state: StreamState::Idle,
            lines_seen: 0,
            lines_emitted: 0,
        },
    };

    if cancel.is_cancelled() {
        return Ok(interrupted(report));
    }

    log_status!("logs", "Clearing device log buffer");
    report.buffer_cleared = bridge.clear_log(runner).success;
    if report.buffer_cleared {
        report.transitions.push(StreamState::BufferCleared);
    } else {
        eprintln!("Warning: log buffer was not cleared; older lines may appear");
    }

    if !settle(Duration::from_millis(config.settle_ms), cancel) {
        return Ok(interrupted(report));
    }
    if config.clear_screen && io::stdout().is_terminal() {
        let _ = write!(out, "{}", style::CLEAR_SCREEN);
    }

    log_status!(
        "logs",
        "Streaming lines matching '{}' (Ctrl+C to stop)",
        filter.keyword()
    );

    if cancel.is_cancelled() {
        return Ok(interrupted(report));
    }
    let child = bridge.spawn_log_stream()?;
    let mut source = ProcessLineSource::from_child(child)?;
    report.transitions.push(StreamState::Streaming);

    let outcome = pump(&mut source, &filter, cancel, out)?;
    drop(source);
    report.transitions.push(outcome.state);

    match outcome.state {
        StreamState::Interrupted => log_status!("logs", "Stopped."),
        _ => log_status!("logs", "Log stream closed."),
    }

    report.outcome = outcome;
    Ok(report)
}

/// End a session that was cancelled before the stream opened.
fn interrupted(mut report: LogSessionReport) -> LogSessionReport {
    log_status!("logs", "Stopped.");
    report.transitions.push(StreamState::Interrupted);
    report.outcome.state = StreamState::Interrupted;
    report
}
