use std::fmt;
use std::time::Duration;
use tokio::sync::broadcast;

/// Side-channel updates published while an analysis is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// A loading message for the current stage.
    Stage(String),
    /// A page of comments arrived.
    Fetched { retrieved: usize, total: u64 },
    /// A page request failed and is about to be retried.
    Retrying { attempt: u32, delay: Duration },
    /// A batch is being sent to the classifier.
    Classified { processed: usize, total: usize },
    /// The run ended, successfully or not.
    Finished,
}

impl Progress {
    /// Rounded completion percentage, when the update carries one.
    pub fn percent(&self) -> Option<u32> {
        let (done, total) = match self {
            Progress::Fetched { retrieved, total } => (*retrieved as f64, *total as f64),
            Progress::Classified { processed, total } => (*processed as f64, *total as f64),
            _ => return None,
        };
        if total <= 0.0 {
            return None;
        }
        Some((done / total * 100.0).round() as u32)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::Stage(message) => f.write_str(message),
            Progress::Fetched { retrieved, total } => {
                write!(f, "Fetching comments: {} of {}", retrieved, total)
            }
            Progress::Retrying { attempt, delay } => write!(
                f,
                "Request failed, retrying (attempt {}) in {}s...",
                attempt,
                delay.as_secs_f64()
            ),
            Progress::Classified { processed, total } => {
                write!(f, "Analyzing comments... {}/{}", processed, total)
            }
            Progress::Finished => f.write_str("Done"),
        }
    }
}

/// Publishing end of the progress channel. Having no listeners is normal.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: Option<broadcast::Sender<Progress>>,
}

impl ProgressSink {
    pub fn new(tx: broadcast::Sender<Progress>) -> Self {
        Self { tx: Some(tx) }
    }

    #[cfg(test)]
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, progress: Progress) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(progress);
        }
    }

    pub fn stage(&self, message: impl Into<String>) {
        self.emit(Progress::Stage(message.into()));
    }
}

#[cfg(test)]
pub(crate) fn drain(rx: &mut broadcast::Receiver<Progress>) -> Vec<Progress> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
