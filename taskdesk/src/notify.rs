//! User-facing notifications (toasts).
//!
//! Holders and the front-end push [`Notice`]s into a bounded channel; the
//! front-end drains and renders them. Sending never blocks and never fails
//! the operation that emitted the notice.

use tokio::sync::mpsc;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Operation completed.
    Success,
    /// Operation failed.
    Error,
    /// Input needs attention.
    Warning,
    /// Informational.
    Info,
}

impl std::fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "ok"),
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warn"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A toast: a title and an optional longer description.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Headline.
    pub title: String,
    /// Supporting text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level, self.title)?;
        if let Some(description) = &self.description {
            write!(f, ": {description}")?;
        }
        Ok(())
    }
}

/// Sending half of the notice channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::Sender<Notice>,
}

impl Notifier {
    /// Creates a notifier and the receiver the front-end drains.
    #[must_use]
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Notice>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { tx }, rx)
    }

    /// A notifier whose notices go nowhere.
    #[must_use]
    pub fn discard() -> Self {
        Self::channel(1).0
    }

    /// Emits a success notice.
    pub fn success(&self, title: impl Into<String>, description: impl Into<String>) {
        self.emit(NoticeLevel::Success, title.into(), Some(description.into()));
    }

    /// Emits an error notice.
    pub fn error(&self, title: impl Into<String>, description: impl Into<String>) {
        self.emit(NoticeLevel::Error, title.into(), Some(description.into()));
    }

    /// Emits a warning notice.
    pub fn warning(&self, title: impl Into<String>, description: impl Into<String>) {
        self.emit(NoticeLevel::Warning, title.into(), Some(description.into()));
    }

    /// Emits an informational notice with no description.
    pub fn info(&self, title: impl Into<String>) {
        self.emit(NoticeLevel::Info, title.into(), None);
    }

    fn emit(&self, level: NoticeLevel, title: String, description: Option<String>) {
        let notice = Notice {
            level,
            title,
            description,
        };
        if let Err(e) = self.tx.try_send(notice) {
            tracing::debug!(error = %e, "notice dropped");
        }
    }
}
