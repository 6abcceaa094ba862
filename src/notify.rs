use tracing::{error, info};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

/// A transient message for the user. Every flow reports through this, whether
/// the failure came from the network, the server or local validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Validation failures get their own title; everything else keeps the
    /// caller's title and the error's message.
    pub fn from_error(title: &str, err: &ApiError) -> Self {
        if err.is_validation() {
            Self::error("Validation Error", err.to_string())
        } else {
            Self::error(title, err.to_string())
        }
    }
}

pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Hands a failed call to the notifier. `None` means the caller should stop.
pub fn reported<T>(notifier: &dyn Notifier, title: &str, result: Result<T, ApiError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            notifier.notify(Notification::from_error(title, &e));
            None
        }
    }
}

pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Success => {
                info!(title = %notification.title, message = %notification.message, "notification");
                println!("{}: {}", notification.title, notification.message);
            }
            Level::Error => {
                error!(title = %notification.title, message = %notification.message, "notification");
                eprintln!("{}: {}", notification.title, notification.message);
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingNotifier;
    use super::*;

    #[test]
    fn test_reported_routes_transport_failures_to_notifier() {
        let notifier = RecordingNotifier::default();
        let failed: Result<u32, ApiError> = Err(ApiError::Transport("connection refused".to_string()));
        assert_eq!(reported(&notifier, "Load Failed", failed), None);
        let seen = notifier.last().unwrap();
        assert_eq!(seen.level, Level::Error);
        assert_eq!(seen.title, "Load Failed");
        assert!(seen.message.contains("connection refused"));

        assert_eq!(reported(&notifier, "Load Failed", Ok(7)), Some(7));
        assert_eq!(notifier.count(), 1);
    }

    #[test]
    fn test_validation_errors_get_validation_title() {
        let n = Notification::from_error("Application Failed", &ApiError::validation("Please write a cover letter."));
        assert_eq!(n.level, Level::Error);
        assert_eq!(n.title, "Validation Error");
        assert_eq!(n.message, "Please write a cover letter.");
    }

    #[test]
    fn test_server_errors_keep_caller_title() {
        let err = ApiError::Server {
            status: 400,
            message: "Already applied".to_string(),
        };
        let n = Notification::from_error("Application Failed", &err);
        assert_eq!(n.title, "Application Failed");
        assert_eq!(n.message, "Already applied");
    }
}
