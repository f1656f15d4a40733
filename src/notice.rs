//! User-visible notifications.
//!
//! Failures are handled where they happen and turned into a [`Notice`] that
//! the presentation layer shows as a blocking alert.

use log::*;

pub type NoticeSender = std::sync::mpsc::Sender<Notice>;
pub type NoticeReceiver = std::sync::mpsc::Receiver<Notice>;

/// Distinguishes storage failures from rejected input.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn error(message: &str) -> Self {
        Notice {
            kind: NoticeKind::Error,
            title: "Error".to_string(),
            message: message.to_string(),
        }
    }

    pub fn invalid(message: &str) -> Self {
        Notice {
            kind: NoticeKind::Invalid,
            title: "Error".to_string(),
            message: message.to_string(),
        }
    }
}

/// Return a connected sender/receiver pair.
///
pub fn channel() -> (NoticeSender, NoticeReceiver) {
    std::sync::mpsc::channel()
}

/// Deliver a notice if anyone is listening. A closed channel only loses the
/// alert, so it is logged and otherwise ignored.
///
pub(crate) fn report(sender: Option<&NoticeSender>, notice: Notice) {
    match sender {
        Some(sender) => {
            if let Err(e) = sender.send(notice) {
                warn!("Dropped notice '{}': receiver closed.", e.0.message);
            }
        }
        None => debug!("No notice receiver for '{}'.", notice.message),
    }
}
