//! Messages shown to the person filling in the form.

use log::{error, info, warn};
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

/// A finished document handed to the user for direct download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOffer {
    pub label: String,
    pub file_name: String,
    pub content_type: &'static str,
    pub contents: Vec<u8>,
}

/// The surface notices and downloads are rendered on.
pub trait Notifier {
    fn notify(&self, notice: Notice);
    fn offer_download(&self, offer: DownloadOffer);
}

/// Prints notices to the terminal and optionally saves offered downloads.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    download_dir: Option<PathBuf>,
}

impl ConsoleNotifier {
    pub fn new(download_dir: Option<PathBuf>) -> Self {
        Self { download_dir }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            Level::Info => {
                info!("{}", notice.message);
                println!("{}", notice.message);
            }
            Level::Success => {
                info!("{}", notice.message);
                println!("✅ {}", notice.message);
            }
            Level::Warning => {
                warn!("{}", notice.message);
                eprintln!("⚠️ {}", notice.message);
            }
            Level::Error => {
                error!("{}", notice.message);
                eprintln!("❌ {}", notice.message);
            }
        }
    }

    fn offer_download(&self, offer: DownloadOffer) {
        println!(
            "{}: {} ({}, {} bytes)",
            offer.label,
            offer.file_name,
            offer.content_type,
            offer.contents.len()
        );
        if let Some(dir) = &self.download_dir {
            let target = dir.join(&offer.file_name);
            let saved = fs::create_dir_all(dir).and_then(|_| fs::write(&target, &offer.contents));
            match saved {
                Ok(()) => {
                    self.notify(Notice::info(format!("Saved a copy to {}", target.display())))
                }
                Err(e) => self.notify(Notice::error(format!("Error with file handling: {}", e))),
            }
        }
    }
}

/// Keeps every notice and offer in order, for front ends that render after the run.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: RefCell<Vec<Notice>>,
    downloads: RefCell<Vec<DownloadOffer>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn downloads(&self) -> Vec<DownloadOffer> {
        self.downloads.borrow().clone()
    }

    pub fn contains(&self, level: Level, message: &str) -> bool {
        self.notices
            .borrow()
            .iter()
            .any(|n| n.level == level && n.message == message)
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }

    fn offer_download(&self, offer: DownloadOffer) {
        self.downloads.borrow_mut().push(offer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_notifier_keeps_order() {
        let notifier = MemoryNotifier::new();
        notifier.notify(Notice::warning("first"));
        notifier.notify(Notice::error("second"));

        let notices = notifier.notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0], Notice::warning("first"));
        assert!(notifier.contains(Level::Error, "second"));
        assert!(!notifier.contains(Level::Warning, "second"));
    }

    #[test]
    fn console_notifier_saves_download_copy() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = ConsoleNotifier::new(Some(dir.path().join("downloads")));
        notifier.offer_download(DownloadOffer {
            label: "Download Your Response".to_string(),
            file_name: "Filled_Consent_Form_abc.docx".to_string(),
            content_type: "application/octet-stream",
            contents: b"doc".to_vec(),
        });

        let saved = fs::read(dir.path().join("downloads/Filled_Consent_Form_abc.docx")).unwrap();
        assert_eq!(saved, b"doc");
    }
}
