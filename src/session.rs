//! One form session: gates, then signature -> document -> email -> download.
//!
//! The state is a plain value handed to [`SessionController::submit`] and
//! handed back, so each session carries its own copy.

use crate::dispatch::{Dispatcher, offer_download};
use crate::document::{DocumentPopulator, FormSubmission, PopulatedDocument};
use crate::error::{PipelineError, Rejection};
use crate::notice::{Notice, Notifier};
use crate::signature::prepare_signature;
use crate::validate::{is_signature_drawn, is_valid_email};
use chrono::Local;
use image::RgbaImage;
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

pub const THANK_YOU: &str = "Thank you for submitting your consent.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Open,
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub state: SessionState,
    /// Shown on the form and written into every date field.
    pub shared_date: String,
}

impl Session {
    pub fn start() -> Self {
        Self::with_date(Local::now().format("%d-%m-%Y").to_string())
    }

    pub fn with_date(shared_date: impl Into<String>) -> Self {
        Self {
            state: SessionState::Open,
            shared_date: shared_date.into(),
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.state == SessionState::Submitted
    }
}

/// What the user entered. `signature` is the canvas, `None` if never touched.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pub learner_name: String,
    pub learner_email: String,
    pub learner_phone: String,
    pub parent_signature: String,
    pub signature: Option<RgbaImage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The session was already submitted; nothing ran.
    Inert,
    Rejected(Rejection),
    /// Populating failed and was reported. Nothing was sent.
    DocumentFailed,
    Submitted(PopulatedDocument),
    /// Something escaped the pipeline; the session was replaced by a fresh one.
    Restarted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub session: Session,
    pub outcome: SubmitOutcome,
}

/// Email first, then the required fields, then the signature.
pub fn check_gates(form: &FormInput) -> Result<(), Rejection> {
    if !is_valid_email(&form.learner_email) {
        return Err(Rejection::InvalidEmail);
    }
    if form.learner_name.is_empty() || form.learner_email.is_empty() || form.learner_phone.is_empty() {
        return Err(Rejection::MissingRequiredField);
    }
    if !is_signature_drawn(form.signature.as_ref()) {
        return Err(Rejection::MissingSignature);
    }
    Ok(())
}

pub struct SessionController {
    populator: DocumentPopulator,
    dispatcher: Dispatcher,
    work_dir: PathBuf,
    restart_delay: Duration,
}

impl SessionController {
    pub fn new(
        populator: DocumentPopulator,
        dispatcher: Dispatcher,
        work_dir: impl Into<PathBuf>,
        restart_delay: Duration,
    ) -> Self {
        Self {
            populator,
            dispatcher,
            work_dir: work_dir.into(),
            restart_delay,
        }
    }

    /// Handles one click on Submit.
    ///
    /// Blocks for the whole pipeline. After an unexpected failure it also
    /// blocks for the restart delay and returns a brand-new session.
    pub fn submit(&self, session: Session, form: &FormInput, notifier: &dyn Notifier) -> Transition {
        if session.is_submitted() {
            debug!("Submit ignored, session already submitted");
            return Transition {
                session,
                outcome: SubmitOutcome::Inert,
            };
        }

        if let Err(rejection) = check_gates(form) {
            info!("Submission rejected: {}", rejection);
            let notice = match rejection {
                Rejection::InvalidEmail => Notice::warning(rejection.to_string()),
                _ => Notice::error(rejection.to_string()),
            };
            notifier.notify(notice);
            return Transition {
                session,
                outcome: SubmitOutcome::Rejected(rejection),
            };
        }

        match self.run_pipeline(&session, form, notifier) {
            Ok(Some(document)) => {
                notifier.notify(Notice::success(THANK_YOU));
                Transition {
                    session: Session {
                        state: SessionState::Submitted,
                        ..session
                    },
                    outcome: SubmitOutcome::Submitted(document),
                }
            }
            Ok(None) => Transition {
                session,
                outcome: SubmitOutcome::DocumentFailed,
            },
            Err(e) => {
                self.restart(&e, notifier);
                Transition {
                    session: Session::start(),
                    outcome: SubmitOutcome::Restarted,
                }
            }
        }
    }

    fn run_pipeline(
        &self,
        session: &Session,
        form: &FormInput,
        notifier: &dyn Notifier,
    ) -> Result<Option<PopulatedDocument>, PipelineError> {
        let canvas = form
            .signature
            .as_ref()
            .ok_or_else(|| PipelineError::Unexpected("signature canvas is missing".into()))?;

        let submission = FormSubmission {
            learner_name: form.learner_name.clone(),
            learner_email: form.learner_email.clone(),
            learner_phone: form.learner_phone.clone(),
            shared_date: session.shared_date.clone(),
            parent_signature: form.parent_signature.clone(),
        };

        // Persist the canvas and fit it into the signature cell
        let asset = prepare_signature(canvas, &form.learner_name, &self.work_dir)?;
        info!(
            "Signature from {} fitted to {}x{}",
            asset.original_path.display(),
            asset.width,
            asset.height
        );

        // Fill the template

        let document = match self.populator.populate(&submission, &asset.resized_path, notifier) {
            Ok(document) => document,
            Err(e) => {
                error!("Document population failed: {}", e);
                notifier.notify(Notice::error(format!("Error processing the document: {}", e)));
                return Ok(None);
            }
        };

        // Email it, then hand it to the user
        self.dispatcher.send_email(&document.path, notifier);
        offer_download(&document, notifier);
        Ok(Some(document))
    }

    fn restart(&self, cause: &PipelineError, notifier: &dyn Notifier) {
        warn!("Restarting session after unexpected error: {}", cause);
        notifier.notify(Notice::error("An unexpected error occurred"));
        notifier.notify(Notice::error(format!(
            "Restarting in {} SECONDS. . .",
            self.restart_delay.as_secs()
        )));
        notifier.notify(Notice::error(format!(
            "Please take screenshot of the following error and share with Developer: \n{}",
            cause
        )));
        thread::sleep(self.restart_delay);
    }
}
