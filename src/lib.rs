//! Digital media release consent form: validates a submission, fits the drawn
//! signature, fills the Word template and delivers the result.

pub mod agreement;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod identity;
pub mod notice;
pub mod session;
pub mod signature;
pub mod validate;

pub use config::Config;
pub use dispatch::{Dispatcher, MailRelay, SmtpRelay};
pub use document::{DocumentPopulator, FormSubmission, PopulatedDocument};
pub use error::{DispatchError, DocumentError, PipelineError, Rejection};
pub use identity::{AddressSource, FixedAddress, IdSource, LocalIdSource, LocalNetworkAddress, RemoteIdSource};
pub use notice::{ConsoleNotifier, MemoryNotifier, Notice, Notifier};
pub use session::{FormInput, Session, SessionController, SessionState, SubmitOutcome, Transition};
