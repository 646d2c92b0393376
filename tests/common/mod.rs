#![allow(dead_code)]

use consent_form::dispatch::{Dispatcher, MailRelay};
use consent_form::error::{DispatchError, IdError};
use consent_form::identity::{AddressSource, FixedAddress, IdSource};
use consent_form::{DocumentPopulator, FormInput, SessionController};
use docx_rs::{Docx, Paragraph, Run};
use image::{Rgba, RgbaImage};
use lettre::Message;
use std::cell::RefCell;
use std::fs::File;
use std::io;
use std::net::IpAddr;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

pub const SENDER: &str = "forms@example.com";

pub struct FixedId(pub &'static str);

impl IdSource for FixedId {
    fn generate(&self) -> Result<String, IdError> {
        Ok(self.0.to_string())
    }
}

/// Keeps the raw text of every message handed to it.
#[derive(Clone, Default)]
pub struct RecordingRelay {
    pub sent: Rc<RefCell<Vec<String>>>,
}

impl MailRelay for RecordingRelay {
    fn deliver(&self, message: &Message) -> Result<(), DispatchError> {
        let raw = String::from_utf8_lossy(&message.formatted()).into_owned();
        self.sent.borrow_mut().push(raw);
        Ok(())
    }
}

/// Counts attempts and fails every one of them at the transport.
#[derive(Clone, Default)]
pub struct FailingRelay {
    pub attempts: Rc<RefCell<usize>>,
}

impl MailRelay for FailingRelay {
    fn deliver(&self, _message: &Message) -> Result<(), DispatchError> {
        *self.attempts.borrow_mut() += 1;
        Err(DispatchError::Transport("Connection refused".into()))
    }
}

pub fn write_template(path: &Path) {
    let lines = [
        "Learner name: [Add FULL name]",
        "Email: [Email]",
        "Phone: [Phone]",
        "Date: [Select Date]",
        "Learner signature: [Signature here]",
        "Typed name: [Type your name]\tDate: [Select Date]",
        "Parent/Guardian: [Enter Full Name]\tDate: [Select Date]",
        "Submission ID: [Auto-generated ID]",
        "IP Address: [Auto-captured IP Address]",
        "Timestamp: [Auto-captured Timestamp]",
    ];
    let docx = lines.iter().fold(Docx::new(), |docx, line| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*line)))
    });
    docx.build().pack(File::create(path).unwrap()).unwrap();
}

pub fn inked_canvas() -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(600, 150, Rgba([255, 255, 255, 255]));
    for x in 50..250 {
        canvas.put_pixel(x, 75, Rgba([0, 0, 0, 255]));
    }
    canvas
}

pub fn blank_canvas() -> RgbaImage {
    RgbaImage::from_pixel(600, 150, Rgba([255, 255, 255, 255]))
}

pub fn valid_form() -> FormInput {
    FormInput {
        learner_name: "Jane Doe".into(),
        learner_email: "jane.doe@example.com".into(),
        learner_phone: "0412 345 678".into(),
        parent_signature: "John Doe".into(),
        signature: Some(inked_canvas()),
    }
}

/// A host with no route out.
pub struct NoRoute;

impl AddressSource for NoRoute {
    fn address(&self) -> io::Result<IpAddr> {
        Err(io::Error::new(io::ErrorKind::NetworkUnreachable, "Network is unreachable"))
    }
}

pub fn controller(
    template: &Path,
    output_dir: &Path,
    work_dir: &Path,
    relay: Box<dyn MailRelay>,
) -> SessionController {
    let address = FixedAddress("192.168.1.20".parse().unwrap());
    controller_with_address(template, output_dir, work_dir, relay, Box::new(address))
}

pub fn controller_with_address(
    template: &Path,
    output_dir: &Path,
    work_dir: &Path,
    relay: Box<dyn MailRelay>,
    address: Box<dyn AddressSource>,
) -> SessionController {
    let populator = DocumentPopulator::new(template, output_dir, Box::new(FixedId("a1b2c3")), address);
    let dispatcher = Dispatcher::new(Some(SENDER.to_string()), relay);
    SessionController::new(populator, dispatcher, work_dir, Duration::ZERO)
}
