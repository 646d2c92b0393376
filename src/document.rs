//! Fills the consent template: bracketed tokens in paragraph text become the
//! submitted values, the signature picture, or auto-captured fields.

use crate::error::DocumentError;
use crate::identity::{AddressSource, IdSource, capture_address, generate_unique_id};
use crate::notice::Notifier;
use chrono::Local;
use docx_rs::{BreakType, DocumentChild, Docx, Paragraph, ParagraphChild, Pic, Run, RunChild, read_docx};
use image::GenericImageView;
use log::{debug, info};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const EMU_PER_INCH: u64 = 914_400;
const SIGNATURE_WIDTH_EMU: u64 = 2 * EMU_PER_INCH;

pub const FULL_NAME: &str = "Add FULL name";
pub const EMAIL: &str = "Email";
pub const PHONE: &str = "Phone";
pub const SELECT_DATE: &str = "Select Date";
pub const SIGNATURE: &str = "Signature here";
pub const TYPED_NAME: &str = "Type your name";
pub const PARENT_NAME: &str = "Enter Full Name";
pub const SUBMISSION_ID: &str = "Auto-generated ID";
pub const IP_ADDRESS: &str = "Auto-captured IP Address";
pub const TIMESTAMP: &str = "Auto-captured Timestamp";

pub const ALL_PLACEHOLDERS: [&str; 10] = [
    FULL_NAME,
    EMAIL,
    PHONE,
    SELECT_DATE,
    SIGNATURE,
    TYPED_NAME,
    PARENT_NAME,
    SUBMISSION_ID,
    IP_ADDRESS,
    TIMESTAMP,
];

/// One submit action's worth of form data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub learner_name: String,
    pub learner_email: String,
    pub learner_phone: String,
    /// Day-month-year, used for every date token.
    pub shared_date: String,
    pub parent_signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulatedDocument {
    pub id: String,
    pub path: PathBuf,
}

impl PopulatedDocument {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| document_file_name(&self.id))
    }
}

pub fn document_file_name(unique_id: &str) -> String {
    format!("Filled_Consent_Form_{}.docx", sanitize_filename::sanitize(unique_id))
}

/// Picture bytes plus the size they are shown at: two inches wide, height
/// following the image's aspect ratio.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    bytes: Vec<u8>,
    width_emu: u32,
    height_emu: u32,
}

impl EmbeddedImage {
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let bytes = fs::read(path)?;
        let decoded =
            image::load_from_memory(&bytes).map_err(|e| DocumentError::Image(e.to_string()))?;
        let (width, height) = decoded.dimensions();
        if width == 0 || height == 0 {
            return Err(DocumentError::Image(format!(
                "{} has no pixels",
                path.display()
            )));
        }

        let height_emu = SIGNATURE_WIDTH_EMU * height as u64 / width as u64;
        Ok(Self {
            bytes,
            width_emu: SIGNATURE_WIDTH_EMU as u32,
            height_emu: height_emu.min(u32::MAX as u64) as u32,
        })
    }

    fn picture(&self) -> Pic {
        Pic::new(&self.bytes).size(self.width_emu, self.height_emu)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Replacement<'a> {
    Text(&'a str),
    Image(&'a EmbeddedImage),
}

/// Text of a paragraph as the user sees it: runs joined, tabs as `\t`,
/// breaks as `\n`.
pub fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Tab(_) => text.push('\t'),
                    RunChild::Break(_) => text.push('\n'),
                    _ => {}
                }
            }
        }
    }
    text
}

/// Texts of all top-level body paragraphs, in order.
pub fn document_texts(docx: &Docx) -> Vec<String> {
    docx.document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph_text(paragraph)),
            _ => None,
        })
        .collect()
}

fn text_run(text: &str) -> Run {
    let mut run = Run::new();
    let mut pending = String::new();
    for c in text.chars() {
        match c {
            '\t' | '\n' => {
                if !pending.is_empty() {
                    run = run.add_text(std::mem::take(&mut pending));
                }
                run = if c == '\t' {
                    run.add_tab()
                } else {
                    run.add_break(BreakType::TextWrapping)
                };
            }
            _ => pending.push(c),
        }
    }
    if !pending.is_empty() {
        run = run.add_text(pending);
    }
    run
}

/// Rewrites `paragraph` as before-run, replacement, after-run when `token`
/// occurs in its text exactly once. Anything else leaves it untouched.
pub fn replace_in_paragraph(
    paragraph: &mut Paragraph,
    token: &str,
    replacement: Replacement<'_>,
) -> bool {
    let text = paragraph_text(paragraph);
    if !text.contains(token) {
        return false;
    }

    let parts: Vec<&str> = text.split(token).collect();
    if parts.len() != 2 {
        debug!(
            "Skipping paragraph with {} occurrences of {}",
            parts.len() - 1,
            token
        );
        return false;
    }

    let mut rebuilt = paragraph.clone();
    rebuilt.children.clear();
    rebuilt = rebuilt.add_run(text_run(parts[0]));
    match replacement {
        Replacement::Image(image) => {
            rebuilt = rebuilt.add_run(Run::new().add_image(image.picture()));
        }
        Replacement::Text(value) if !value.is_empty() => {
            rebuilt = rebuilt.add_run(text_run(value));
        }
        Replacement::Text(_) => {}
    }
    rebuilt = rebuilt.add_run(text_run(parts[1]));

    *paragraph = rebuilt;
    true
}

/// Replaces `[placeholder]` in every body paragraph. Returns how many
/// paragraphs were rewritten.
pub fn replace_placeholder(docx: &mut Docx, placeholder: &str, replacement: Replacement<'_>) -> usize {
    let token = format!("[{}]", placeholder);
    let mut replaced = 0;
    for child in docx.document.children.iter_mut() {
        if let DocumentChild::Paragraph(paragraph) = child {
            if replace_in_paragraph(paragraph, &token, replacement) {
                replaced += 1;
            }
        }
    }
    replaced
}

pub fn load_template(path: &Path) -> Result<Docx, DocumentError> {
    if !path.exists() {
        return Err(DocumentError::TemplateNotFound(path.display().to_string()));
    }
    let bytes = fs::read(path)?;
    read_docx(&bytes).map_err(|e| DocumentError::Read(e.to_string()))
}

/// Placeholders that appear nowhere in the template's body paragraphs.
pub fn missing_placeholders(docx: &Docx) -> Vec<&'static str> {
    let texts = document_texts(docx);
    ALL_PLACEHOLDERS
        .iter()
        .copied()
        .filter(|placeholder| {
            let token = format!("[{}]", placeholder);
            !texts.iter().any(|text| text.contains(&token))
        })
        .collect()
}

/// Binds a submission into a fresh copy of the template.
pub struct DocumentPopulator {
    template_path: PathBuf,
    output_dir: PathBuf,
    ids: Box<dyn IdSource>,
    addresses: Box<dyn AddressSource>,
}

impl DocumentPopulator {
    pub fn new(
        template_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        ids: Box<dyn IdSource>,
        addresses: Box<dyn AddressSource>,
    ) -> Self {
        Self {
            template_path: template_path.into(),
            output_dir: output_dir.into(),
            ids,
            addresses,
        }
    }

    /// Saves `Filled_Consent_Form_{id}.docx` in the output directory. A failure
    /// part way through may leave a partial file behind.
    pub fn populate(
        &self,
        data: &FormSubmission,
        signature_path: &Path,
        notifier: &dyn Notifier,
    ) -> Result<PopulatedDocument, DocumentError> {
        fs::create_dir_all(&self.output_dir)?;

        // Auto-captured fields
        let unique_id = generate_unique_id(self.ids.as_ref(), notifier);
        let address = capture_address(self.addresses.as_ref(), notifier);
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        info!("Populating {} for submission {}", self.template_path.display(), unique_id);

        // Load the template and the fitted signature
        let mut docx = load_template(&self.template_path)?;
        let signature = EmbeddedImage::load(signature_path)?;

        // Order matters: the first date pass fills every date paragraph.
        let fills = [
            (FULL_NAME, Replacement::Text(&data.learner_name)),
            (EMAIL, Replacement::Text(&data.learner_email)),
            (PHONE, Replacement::Text(&data.learner_phone)),
            (SELECT_DATE, Replacement::Text(&data.shared_date)),
            (SIGNATURE, Replacement::Image(&signature)),
            (TYPED_NAME, Replacement::Text(&data.learner_name)),
            (SELECT_DATE, Replacement::Text(&data.shared_date)),
            (PARENT_NAME, Replacement::Text(&data.parent_signature)),
            (SELECT_DATE, Replacement::Text(&data.shared_date)),
            (SUBMISSION_ID, Replacement::Text(&unique_id)),
            (IP_ADDRESS, Replacement::Text(&address)),
            (TIMESTAMP, Replacement::Text(&timestamp)),
        ];
        for (placeholder, replacement) in fills {
            let count = replace_placeholder(&mut docx, placeholder, replacement);
            debug!("[{}] replaced in {} paragraph(s)", placeholder, count);
        }

        // Save to the output directory
        let path = self.output_dir.join(document_file_name(&unique_id));
        let file = File::create(&path)?;
        docx.build()
            .pack(file)
            .map_err(|e| DocumentError::Write(e.to_string()))?;
        info!("Filled document saved to {}", path.display());

        Ok(PopulatedDocument {
            id: unique_id,
            path,
        })
    }
}
