use anyhow::{Context, Result};
use clap::Parser;
use consent_form::agreement::form_header;
use consent_form::document::{load_template, missing_placeholders};
use consent_form::identity::IdSource;
use consent_form::{
    Config, ConsoleNotifier, Dispatcher, DocumentPopulator, FormInput, LocalIdSource,
    LocalNetworkAddress, Notice, Notifier, RemoteIdSource, Session, SessionController,
    SmtpRelay, SubmitOutcome,
};
use image::RgbaImage;
use log::{info, warn};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

const DEFAULT_TEMPLATE: &str = "resource/ph_digital_media_consent.docx";

#[derive(Parser, Debug)]
#[clap(author, version, about = "Collects a signed digital media release consent form.")]
struct Args {
    #[clap(long, default_value = DEFAULT_TEMPLATE, help = "Word template with bracketed placeholders.")]
    template: PathBuf,
    #[clap(long, default_value = ".", help = "Where filled documents are saved.")]
    output_dir: PathBuf,
    #[clap(long, default_value = ".", help = "Where signature images are written.")]
    work_dir: PathBuf,
    #[clap(long, help = "Also save a copy of the finished document here.")]
    download_dir: Option<PathBuf>,
    #[clap(long, help = "Generate submission ids locally instead of calling the UUID API.")]
    local_ids: bool,
    #[clap(long, help = "Learner name for the first round.")]
    name: Option<String>,
    #[clap(long, help = "Learner email for the first round.")]
    email: Option<String>,
    #[clap(long, help = "Learner phone for the first round.")]
    phone: Option<String>,
    #[clap(long, help = "Parent/guardian typed name for the first round.")]
    parent_signature: Option<String>,
    #[clap(long, help = "PNG of the signature canvas for the first round.")]
    signature: Option<PathBuf>,
}

/// Values given on the command line, used once before falling back to prompts.
#[derive(Debug, Default)]
struct Prefill {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    parent_signature: Option<String>,
    signature: Option<PathBuf>,
}

fn prompt(input: &mut impl BufRead, label: &str) -> io::Result<Option<String>> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn field(input: &mut impl BufRead, label: &str, prefilled: Option<String>) -> io::Result<Option<String>> {
    match prefilled {
        Some(value) => {
            println!("{}: {}", label, value);
            Ok(Some(value))
        }
        None => prompt(input, label),
    }
}

fn load_canvas(path: &Path, notifier: &dyn Notifier) -> Option<RgbaImage> {
    match image::open(path) {
        Ok(image) => Some(image.to_rgba8()),
        Err(e) => {
            notifier.notify(Notice::warning(format!(
                "Could not read signature image {}: {}",
                path.display(),
                e
            )));
            None
        }
    }
}

/// Reads one filled form. `None` once input is closed.
fn read_form(
    input: &mut impl BufRead,
    prefill: Prefill,
    notifier: &dyn Notifier,
) -> io::Result<Option<FormInput>> {
    let Some(learner_name) = field(input, "Type your name", prefill.name)? else {
        return Ok(None);
    };
    let Some(learner_email) = field(input, "Type your email", prefill.email)? else {
        return Ok(None);
    };
    let Some(learner_phone) = field(input, "Type your phone", prefill.phone)? else {
        return Ok(None);
    };
    let signature_path = match prefill.signature {
        Some(path) => {
            println!("Signature image: {}", path.display());
            path.display().to_string()
        }
        None => match prompt(input, "Signature image (PNG, leave empty if not drawn)")? {
            Some(path) => path,
            None => return Ok(None),
        },
    };
    let Some(parent_signature) = field(
        input,
        "Parent/Guardian's Signature (Typed Name, if applicable)",
        prefill.parent_signature,
    )?
    else {
        return Ok(None);
    };

    let signature = if signature_path.trim().is_empty() {
        None
    } else {
        load_canvas(Path::new(signature_path.trim()), notifier)
    };

    Ok(Some(FormInput {
        learner_name,
        learner_email,
        learner_phone,
        parent_signature,
        signature,
    }))
}

fn show_form(session: &Session) {
    println!();
    println!("{}", form_header(&session.shared_date));
}

fn check_template(path: &Path) {
    match load_template(path) {
        Ok(docx) => {
            let missing = missing_placeholders(&docx);
            if missing.is_empty() {
                info!("Template {} has every placeholder", path.display());
            } else {
                warn!("Template {} lacks placeholders: {:?}", path.display(), missing);
            }
        }
        Err(e) => warn!("Template check failed: {}", e),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match dotenv::dotenv() {
        Ok(path) => info!("Loaded .env file from: {:?}", path),
        Err(_) => warn!("No .env file found or failed to load. Relying on environment variables."),
    }

    let args = Args::parse();
    let config = Config::from_env().context("Failed to read configuration")?;
    info!("Starting consent form session with {:?}", config);
    check_template(&args.template);

    let ids: Box<dyn IdSource> = if args.local_ids {
        Box::new(LocalIdSource)
    } else {
        Box::new(
            RemoteIdSource::new(config.uuid_api_url.clone())
                .context("Failed to build HTTP client for the UUID API")?,
        )
    };
    let populator = DocumentPopulator::new(
        args.template,
        args.output_dir,
        ids,
        Box::new(LocalNetworkAddress),
    );
    let dispatcher = Dispatcher::new(
        config.sender_email.clone(),
        Box::new(SmtpRelay::from_config(&config)),
    );
    let controller = SessionController::new(populator, dispatcher, args.work_dir, config.restart_delay);
    let notifier = ConsoleNotifier::new(args.download_dir);

    let mut prefill = Some(Prefill {
        name: args.name,
        email: args.email,
        phone: args.phone,
        parent_signature: args.parent_signature,
        signature: args.signature,
    });
    let mut session = Session::start();
    let mut input = io::stdin().lock();
    show_form(&session);

    loop {
        let form = read_form(&mut input, prefill.take().unwrap_or_default(), &notifier)
            .context("Failed to read form input")?;
        let Some(form) = form else {
            info!("Input closed before the form was submitted");
            return Ok(());
        };

        let transition = controller.submit(session, &form, &notifier);
        session = transition.session;
        match transition.outcome {
            SubmitOutcome::Submitted(document) => {
                info!("Submission {} complete", document.id);
                break;
            }
            SubmitOutcome::Restarted => show_form(&session),
            SubmitOutcome::Inert => break,
            SubmitOutcome::Rejected(_) | SubmitOutcome::DocumentFailed => {}
        }
    }

    Ok(())
}
