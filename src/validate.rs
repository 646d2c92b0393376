//! Submit gates: address shape and "is there ink on the canvas".

use image::RgbaImage;
use regex::Regex;
use std::sync::LazyLock;

// Local part, domain body and a letters-only top-level label. Adjacency and
// edge rules are checked separately since `regex` has no lookaround.
static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z0-9._%+-]{1,64})@([a-zA-Z0-9.-]+)\.[a-zA-Z]{2,}$")
        .expect("email pattern is valid")
});

fn is_special(c: char) -> bool {
    matches!(c, '.' | '_' | '%' | '+' | '-')
}

/// Restrictive address check used before anything else on submit.
///
/// Rejects two special characters (`._%+-`) next to each other anywhere in the
/// address, a local part that starts or ends with one, a domain body ending in
/// `.` or `-`, and a top-level label shorter than two letters.
pub fn is_valid_email(email: &str) -> bool {
    let Some(caps) = EMAIL_SHAPE.captures(email) else {
        return false;
    };

    let chars: Vec<char> = email.chars().collect();
    if chars.windows(2).any(|pair| is_special(pair[0]) && is_special(pair[1])) {
        return false;
    }

    let local = &caps[1];
    if local.starts_with(is_special) || local.ends_with(is_special) {
        return false;
    }

    !caps[2].ends_with(['.', '-'])
}

/// `false` for a missing canvas, an empty one, or one where every RGBA sample is 255.
pub fn is_signature_drawn(signature: Option<&RgbaImage>) -> bool {
    match signature {
        None => false,
        Some(canvas) if canvas.as_raw().is_empty() => false,
        Some(canvas) => canvas.as_raw().iter().any(|&sample| sample != u8::MAX),
    }
}
