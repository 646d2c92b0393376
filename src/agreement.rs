//! What the learner agrees to, shown before any field is asked for.

pub const FORM_TITLE: &str = "Digital Media Release Consent Form";

pub const AGREEMENT: &str = r#"Consent and Data Protection Agreement

Dear Learner,

We are requesting your permission to use the video and audio footage you have provided, including testimonials, interviews, declarations, course activities, and other visual or audio content (hereafter referred to as "Media Footage"), for the purposes outlined below. Your feedback is invaluable, and we would like to share it publicly for specific purposes.

By completing and submitting this digital form, you confirm that:

1. Use of Media Footage:
I understand that Prevista Ltd (the "Business") wishes to use the Media Footage for the following purposes (the "Specified Purposes"):
  - In presentations, specifically at conferences, seminars, educational workshops, webinars, and internal meetings.
  - In promotional materials, including brochures, flyers, social media posts, digital content, digital advertisements, posters, banners, and email campaigns.
  - In advertising goods or services on digital platforms such as Google Ads and Facebook Ads, print ads, TV and radio ads, and online video and audio advertisements on platforms like YouTube, Instagram, X, and others.
  - On the Business' website, prevista.co.uk, partner websites, internal and external blog articles, and course-specific pages.
  - In marketing communications, including but not limited to educational, commercial, promotional, and informational uses, in any media or format, now known or invented in the future, worldwide, without time limits.

2. Rights and Permissions:
  - I grant the Business exclusive permission to use the Media Footage for the Specified Purposes.
  - I understand that my image and voice may be edited, copied, modified, exhibited, published, or distributed, and I waive the right to inspect or approve the finished product.

3. Compensation:
  - I waive the right to any royalties or other compensation arising from or relating to the use of the Media Footage.

4. Data Storage and Transfer:
  - I consent to the Business storing copies of the Media Footage and/or my contact details on its database for the Specified Purposes or in case it needs to contact me.
  - I consent to the Business storing and transferring the Media Footage and my contact details to locations outside of the UK or European Economic Area (EEA), particularly to the Philippines and other regions that serve as bases for sub-contractors of the Business, for the Specified Purposes.

5. Data Protection and Privacy:
  - In accordance with the UK General Data Protection Regulation (UK GDPR) and the Data Protection Act 2018, I consent to the collection, use, and processing of my personal data, including my name, likeness, voice, and any other identifiable information in the Media Footage, by Prevista Ltd solely for the purposes outlined in this form.
  - I understand that my personal data will be processed fairly and lawfully and will not be used for any purpose other than those stated above without my additional consent.
  - I understand that my data will be stored securely by Prevista Ltd and will only be retained for as long as necessary to fulfil the purposes outlined in this form or as required by law.

6. Right to Withdraw Consent:
  - I understand that I may withdraw my consent at any time by contacting Prevista Ltd at enquiries@prevista.co.uk. However, I acknowledge that any use of my Media Footage prior to my withdrawal will not be affected.
  - I am aware that if I withdraw my consent, my personal data will be deleted or anonymised where possible, in compliance with data protection laws.

7. Access to Information:
  - I understand that I have the right to request access to the personal data held about me, to rectify any inaccuracies, or to request the erasure of my data where appropriate."#;

pub const AUTHORISATION: &str = "Authorisation: I confirm that I am at least 18 years of age or have the consent of my parent/guardian to participate. I have read and fully understand this consent and data protection agreement.";

pub const SUBMIT_NOTE: &str = "Note: By clicking \"Submit,\" you confirm that you have read, understood, and agree to the terms and conditions stated above.";

/// Everything shown above the input fields for a session dated `shared_date`.
pub fn form_header(shared_date: &str) -> String {
    let rule = "-".repeat(FORM_TITLE.len());
    format!(
        "{FORM_TITLE}\n{rule}\n\n{AGREEMENT}\n\n{AUTHORISATION}\n\nDate: {shared_date}\n{SUBMIT_NOTE}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_shows_every_section_before_the_date() {
        let header = form_header("18-10-2026");

        assert!(header.starts_with(FORM_TITLE));
        let mut last = 0;
        for section in [
            "1. Use of Media Footage:",
            "2. Rights and Permissions:",
            "3. Compensation:",
            "4. Data Storage and Transfer:",
            "5. Data Protection and Privacy:",
            "6. Right to Withdraw Consent:",
            "7. Access to Information:",
            "Authorisation:",
            "Date: 18-10-2026",
            "Note: By clicking \"Submit,\"",
        ] {
            let at = header.find(section).unwrap_or_else(|| panic!("missing {}", section));
            assert!(at > last, "{} is out of order", section);
            last = at;
        }
    }

    #[test]
    fn withdrawal_contact_is_given() {
        assert!(AGREEMENT.contains("enquiries@prevista.co.uk"));
    }
}
