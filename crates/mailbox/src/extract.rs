use mailparse::ParsedMail;
use once_cell::sync::Lazy;
use regex::Regex;

use crmpilot_core::SuiteError;

static RESET_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(https?://[^\s<>"]+reset[^\s<>"]+)"#).unwrap());

/// Pull the password-reset URL out of a raw RFC 822 message. Plain-text parts
/// are scanned before HTML parts. A message without a reset-bearing URL is a
/// hard error, never a retry.
pub fn extract_reset_link(raw: &[u8]) -> Result<String, SuiteError> {
    let parsed = mailparse::parse_mail(raw)
        .map_err(|e| SuiteError::LinkExtraction(format!("message did not parse: {e}")))?;

    let mut plain = Vec::new();
    let mut html = Vec::new();
    collect_bodies(&parsed, &mut plain, &mut html);

    for body in plain.iter().chain(html.iter()) {
        if let Some(m) = RESET_URL_RE.find(body) {
            return Ok(m.as_str().to_string());
        }
    }

    Err(SuiteError::LinkExtraction(
        "no reset url found in any message part".to_string(),
    ))
}

fn collect_bodies(part: &ParsedMail<'_>, plain: &mut Vec<String>, html: &mut Vec<String>) {
    if part.subparts.is_empty() {
        let mimetype = part.ctype.mimetype.to_ascii_lowercase();
        if let Ok(body) = part.get_body() {
            if mimetype == "text/html" {
                html.push(body);
            } else {
                plain.push(body);
            }
        }
        return;
    }
    for sub in &part.subparts {
        collect_bodies(sub, plain, html);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_message(body: &str) -> Vec<u8> {
        format!(
            "From: RapidoCRM <no-reply@x.test>\r\n\
             To: user@test.com\r\n\
             Subject: Reinitialisation de votre mot de passe\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             \r\n\
             {body}\r\n"
        )
        .into_bytes()
    }

    #[test]
    fn finds_link_in_plain_text_body() {
        let raw = plain_message("Cliquez ici: https://x.test/reset/abc123 pour continuer.");
        assert_eq!(extract_reset_link(&raw).unwrap(), "https://x.test/reset/abc123");
    }

    #[test]
    fn plain_part_wins_over_html_part() {
        let raw = b"From: RapidoCRM <no-reply@x.test>\r\n\
            To: user@test.com\r\n\
            Subject: mot de passe\r\n\
            Content-Type: multipart/alternative; boundary=\"sep\"\r\n\
            \r\n\
            --sep\r\n\
            Content-Type: text/plain; charset=utf-8\r\n\
            \r\n\
            https://x.test/reset/from-plain\r\n\
            --sep\r\n\
            Content-Type: text/html; charset=utf-8\r\n\
            \r\n\
            <a href=\"https://x.test/reset/from-html\">reset</a>\r\n\
            --sep--\r\n"
            .to_vec();

        assert_eq!(
            extract_reset_link(&raw).unwrap(),
            "https://x.test/reset/from-plain"
        );
    }

    #[test]
    fn html_part_used_when_plain_has_no_link() {
        let raw = b"From: RapidoCRM <no-reply@x.test>\r\n\
            To: user@test.com\r\n\
            Subject: mot de passe\r\n\
            Content-Type: multipart/alternative; boundary=\"sep\"\r\n\
            \r\n\
            --sep\r\n\
            Content-Type: text/plain; charset=utf-8\r\n\
            \r\n\
            Voir la version HTML.\r\n\
            --sep\r\n\
            Content-Type: text/html; charset=utf-8\r\n\
            \r\n\
            <p>lien: https://x.test/reset-password/tok42</p>\r\n\
            --sep--\r\n"
            .to_vec();

        assert_eq!(
            extract_reset_link(&raw).unwrap(),
            "https://x.test/reset-password/tok42"
        );
    }

    #[test]
    fn first_match_wins_with_several_reset_urls() {
        let raw = plain_message(
            "https://x.test/reset/first puis https://x.test/reset/second",
        );
        assert_eq!(extract_reset_link(&raw).unwrap(), "https://x.test/reset/first");
    }

    #[test]
    fn missing_link_is_an_extraction_error() {
        let raw = plain_message("Bonjour, votre compte est actif. https://x.test/dashboard");
        let err = extract_reset_link(&raw).unwrap_err();
        assert!(matches!(err, SuiteError::LinkExtraction(_)));
    }
}
