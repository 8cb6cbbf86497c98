use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurlParseError {
    #[error("Could not find a http(s) URL in curl command")]
    MissingUrl,

    #[error("Unterminated quote in curl command")]
    UnterminatedQuote,
}

/// Pulls the status URL and request headers out of a browser "Copy as cURL"
/// command so the poller can reuse the page's session.
#[derive(Clone, Default, Debug)]
pub struct CurlParser {
    pub url: Option<String>,
    pub headers: Option<HeaderMap>,
}

impl CurlParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&mut self, curl_text: &str) -> Result<(), CurlParseError> {
        let tokens = tokenize(curl_text)?;

        let mut url = None;
        let mut headers = HeaderMap::new();
        let mut tokens = tokens.into_iter();

        while let Some(token) = tokens.next() {
            match token.as_str() {
                "-H" | "--header" => {
                    if let Some(header) = tokens.next() {
                        insert_header(&mut headers, &header);
                    }
                }
                "-b" | "--cookie" => {
                    if let Some(cookie) = tokens.next() {
                        match HeaderValue::from_str(&cookie) {
                            Ok(value) => {
                                headers.insert(COOKIE, value);
                            }
                            Err(e) => tracing::warn!(error = %e, "skipping invalid cookie"),
                        }
                    }
                }
                "--url" => {
                    if let Some(next) = tokens.next() {
                        url.get_or_insert(next);
                    }
                }
                _ if is_http_url(&token) => {
                    url.get_or_insert(token);
                }
                _ => {}
            }
        }

        let url = url.ok_or(CurlParseError::MissingUrl)?;
        tracing::debug!(url = %url, headers = headers.len(), "parsed curl command");

        self.url = Some(url);
        self.headers = Some(headers);
        Ok(())
    }
}

/// Builds a header map from `Name: value` lines, skipping invalid entries.
pub fn headers_from_lines<I, S>(lines: I) -> HeaderMap
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut headers = HeaderMap::new();
    for line in lines {
        insert_header(&mut headers, line.as_ref());
    }
    headers
}

fn is_http_url(token: &str) -> bool {
    token.starts_with("http://") || token.starts_with("https://")
}

fn insert_header(headers: &mut HeaderMap, line: &str) {
    let Some((name, value)) = line.split_once(':') else {
        tracing::warn!(header = %line, "skipping header without a colon");
        return;
    };

    let name = HeaderName::from_str(&name.trim().to_lowercase());
    let value = HeaderValue::from_str(value.trim());
    match (name, value) {
        (Ok(name), Ok(value)) => {
            headers.insert(name, value);
        }
        _ => tracing::warn!(header = %line, "skipping invalid header"),
    }
}

/// Splits a shell command line into words, honouring quotes and
/// backslash line continuations.
fn tokenize(text: &str) -> Result<Vec<String>, CurlParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => return Err(CurlParseError::UnterminatedQuote),
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(ch @ ('"' | '\\' | '$' | '`')) => current.push(ch),
                            Some('\n') => {}
                            Some(ch) => {
                                current.push('\\');
                                current.push(ch);
                            }
                            None => return Err(CurlParseError::UnterminatedQuote),
                        },
                        Some(ch) => current.push(ch),
                        None => return Err(CurlParseError::UnterminatedQuote),
                    }
                }
            }
            // bash ANSI-C quoting as emitted by some browsers: $'...'
            '$' if !in_token && chars.peek() == Some(&'\'') => {}
            '\\' => match chars.next() {
                Some('\n') => {}
                Some('\r') => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                }
                Some(ch) => {
                    in_token = true;
                    current.push(ch);
                }
                None => {}
            },
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                in_token = true;
                current.push(c);
            }
        }
    }

    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
