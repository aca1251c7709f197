use std::fmt;
use std::io;

use tokio::io::AsyncRead;
use url::Url;

use crate::http::request::{ByteRange, HttpRequest};
use crate::http::stream::BufferedStream;

/// Longest request or header line accepted, terminator included.
pub const MAX_LINE: usize = 8192;

/// Maximum number of header lines read before giving up.
pub const MAX_HEADERS: usize = 100;

#[derive(Debug)]
pub enum ParseError {
    /// Connection closed before any request byte arrived
    Empty,
    InvalidRequestLine,
    LineTooLong,
    TooManyHeaders,
    InvalidRange,
    InvalidEncoding,
    PathTraversal,
    Io(io::Error),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "connection closed before request"),
            ParseError::InvalidRequestLine => write!(f, "malformed request line"),
            ParseError::LineTooLong => write!(f, "request line or header too long"),
            ParseError::TooManyHeaders => write!(f, "too many header lines"),
            ParseError::InvalidRange => write!(f, "malformed Range header"),
            ParseError::InvalidEncoding => write!(f, "malformed percent-encoding in request target"),
            ParseError::PathTraversal => write!(f, "request target escapes the document root"),
            ParseError::Io(e) => write!(f, "read failed: {}", e),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        ParseError::Io(e)
    }
}

/// Reads a request head from `stream` up to and including the blank line.
///
/// Only the request line and the `Range` header are interpreted. Everything
/// after the blank line is left unread.
pub async fn parse_request<S>(stream: &mut BufferedStream<S>) -> Result<HttpRequest, ParseError>
where
    S: AsyncRead + Unpin,
{
    let mut line = Vec::with_capacity(256);

    if read_line(stream, &mut line).await? == 0 {
        return Err(ParseError::Empty);
    }

    let request_line = std::str::from_utf8(&line).map_err(|_| ParseError::InvalidRequestLine)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().ok_or(ParseError::InvalidRequestLine)?.to_string();
    let uri = parts.next().ok_or(ParseError::InvalidRequestLine)?.to_string();

    let mut range = None;
    let mut headers = 0;

    loop {
        line.clear();
        // EOF before the blank line ends the head as well
        if read_line(stream, &mut line).await? == 0 || is_blank(&line) {
            break;
        }

        headers += 1;
        if headers > MAX_HEADERS {
            return Err(ParseError::TooManyHeaders);
        }

        let Ok(header) = std::str::from_utf8(&line) else {
            continue;
        };
        if let Some((name, value)) = header.split_once(':') {
            if name.trim().eq_ignore_ascii_case("range") {
                range = Some(parse_range(value.trim())?);
            }
        }
    }

    let path = normalize_target(&uri)?;

    Ok(HttpRequest {
        method,
        uri,
        path,
        range,
    })
}

async fn read_line<S>(stream: &mut BufferedStream<S>, line: &mut Vec<u8>) -> Result<usize, ParseError>
where
    S: AsyncRead + Unpin,
{
    let n = stream.read_line(line, MAX_LINE).await?;
    if n + 1 == MAX_LINE && line.last() != Some(&b'\n') {
        return Err(ParseError::LineTooLong);
    }
    Ok(n)
}

fn is_blank(line: &[u8]) -> bool {
    line == b"\r\n" || line == b"\n"
}

/// Parses a `Range` header value such as `bytes=0-499`.
///
/// The inclusive end sent by the client is converted to an exclusive one.
pub fn parse_range(value: &str) -> Result<ByteRange, ParseError> {
    let spec = value
        .strip_prefix("bytes=")
        .ok_or(ParseError::InvalidRange)?
        .trim();

    if spec.contains(',') {
        return Err(ParseError::InvalidRange);
    }

    let (start, end) = spec.split_once('-').ok_or(ParseError::InvalidRange)?;
    let (start, end) = (start.trim(), end.trim());

    match (start.is_empty(), end.is_empty()) {
        (true, true) => Err(ParseError::InvalidRange),
        (true, false) => Ok(ByteRange::Suffix {
            len: parse_offset(end)?,
        }),
        (false, true) => Ok(ByteRange::From {
            start: parse_offset(start)?,
        }),
        (false, false) => {
            let start = parse_offset(start)?;
            let last = parse_offset(end)?;
            if last < start {
                return Err(ParseError::InvalidRange);
            }
            let end = last.checked_add(1).ok_or(ParseError::InvalidRange)?;
            Ok(ByteRange::FromTo { start, end })
        }
    }
}

fn parse_offset(s: &str) -> Result<u64, ParseError> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidRange);
    }
    s.parse().map_err(|_| ParseError::InvalidRange)
}

/// Turns a request target into a path relative to the document root.
///
/// Origin-form targets (`/a/b?q`) lose one leading slash and everything from
/// the first `?`. Absolute-form targets (`http://host/a/b`) go through the URL
/// parser, which drops the query and fragment. The remainder is
/// percent-decoded and never contains `..` segments; the root itself is `.`.
pub fn normalize_target(uri: &str) -> Result<String, ParseError> {
    let raw = if let Some(rest) = uri.strip_prefix('/') {
        strip_query(rest)
    } else if uri.contains("://") {
        let url = Url::parse(uri).map_err(|_| ParseError::InvalidRequestLine)?;
        return decode_path(url.path().trim_start_matches('/'));
    } else {
        strip_query(uri)
    };

    decode_path(raw)
}

fn strip_query(target: &str) -> &str {
    target.split_once('?').map_or(target, |(path, _)| path)
}

fn decode_path(raw: &str) -> Result<String, ParseError> {
    let decoded = percent_decode(raw.as_bytes())?;
    let decoded = String::from_utf8(decoded).map_err(|_| ParseError::InvalidEncoding)?;

    sanitize(&decoded)
}

/// Replaces every `%XX` triplet with the byte it encodes.
///
/// Hand-written because `urlencoding::decode` passes malformed triplets
/// through, and those must fail the request.
pub fn percent_decode(input: &[u8]) -> Result<Vec<u8>, ParseError> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        if input[i] == b'%' {
            let hi = input.get(i + 1).and_then(|&b| hex_value(b));
            let lo = input.get(i + 2).and_then(|&b| hex_value(b));
            match (hi, lo) {
                (Some(hi), Some(lo)) => out.push(hi << 4 | lo),
                _ => return Err(ParseError::InvalidEncoding),
            }
            i += 3;
        } else {
            out.push(input[i]);
            i += 1;
        }
    }

    Ok(out)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn sanitize(path: &str) -> Result<String, ParseError> {
    if path.contains('\0') || path.contains('\\') {
        return Err(ParseError::PathTraversal);
    }

    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(ParseError::PathTraversal),
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Ok(".".to_string());
    }
    Ok(segments.join("/"))
}
