/// HTTP status codes the server can answer with.
///
/// - `Ok` (200): whole file or directory listing
/// - `PartialContent` (206): a byte range of a file
/// - `BadRequest` (400): malformed request, or neither file nor directory
/// - `NotFound` (404): the path could not be opened
/// - `RangeNotSatisfiable` (416): the range lies past the end of the file
/// - `InternalServerError` (500): the file could not be inspected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 206 Partial
    PartialContent,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 416 Range Not Satisfiable
    RangeNotSatisfiable,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use tinyserve::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::PartialContent.as_u16(), 206);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::PartialContent => 206,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::RangeNotSatisfiable => 416,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the reason phrase written on the status line.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::PartialContent => "Partial",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::RangeNotSatisfiable => "Range Not Satisfiable",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// A response head plus an in-memory body.
///
/// File responses leave `body` empty and carry an explicit `Content-length`;
/// their bytes are transferred separately after the head is written.
#[derive(Debug)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Headers in the order they are written
    pub headers: Vec<(String, String)>,
    /// Response body as bytes
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use tinyserve::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-type", "text/plain")
///     .body(b"hi".to_vec())
///     .build();
/// assert_eq!(response.header("Content-length"), Some("2"));
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Appends a header. Names keep the casing they are given.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response.
    ///
    /// Adds `Content-length` from the body size unless one was set already.
    pub fn build(mut self) -> Response {
        let has_length = self
            .headers
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case("content-length"));

        if !has_length {
            self.headers
                .push(("Content-length".to_string(), self.body.len().to_string()));
        }

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Looks up a header value, ignoring name case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Head of a file response carrying `start..end` of a `total`-byte file.
    ///
    /// A partial response also gets a `Content-Range` header; the end it
    /// reports is exclusive, like every range in this crate.
    pub fn file_head(partial: bool, start: u64, end: u64, total: u64, content_type: &str) -> Self {
        let builder = if partial {
            ResponseBuilder::new(StatusCode::PartialContent).header(
                "Content-Range",
                format!("bytes {}-{}/{}", start, end, total),
            )
        } else {
            ResponseBuilder::new(StatusCode::Ok)
        };

        builder
            .header("Accept-Ranges", "bytes")
            .header("Cache-Control", "no-cache")
            .header("Content-length", (end - start).to_string())
            .header("Content-type", content_type)
            .build()
    }

    /// 200 response with an HTML body.
    pub fn html(body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Cache-Control", "no-cache")
            .header("Content-type", "text/html")
            .body(body.into())
            .build()
    }

    /// Minimal error response: status line, length and a short text body.
    pub fn error(status: StatusCode, message: &str) -> Self {
        ResponseBuilder::new(status)
            .body(message.as_bytes().to_vec())
            .build()
    }

    /// 404 with the fixed `File Not Found.` body.
    pub fn not_found() -> Self {
        Self::error(StatusCode::NotFound, "File Not Found.")
    }

    pub fn bad_request(message: &str) -> Self {
        Self::error(StatusCode::BadRequest, message)
    }

    /// 416 for a range that starts past the end of a `total`-byte file.
    pub fn range_not_satisfiable(total: u64) -> Self {
        ResponseBuilder::new(StatusCode::RangeNotSatisfiable)
            .header("Content-Range", format!("bytes */{}", total))
            .build()
    }

    pub fn internal_error() -> Self {
        Self::error(StatusCode::InternalServerError, "Internal Server Error.")
    }
}
