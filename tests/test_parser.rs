use tinyserve::http::parser::{ParseError, normalize_target, parse_range, parse_request, percent_decode};
use tinyserve::http::request::{ByteRange, HttpRequest};
use tinyserve::http::stream::BufferedStream;

async fn parse(raw: &[u8]) -> Result<HttpRequest, ParseError> {
    let mut stream = BufferedStream::new(raw);
    parse_request(&mut stream).await
}

#[tokio::test]
async fn test_parse_simple_get_request() {
    let req = parse(b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n").await.unwrap();

    assert_eq!(req.method, "GET");
    assert_eq!(req.uri, "/index.html");
    assert_eq!(req.path, "index.html");
    assert_eq!(req.range, None);
}

#[tokio::test]
async fn test_parse_root_maps_to_dot() {
    let req = parse(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
    assert_eq!(req.path, ".");
}

#[tokio::test]
async fn test_parse_strips_query_before_decoding() {
    let req = parse(b"GET /a%20b.txt?x=%zz HTTP/1.1\r\n\r\n").await.unwrap();
    assert_eq!(req.path, "a b.txt");

    let req = parse(b"GET /q%3Fmark HTTP/1.1\r\n\r\n").await.unwrap();
    assert_eq!(req.path, "q?mark");
}

#[tokio::test]
async fn test_parse_range_header() {
    let req = parse(b"GET /f HTTP/1.1\r\nHost: x\r\nRange: bytes=10-19\r\nAccept: */*\r\n\r\n")
        .await
        .unwrap();
    assert_eq!(req.range, Some(ByteRange::FromTo { start: 10, end: 20 }));
}

#[tokio::test]
async fn test_parse_range_header_name_case_insensitive() {
    let req = parse(b"GET /f HTTP/1.1\r\nrange: bytes=5-\r\n\r\n").await.unwrap();
    assert_eq!(req.range, Some(ByteRange::From { start: 5 }));
}

#[tokio::test]
async fn test_parse_accepts_bare_newlines() {
    let req = parse(b"GET /f HTTP/1.0\nRange: bytes=0-0\n\n").await.unwrap();
    assert_eq!(req.range, Some(ByteRange::FromTo { start: 0, end: 1 }));
}

#[tokio::test]
async fn test_parse_eof_ends_headers() {
    let req = parse(b"GET /f HTTP/1.1\r\nHost: x\r\n").await.unwrap();
    assert_eq!(req.path, "f");
}

#[tokio::test]
async fn test_parse_leaves_body_unread() {
    let raw = b"GET /f HTTP/1.1\r\n\r\nBODY";
    let mut stream = BufferedStream::new(&raw[..]);
    parse_request(&mut stream).await.unwrap();
    assert_eq!(stream.unread(), 4);
}

#[tokio::test]
async fn test_parse_empty_connection() {
    assert!(matches!(parse(b"").await, Err(ParseError::Empty)));
}

#[tokio::test]
async fn test_parse_missing_uri() {
    assert!(matches!(parse(b"GET\r\n\r\n").await, Err(ParseError::InvalidRequestLine)));
    assert!(matches!(parse(b"\r\n\r\n").await, Err(ParseError::InvalidRequestLine)));
}

#[tokio::test]
async fn test_parse_malformed_range_is_error() {
    let result = parse(b"GET /f HTTP/1.1\r\nRange: bytes=abc\r\n\r\n").await;
    assert!(matches!(result, Err(ParseError::InvalidRange)));
}

#[tokio::test]
async fn test_parse_malformed_encoding_is_error() {
    let result = parse(b"GET /bad%zzname HTTP/1.1\r\n\r\n").await;
    assert!(matches!(result, Err(ParseError::InvalidEncoding)));
}

#[tokio::test]
async fn test_parse_rejects_traversal() {
    let result = parse(b"GET /..%2f..%2fetc/passwd HTTP/1.1\r\n\r\n").await;
    assert!(matches!(result, Err(ParseError::PathTraversal)));
}

#[tokio::test]
async fn test_parse_line_too_long() {
    let mut raw = b"GET /".to_vec();
    raw.extend(std::iter::repeat(b'a').take(10_000));
    raw.extend_from_slice(b" HTTP/1.1\r\n\r\n");

    assert!(matches!(parse(&raw).await, Err(ParseError::LineTooLong)));
}

#[tokio::test]
async fn test_parse_too_many_headers() {
    let mut raw = b"GET / HTTP/1.1\r\n".to_vec();
    for i in 0..200 {
        raw.extend_from_slice(format!("X-{}: v\r\n", i).as_bytes());
    }
    raw.extend_from_slice(b"\r\n");

    assert!(matches!(parse(&raw).await, Err(ParseError::TooManyHeaders)));
}

#[test]
fn test_parse_range_forms() {
    assert_eq!(parse_range("bytes=0-499").unwrap(), ByteRange::FromTo { start: 0, end: 500 });
    assert_eq!(parse_range("bytes=0-0").unwrap(), ByteRange::FromTo { start: 0, end: 1 });
    assert_eq!(parse_range("bytes=100-").unwrap(), ByteRange::From { start: 100 });
    assert_eq!(parse_range("bytes=-20").unwrap(), ByteRange::Suffix { len: 20 });
}

#[test]
fn test_parse_range_rejects_malformed() {
    for bad in ["bytes=", "bytes=-", "bytes=5-2", "bytes=0-1,4-5", "items=0-1", "bytes=+1-2", "bytes=1"] {
        assert!(matches!(parse_range(bad), Err(ParseError::InvalidRange)), "{}", bad);
    }
}

#[test]
fn test_byte_range_resolve() {
    assert_eq!(ByteRange::FromTo { start: 2, end: 5 }.resolve(10), Some((2, 5)));
    assert_eq!(ByteRange::FromTo { start: 2, end: 50 }.resolve(10), Some((2, 10)));
    assert_eq!(ByteRange::From { start: 4 }.resolve(10), Some((4, 10)));
    assert_eq!(ByteRange::Suffix { len: 3 }.resolve(10), Some((7, 10)));
    assert_eq!(ByteRange::Suffix { len: 30 }.resolve(10), Some((0, 10)));
    assert_eq!(ByteRange::From { start: 10 }.resolve(10), None);
    assert_eq!(ByteRange::Suffix { len: 0 }.resolve(10), None);
}

#[test]
fn test_normalize_target_forms() {
    assert_eq!(normalize_target("/").unwrap(), ".");
    assert_eq!(normalize_target("/dir/file.txt").unwrap(), "dir/file.txt");
    assert_eq!(normalize_target("file.txt").unwrap(), "file.txt");
    assert_eq!(normalize_target("http://example.com/x/y?z#f").unwrap(), "x/y");
    assert_eq!(normalize_target("/%E2%82%AC.txt").unwrap(), "€.txt");
}

#[test]
fn test_normalize_target_never_escapes_root() {
    assert!(matches!(normalize_target("/../../etc/passwd"), Err(ParseError::PathTraversal)));
    assert!(matches!(normalize_target("/a/..%2F..%2Fb"), Err(ParseError::PathTraversal)));
    assert!(matches!(normalize_target("/a%5C..%5Cb"), Err(ParseError::PathTraversal)));
    assert!(matches!(normalize_target("/a%00b"), Err(ParseError::PathTraversal)));
}

#[test]
fn test_normalize_target_double_slash_is_a_path() {
    assert_eq!(normalize_target("//sub/inner.txt").unwrap(), "sub/inner.txt");
    assert_eq!(normalize_target("//a.txt").unwrap(), "a.txt");
    assert_eq!(normalize_target("//").unwrap(), ".");
    assert!(matches!(normalize_target("//host/.."), Err(ParseError::PathTraversal)));
}

#[test]
fn test_normalize_target_origin_form_rules() {
    // Strip one slash, cut at '?', then decode
    assert_eq!(normalize_target("/a%3Fb?c=d").unwrap(), "a?b");
    assert_eq!(normalize_target("/?only=query").unwrap(), ".");
    assert_eq!(normalize_target("/dir/./f#frag").unwrap(), "dir/f#frag");
    assert_eq!(normalize_target("/ok?x=%zz").unwrap(), "ok");
}

#[test]
fn test_normalize_target_absolute_form() {
    assert_eq!(normalize_target("http://example.com").unwrap(), ".");
    assert_eq!(normalize_target("http://example.com//a//b.txt?q").unwrap(), "a/b.txt");
    assert_eq!(normalize_target("http://example.com/sub/%69nner.txt").unwrap(), "sub/inner.txt");
}

#[test]
fn test_normalize_target_invalid_utf8() {
    assert!(matches!(normalize_target("/%FF%FE"), Err(ParseError::InvalidEncoding)));
}

#[test]
fn test_percent_decode_passthrough() {
    assert_eq!(percent_decode(b"plain+text").unwrap(), b"plain+text");
    assert_eq!(percent_decode(b"%41%42c").unwrap(), b"ABc");
}
