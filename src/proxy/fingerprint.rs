//! Cache key derivation.
//!
//! The key is always computed from the request buffer captured before any
//! backend bytes are read. [`CacheKey::Response`] keeps the legacy behaviour of
//! storing entries under the response bytes; lookups in that mode still use
//! the raw request, so such entries only hit when a client sends bytes equal
//! to an earlier response.

use crate::config::CacheKey;

/// Key used to look a request up in the cache.
pub fn lookup_key(mode: CacheKey, request: &[u8]) -> &[u8] {
    match mode {
        CacheKey::Request | CacheKey::Response => request,
        CacheKey::RequestTarget => request_target(request).unwrap_or(request),
    }
}

/// Key under which a relayed response is stored.
pub fn insert_key<'a>(mode: CacheKey, request: &'a [u8], response: &'a [u8]) -> &'a [u8] {
    match mode {
        CacheKey::Response => response,
        _ => lookup_key(mode, request),
    }
}

/// Second whitespace-separated token of the first line, e.g. `/x` in
/// `GET /x HTTP/1.1`.
pub fn request_target(request: &[u8]) -> Option<&[u8]> {
    let line_end = request
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(request.len());
    request[..line_end]
        .split(|b| b.is_ascii_whitespace())
        .filter(|token| !token.is_empty())
        .nth(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_target_from_request_line() {
        assert_eq!(
            request_target(b"GET /img/logo.png HTTP/1.1\r\nHost: x\r\n\r\n"),
            Some(&b"/img/logo.png"[..])
        );
        assert_eq!(request_target(b"GET   /x"), Some(&b"/x"[..]));
        assert_eq!(request_target(b"GET\r\n/x"), None);
        assert_eq!(request_target(b""), None);
    }

    #[test]
    fn target_mode_shares_key_across_headers() {
        let a = b"GET /x HTTP/1.1\r\nUser-Agent: a\r\n\r\n";
        let b = b"GET /x HTTP/1.1\r\nUser-Agent: b\r\n\r\n";
        assert_eq!(
            lookup_key(CacheKey::RequestTarget, a),
            lookup_key(CacheKey::RequestTarget, b)
        );
        assert_ne!(lookup_key(CacheKey::Request, a), lookup_key(CacheKey::Request, b));
    }

    #[test]
    fn target_mode_falls_back_to_raw_request() {
        assert_eq!(lookup_key(CacheKey::RequestTarget, b"PING"), b"PING");
    }

    #[test]
    fn response_mode_stores_under_response() {
        let request = b"GET /x";
        let response = b"200 OK body";
        assert_eq!(lookup_key(CacheKey::Response, request), request);
        assert_eq!(insert_key(CacheKey::Response, request, response), response);
        assert_eq!(insert_key(CacheKey::Request, request, response), request);
    }
}
