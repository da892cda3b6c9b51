use axum::{
    extract::{ConnectInfo, OriginalUri},
    http::{header, Extensions, HeaderMap, Method, Request, StatusCode, Uri, Version},
};
use std::{
    borrow::Cow,
    fmt,
    net::{IpAddr, SocketAddr},
};

pub const X_REQUEST_ID: &str = "x-request-id";
const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// The parts of a request that stay readable after the request itself has been
/// handed to the inner service.
#[derive(Debug, Clone)]
pub struct RequestHead {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    peer_addr: Option<SocketAddr>,
}

impl RequestHead {
    pub fn capture<B>(request: &Request<B>) -> Self {
        let extensions = request.extensions();

        // Nested routers strip their prefix from the uri
        let uri = match extensions.get::<OriginalUri>() {
            Some(OriginalUri(uri)) => uri.clone(),
            None => request.uri().clone(),
        };

        Self {
            method: request.method().clone(),
            uri,
            version: request.version(),
            headers: request.headers().clone(),
            peer_addr: extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Path and query as sent by the client, without scheme or authority.
    pub fn request_target(&self) -> &str {
        self.uri
            .path_and_query()
            .map_or("/", |path_and_query| path_and_query.as_str())
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        header_lossy(&self.headers, name)
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    pub fn protocol(&self) -> &'static str {
        protocol_name(self.version)
    }

    /// `Host` header, falling back to the uri authority (HTTP/2 sends `:authority`).
    pub fn host(&self) -> Option<Cow<'_, str>> {
        self.header(header::HOST.as_str()).or_else(|| {
            self.uri
                .authority()
                .map(|authority| Cow::Borrowed(authority.as_str()))
        })
    }

    /// Client address as reported by proxies, then the socket peer address.
    pub fn client_ip(&self) -> Option<String> {
        let forwarded = self.header(X_FORWARDED_FOR);
        let real_ip = self.header(X_REAL_IP);

        forwarded
            .as_deref()
            .and_then(|forwarded| forwarded.split(',').next())
            .and_then(parse_ip)
            .or_else(|| real_ip.as_deref().and_then(parse_ip))
            .or_else(|| self.peer_addr.map(|addr| addr.ip()))
            .map(|ip| ip.to_string())
    }
}

fn parse_ip(value: &str) -> Option<IpAddr> {
    value.trim().parse().ok()
}

/// Header values are not required to be UTF-8, invalid bytes are replaced.
pub(crate) fn header_lossy<'a>(headers: &'a HeaderMap, name: &str) -> Option<Cow<'a, str>> {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
}

fn protocol_name(version: Version) -> &'static str {
    if version == Version::HTTP_09 {
        "HTTP/0.9"
    } else if version == Version::HTTP_10 {
        "HTTP/1.0"
    } else if version == Version::HTTP_11 {
        "HTTP/1.1"
    } else if version == Version::HTTP_2 {
        "HTTP/2.0"
    } else if version == Version::HTTP_3 {
        "HTTP/3.0"
    } else {
        ""
    }
}

/// Borrowed view of the final response, taken after the inner service returned.
#[derive(Debug, Clone, Copy)]
pub struct ResponseView<'a> {
    pub(crate) status: StatusCode,
    pub(crate) headers: &'a HeaderMap,
    pub(crate) extensions: &'a Extensions,
    pub(crate) body_size: Option<u64>,
}

impl<'a> ResponseView<'a> {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &'a HeaderMap {
        self.headers
    }

    pub fn extensions(&self) -> &'a Extensions {
        self.extensions
    }

    /// Exact body length if the body knows it, otherwise the `Content-Length` header.
    pub fn size(&self) -> Option<u64> {
        self.body_size.or_else(|| {
            self.headers
                .get(header::CONTENT_LENGTH)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse().ok())
        })
    }
}

#[derive(Clone, Copy)]
pub(crate) enum Outcome<'a> {
    Response(ResponseView<'a>),
    Failed(&'a (dyn fmt::Display + 'a)),
}

/// A finished request/response exchange, as seen by skippers and sinks.
#[derive(Clone, Copy)]
pub struct Exchange<'a> {
    pub(crate) request: &'a RequestHead,
    pub(crate) outcome: Outcome<'a>,
}

impl<'a> Exchange<'a> {
    pub fn request(&self) -> &'a RequestHead {
        self.request
    }

    /// `None` when the inner service returned an error instead of a response.
    pub fn response(&self) -> Option<ResponseView<'a>> {
        match self.outcome {
            Outcome::Response(response) => Some(response),
            Outcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&'a (dyn fmt::Display + 'a)> {
        match self.outcome {
            Outcome::Response(_) => None,
            Outcome::Failed(error) => Some(error),
        }
    }
}

impl fmt::Debug for Exchange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Exchange");
        debug.field("request", self.request);
        match self.outcome {
            Outcome::Response(response) => debug.field("response", &response),
            Outcome::Failed(error) => debug.field("failure", &error.to_string()),
        };
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::RequestHead;
    use axum::{
        body::Body,
        extract::ConnectInfo,
        http::{HeaderValue, Request, Version},
    };
    use std::net::SocketAddr;

    fn request(builder: axum::http::request::Builder) -> Request<Body> {
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn client_ip_prefers_forwarded_for() {
        let mut req = request(
            Request::builder()
                .uri("/")
                .header("X-Forwarded-For", " 203.0.113.7, 10.0.0.2")
                .header("X-Real-Ip", "198.51.100.1"),
        );
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 9000))));

        let head = RequestHead::capture(&req);
        assert_eq!(head.client_ip().as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn client_ip_falls_back_to_peer() {
        let mut req = request(Request::builder().uri("/"));
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 1, 2, 3], 9000))));

        let head = RequestHead::capture(&req);
        assert_eq!(head.client_ip().as_deref(), Some("10.1.2.3"));
        assert_eq!(head.peer_addr().map(|addr| addr.port()), Some(9000));
    }

    #[test]
    fn client_ip_unknown() {
        let head = RequestHead::capture(&request(Request::builder().uri("/")));
        assert_eq!(head.client_ip(), None);
    }

    #[test]
    fn host_from_authority() {
        let head = RequestHead::capture(&request(
            Request::builder()
                .uri("https://example.com/api?x=1")
                .version(Version::HTTP_2),
        ));
        assert_eq!(head.host().as_deref(), Some("example.com"));
        assert_eq!(head.protocol(), "HTTP/2.0");
        assert_eq!(head.path(), "/api");
        assert_eq!(head.query(), Some("x=1"));
    }

    #[test]
    fn host_header_wins() {
        let head = RequestHead::capture(&request(
            Request::builder()
                .uri("http://internal:8080/")
                .header("Host", "example.org"),
        ));
        assert_eq!(head.host().as_deref(), Some("example.org"));
    }

    #[test]
    fn client_ip_skips_invalid_entries() {
        let mut req = request(
            Request::builder()
                .uri("/")
                .header("X-Forwarded-For", "unknown, 10.0.0.2")
                .header("X-Real-Ip", "not-an-ip"),
        );
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 44], 9000))));

        let head = RequestHead::capture(&req);
        assert_eq!(head.client_ip().as_deref(), Some("192.0.2.44"));
    }

    #[test]
    fn client_ip_from_real_ip() {
        let head = RequestHead::capture(&request(
            Request::builder()
                .uri("/")
                .header("X-Forwarded-For", "garbage")
                .header("X-Real-Ip", " 2001:db8::1 "),
        ));
        assert_eq!(head.client_ip().as_deref(), Some("2001:db8::1"));
    }

    #[test]
    fn non_utf8_header_is_kept() {
        let head = RequestHead::capture(&request(
            Request::builder()
                .uri("/")
                .header("User-Agent", HeaderValue::from_bytes(b"B\xfcro/1.0").unwrap()),
        ));
        assert_eq!(head.header("user-agent").as_deref(), Some("B\u{fffd}ro/1.0"));
    }

    #[test]
    fn request_target_drops_scheme_and_authority() {
        let head = RequestHead::capture(&request(
            Request::builder()
                .uri("https://example.com/api?name=kai")
                .version(Version::HTTP_2),
        ));
        assert_eq!(head.request_target(), "/api?name=kai");

        let head = RequestHead::capture(&request(Request::builder().uri("https://example.com")));
        assert_eq!(head.request_target(), "/");
    }
}
