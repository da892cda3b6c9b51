use super::{
    config::LoggerConfig,
    exchange::{header_lossy, Exchange, Outcome, RequestHead, ResponseView, X_REQUEST_ID},
    record::RequestLoggerParams,
};
use crate::handler_error::{ErrorKind, HandlerErrors};
use axum::{
    body::HttpBody,
    http::{header, HeaderMap, Request, Response},
};
use chrono::Utc;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use std::{
    collections::HashSet,
    fmt,
    sync::Arc,
    task::{Context, Poll},
    time::Instant,
};
use tower::{Layer, Service};
use tracing::trace;

/// Wraps a service so that every exchange it handles is reported to the
/// configured `log_values` sink.
#[derive(Clone)]
pub struct RequestLoggerLayer {
    shared: Arc<Shared>,
}

struct Shared {
    config: LoggerConfig,
    skip_paths: HashSet<String>,
}

impl RequestLoggerLayer {
    pub fn new(config: LoggerConfig) -> Self {
        let skip_paths = config.skip_paths.iter().cloned().collect();
        Self {
            shared: Arc::new(Shared { config, skip_paths }),
        }
    }
}

impl<S> Layer<S> for RequestLoggerLayer {
    type Service = RequestLogger<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLogger {
            inner,
            shared: self.shared.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RequestLogger<S> {
    inner: S,
    shared: Arc<Shared>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestLogger<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: fmt::Display + Send + 'static,
    ReqBody: Send + 'static,
    ResBody: HttpBody + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let started_at = Utc::now();
        let start = Instant::now();

        // The clone may not be ready, keep the one that was polled
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let shared = self.shared.clone();
        let head = RequestHead::capture(&request);

        Box::pin(async move {
            let result = inner.call(request).await;

            let outcome = match &result {
                Ok(response) => Outcome::Response(ResponseView {
                    status: response.status(),
                    headers: response.headers(),
                    extensions: response.extensions(),
                    body_size: response.body().size_hint().exact(),
                }),
                Err(error) => Outcome::Failed(error),
            };
            let exchange = Exchange {
                request: &head,
                outcome,
            };
            shared.log(&exchange, started_at, start);

            result
        })
    }
}

impl Shared {
    fn should_skip(&self, exchange: &Exchange<'_>) -> bool {
        self.skip_paths.contains(exchange.request.path())
            || self
                .config
                .skipper
                .as_ref()
                .is_some_and(|skipper| skipper(exchange))
    }

    fn log(&self, exchange: &Exchange<'_>, started_at: chrono::DateTime<Utc>, start: Instant) {
        if self.should_skip(exchange) {
            trace!("Skipping request log for {}", exchange.request.path());
            return;
        }

        let params = self.extract(exchange, started_at, start);

        if let Some(log_values) = &self.config.log_values {
            log_values(exchange, params);
        }
    }

    fn extract(
        &self,
        exchange: &Exchange<'_>,
        started_at: chrono::DateTime<Utc>,
        start: Instant,
    ) -> RequestLoggerParams {
        let config = &self.config;
        let request = exchange.request;
        let response = exchange.response();

        let mut params = RequestLoggerParams::new(started_at);

        if config.log_protocol {
            params.protocol = request.protocol().to_owned();
        }

        if config.log_remote_ip {
            params.remote_ip = request.client_ip().unwrap_or_default();
        }

        if config.log_host {
            params.host = request.host().unwrap_or_default().into_owned();
        }

        if config.log_method {
            params.method = request.method().to_string();
        }

        if config.log_uri {
            params.uri = request.request_target().to_owned();
        }

        if config.log_uri_path {
            params.uri_path = request.path().to_owned();
        }

        if config.log_request_id {
            params.request_id = request
                .header(X_REQUEST_ID)
                .or_else(|| {
                    response.and_then(|response| header_lossy(response.headers(), X_REQUEST_ID))
                })
                .unwrap_or_default()
                .into_owned();
        }

        if config.log_referer {
            params.referer = request
                .header(header::REFERER.as_str())
                .unwrap_or_default()
                .into_owned();
        }

        if config.log_user_agent {
            params.user_agent = request
                .header(header::USER_AGENT.as_str())
                .unwrap_or_default()
                .into_owned();
        }

        if config.log_status {
            params.status = response.map_or(0, |response| response.status().as_u16());
        }

        if config.log_error {
            params.error = match (response, exchange.failure()) {
                (Some(response), _) => response
                    .extensions()
                    .get::<HandlerErrors>()
                    .map(|errors| errors.summary(ErrorKind::Private))
                    .unwrap_or_default(),
                (None, Some(error)) => error.to_string(),
                (None, None) => String::new(),
            };
        }

        if config.log_content_length {
            params.content_length = request
                .header(header::CONTENT_LENGTH.as_str())
                .unwrap_or_default()
                .into_owned();
        }

        if config.log_response_size {
            params.response_size = match response {
                Some(response) => response
                    .size()
                    .and_then(|size| i64::try_from(size).ok())
                    .unwrap_or(-1),
                None => 0,
            };
        }

        if !config.log_headers.is_empty() {
            params.headers = extract_headers(request.headers(), &config.log_headers);
        }

        if !config.log_query_params.is_empty() {
            params.query_params = extract_query_params(request.query(), &config.log_query_params);
        }

        if config.log_latency {
            params.latency = start.elapsed();
        }

        params
    }
}

fn extract_headers(headers: &HeaderMap, names: &[String]) -> IndexMap<String, Vec<String>> {
    names
        .iter()
        .map(|name| {
            let values = headers
                .get_all(name.as_str())
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                .collect();
            (name.clone(), values)
        })
        .collect()
}

fn extract_query_params(query: Option<&str>, names: &[String]) -> IndexMap<String, Vec<String>> {
    let mut params: IndexMap<String, Vec<String>> =
        names.iter().map(|name| (name.clone(), Vec::new())).collect();

    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if let Some(values) = params.get_mut(key.as_ref()) {
                values.push(value.into_owned());
            }
        }
    }

    params
}
