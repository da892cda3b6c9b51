use axum::{
    http::{Extensions, Response},
    response::{IntoResponseParts, ResponseParts},
};
use std::convert::Infallible;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Internal diagnostics, only meant for logs
    Private,
    /// Errors that were also shown to the client
    Public,
}

/// An error reported by a handler alongside its response.
///
/// Handlers attach these to the response extensions (either through
/// [`HandlerError::attach_to`] or by returning them as a response part), and the
/// request logger picks up the private ones when `log_error` is enabled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    pub kind: ErrorKind,
    pub message: String,
}

impl HandlerError {
    pub fn private(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Private,
            message: message.into(),
        }
    }

    pub fn public(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Public,
            message: message.into(),
        }
    }

    pub fn attach_to<B>(self, response: &mut Response<B>) {
        self.insert_into(response.extensions_mut());
    }

    fn insert_into(self, extensions: &mut Extensions) {
        match extensions.get_mut::<HandlerErrors>() {
            Some(errors) => errors.push(self),
            None => {
                extensions.insert(HandlerErrors(vec![self]));
            }
        }
    }
}

impl IntoResponseParts for HandlerError {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.insert_into(res.extensions_mut());
        Ok(res)
    }
}

/// Every error attached to a single response, in the order they were reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerErrors(Vec<HandlerError>);

impl HandlerErrors {
    pub fn push(&mut self, error: HandlerError) {
        self.0.push(error);
    }

    pub fn iter(&self) -> impl Iterator<Item = &HandlerError> {
        self.0.iter()
    }

    pub fn by_kind(&self, kind: ErrorKind) -> impl Iterator<Item = &HandlerError> {
        self.0.iter().filter(move |error| error.kind == kind)
    }

    /// Formats errors of the given kind one per line as `Error #NN: message`.
    /// Numbering counts only the errors of that kind.
    pub fn summary(&self, kind: ErrorKind) -> String {
        self.by_kind(kind)
            .enumerate()
            .map(|(i, error)| format!("Error #{:02}: {}", i + 1, error.message))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, HandlerError, HandlerErrors};
    use axum::{
        http::{Response, StatusCode},
        response::IntoResponse,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn attach_accumulates_in_order() {
        let mut response = Response::new(());
        HandlerError::private("first").attach_to(&mut response);
        HandlerError::public("shown").attach_to(&mut response);
        HandlerError::private("second").attach_to(&mut response);

        let errors = response.extensions().get::<HandlerErrors>().unwrap();
        assert_eq!(errors.iter().count(), 3);
        assert_eq!(
            errors.summary(ErrorKind::Private),
            "Error #01: first\nError #02: second"
        );
        assert_eq!(errors.summary(ErrorKind::Public), "Error #01: shown");
    }

    #[test]
    fn response_part() {
        let response = (
            StatusCode::BAD_GATEWAY,
            HandlerError::private("upstream timed out"),
            "bad gateway",
        )
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let errors = response.extensions().get::<HandlerErrors>().unwrap();
        assert_eq!(
            errors.summary(ErrorKind::Private),
            "Error #01: upstream timed out"
        );
    }

    #[test]
    fn empty_summary() {
        assert_eq!(HandlerErrors::default().summary(ErrorKind::Private), "");
    }
}
