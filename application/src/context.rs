//! [`Context`]-related definitions.

use std::sync::atomic::{self, AtomicU16};

use axum::{async_trait, extract::FromRequestParts};
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use service::domain;
use uuid::Uuid;

#[cfg(doc)]
use crate::api::user;
use crate::{api, define_error, Error, JuniperResponse, Service};

/// HTTP header carrying the ID of the acting `User`.
///
/// Authentication itself is owned by an upstream gateway; by the time a
/// request reaches this application the header value is trusted.
pub(crate) const ACTOR_HEADER: &str = "x-actor-id";

/// Application context.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// Error status code.
    error_status_code: AtomicU16,

    /// Acting `User` extracted from the [`ACTOR_HEADER`].
    actor: Actor,
}

/// Result of extracting the [`ACTOR_HEADER`] from a request.
#[derive(Clone, Copy, Debug)]
enum Actor {
    /// Header was not provided.
    Missing,

    /// Header was provided, but is not a valid [`user::Id`].
    Malformed,

    /// Header carried a valid [`user::Id`].
    Id(api::user::Id),
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the error status code of this [`Context`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn error_status_code(&self) -> http::StatusCode {
        http::StatusCode::from_u16(
            self.error_status_code.load(atomic::Ordering::Relaxed),
        )
        .expect("invalid status code")
    }

    /// Sets the error status code for this [`Context`].
    ///
    /// Provided [`http::StatusCode`] will be applied to the response.
    pub fn set_error_status_code(&self, status_code: http::StatusCode) {
        self.error_status_code
            .store(status_code.as_u16(), atomic::Ordering::Relaxed);
    }

    /// Helper method calling [`Context::set_error_status_code()`] inside
    /// [`Result::map_err()`] closure.
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            self.set_error_status_code(err.status_code);
            err
        }
    }

    /// Returns the ID of the acting `User` of the current request.
    ///
    /// # Errors
    ///
    /// Errors if the [`ACTOR_HEADER`] is missing or malformed.
    pub fn actor(&self) -> Result<api::user::Id, Error> {
        match self.actor {
            Actor::Id(id) => Ok(id),
            Actor::Missing => Err(ActorError::Required.into()),
            Actor::Malformed => Err(ActorError::Malformed.into()),
        }
        .map_err(self.error())
    }
}

impl juniper::Context for Context {}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = JuniperResponse;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service =
            parts.extensions.get::<Service>().cloned().ok_or_else(|| {
                JuniperResponse {
                    status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
                    response: GraphQLBatchResponse::Single(
                        GraphQLResponse::error(
                            Error::internal(&"missing `Service` extension")
                                .into_field_error(),
                        ),
                    ),
                }
            })?;

        let actor = match parts.headers.get(ACTOR_HEADER) {
            None => Actor::Missing,
            Some(v) => v
                .to_str()
                .ok()
                .and_then(|s| s.parse::<Uuid>().ok())
                .map_or(Actor::Malformed, |id| {
                    Actor::Id(domain::user::Id::from(id).into())
                }),
        };

        Ok(Self {
            service,
            error_status_code: AtomicU16::new(
                http::StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            ),
            actor,
        })
    }
}

define_error! {
    enum ActorError {
        #[code = "ACTOR_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Acting `User` ID must be provided in the `X-Actor-Id` \
                     header"]
        Required,

        #[code = "ACTOR_REQUIRED"]
        #[status = BAD_REQUEST]
        #[message = "`X-Actor-Id` header is not a valid `User` ID"]
        Malformed,
    }
}
