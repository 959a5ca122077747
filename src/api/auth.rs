//! Bearer token authentication for every gRPC server

use std::{
    sync::Arc,
    task::{Context, Poll},
};

use futures::future::BoxFuture;
use http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderMap, HeaderValue, Request, Response,
};
use tonic::{body::Body, Status};
use tower::{Layer, Service};

use crate::{clients::Caller, models::TokenClaims};

/// Methods reachable without a token
const PUBLIC_METHODS: &[&str] = &[
    "/catalog.user.UserService/Register",
    "/catalog.user.UserService/Login",
];

const REFLECTION_PREFIX: &str = "/grpc.reflection.";

fn is_public(path: &str) -> bool {
    PUBLIC_METHODS.contains(&path) || path.starts_with(REFLECTION_PREFIX)
}

/// Verify the `authorization` metadata and build the caller identity
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<Caller, Status> {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Status::permission_denied("Missing authorization metadata"))?;

    let token = authorization
        .strip_prefix("Bearer ")
        .ok_or_else(|| Status::permission_denied("Invalid authorization format"))?;

    let claims = TokenClaims::from_token(token, secret)
        .map_err(|e| Status::permission_denied(format!("Invalid token: {}", e)))?;

    let id = claims
        .user_id()
        .ok_or_else(|| Status::permission_denied("Invalid token subject"))?;

    Ok(Caller {
        id,
        authorization: authorization.to_string(),
    })
}

/// Trailers-only gRPC response carrying `status`
fn reject(status: Status) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/grpc"));
    if let Err(e) = status.add_header(response.headers_mut()) {
        tracing::error!("Failed to encode rejection status: {}", e);
    }
    response
}

/// Tower layer installing [`AuthService`]
#[derive(Clone)]
pub struct AuthLayer {
    secret: Arc<str>,
}

impl AuthLayer {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: Arc::from(secret),
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            secret: self.secret.clone(),
        }
    }
}

/// Rejects unauthenticated calls and attaches [`Caller`] to the rest
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    secret: Arc<str>,
}

impl<S, ReqBody> Service<Request<ReqBody>> for AuthService<S>
where
    S: Service<Request<ReqBody>, Response = Response<Body>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        let path = request.uri().path().to_string();

        if !is_public(&path) {
            match authenticate(request.headers(), &self.secret) {
                Ok(caller) => {
                    tracing::debug!(method = %path, caller = %caller.id, "Authenticated call");
                    request.extensions_mut().insert(caller);
                }
                Err(status) => {
                    tracing::debug!(method = %path, reason = status.message(), "Rejected call");
                    return Box::pin(async move { Ok(reject(status)) });
                }
            }
        }

        Box::pin(self.inner.call(request))
    }
}
