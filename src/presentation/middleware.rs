use std::cell::RefCell;
use std::future::{Ready, ready};
use std::marker::PhantomData;
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Instant;

use actix_service::{Service, Transform};
use actix_web::body::{BoxBody, EitherBody};
use actix_web::cookie::Cookie;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{Error, HttpMessage, HttpResponse, ResponseError, web};
use futures_util::future::LocalBoxFuture;
use tracing::info;
use uuid::Uuid;

use crate::application::session_service::SessionService;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::presentation::utils::AuthenticatedUser;

static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

pub const SESSION_COOKIE: &str = "sessionId";

#[derive(Clone)]
pub struct RequestId(pub String);

/// Tags every request with an id and logs method/path/status/duration
/// once the response is ready.
pub struct RequestLogMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestLogMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLogService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLogService { service }))
    }
}

pub struct RequestLogService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLogService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = req
            .headers()
            .get(&REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_owned())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        req.extensions_mut().insert(RequestId(request_id.clone()));

        let start = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_owned();

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            let status = res.status().as_u16();
            info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status,
                duration_ms = start.elapsed().as_millis(),
                "request completed"
            );

            if let Ok(value) = HeaderValue::from_str(&request_id) {
                res.response_mut()
                    .headers_mut()
                    .insert(REQUEST_ID_HEADER.clone(), value);
            }
            Ok(res)
        })
    }
}

/// Session gate for the meals scope. Resolves the `sessionId` cookie to a
/// user before any route body runs; on first contact it mints an identity,
/// sets the cookie on the 401 response and lets the client retry with it.
/// Generic over the user repository so the gate can run against any
/// `SessionService` found in app data.
pub struct SessionAuthMiddleware<R: UserRepository + 'static> {
    _repo: PhantomData<fn() -> R>,
}

impl<R: UserRepository + 'static> SessionAuthMiddleware<R> {
    pub fn new() -> Self {
        Self { _repo: PhantomData }
    }
}

impl<R: UserRepository + 'static> Default for SessionAuthMiddleware<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B, R> Transform<S, ServiceRequest> for SessionAuthMiddleware<R>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    R: UserRepository + 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthService<S, R>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthService {
            service: Rc::new(RefCell::new(service)),
            _repo: PhantomData,
        }))
    }
}

pub struct SessionAuthService<S, R: UserRepository + 'static> {
    service: Rc<RefCell<S>>,
    _repo: PhantomData<fn() -> R>,
}

impl<S, B, R> Service<ServiceRequest> for SessionAuthService<S, R>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    R: UserRepository + 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.borrow_mut().poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        let sessions = req.app_data::<web::Data<SessionService<R>>>().cloned();

        let cookie = req.cookie(SESSION_COOKIE);

        Box::pin(async move {
            let sessions = sessions.ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("SessionService missing")
            })?;

            match cookie {
                Some(cookie) => {
                    let resolved = match Uuid::parse_str(cookie.value()) {
                        Ok(token) => sessions.resolve(token).await,
                        Err(_) => Err(DomainError::Unauthorized),
                    };
                    let user = match resolved {
                        Ok(user) => user,
                        Err(err) => {
                            let response = err.error_response();
                            return Ok(req.into_response(response).map_into_right_body());
                        }
                    };
                    req.extensions_mut().insert(AuthenticatedUser { id: user.id });

                    let fut = {
                        let svc = service.borrow_mut();
                        svc.call(req)
                    };
                    let res = fut.await?;
                    Ok(res.map_into_left_body())
                }
                None => {
                    // First contact: mint an identity, hand out the cookie,
                    // still reject this request.
                    let user = sessions.start_session().await?;
                    let cookie = Cookie::build(SESSION_COOKIE, user.session_id.to_string())
                        .path("/")
                        .finish();
                    let response = HttpResponse::Unauthorized().cookie(cookie).finish();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}
