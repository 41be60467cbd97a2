use crate::http::text_response;
use http_body_util::combinators::BoxBody;
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

/// Administrative endpoints served on a separate listener.
///
/// `/health` answers as soon as the listener is up; `/ready` consults the
/// readiness probe supplied by the hosting service.
pub struct AdminService<F, E> {
    is_ready: F,
    _error: PhantomData<fn() -> E>,
}

impl<F, E> AdminService<F, E>
where
    F: Fn() -> bool,
{
    pub fn new(is_ready: F) -> Self {
        Self {
            is_ready,
            _error: PhantomData,
        }
    }
}

impl<F, E> Service<Request<Incoming>> for AdminService<F, E>
where
    F: Fn() -> bool + Send + Sync + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    type Response = Response<BoxBody<Bytes, E>>;
    type Error = E;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let ready = (self.is_ready)();

        Box::pin(async move {
            let res = match req.uri().path() {
                "/health" => text_response(StatusCode::OK, "ok\n"),
                "/ready" if ready => text_response(StatusCode::OK, "ok\n"),
                "/ready" => text_response(StatusCode::SERVICE_UNAVAILABLE, "not ready\n"),
                _ => text_response(StatusCode::NOT_FOUND, "not found\n"),
            };
            Ok(res)
        })
    }
}
