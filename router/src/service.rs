//! The request pipeline as a hyper service.
//!
//! One linear pass per request: extract the fingerprint, list the store,
//! select an experiment, resolve the path, emit. No state survives between
//! requests; two requests with the same fingerprint take the same route as
//! long as the bucket listing is unchanged.

use crate::errors::RouterError;
use crate::experiments::ExperimentSet;
use crate::fingerprint::{Fingerprint, FingerprintConfig};
use crate::metrics_defs::{EMPTY_EXPERIMENT_SET, GENERIC_NOT_FOUND, REQUEST_DURATION, STORE_ERRORS};
use crate::resolver::{Resolution, resolve};
use crate::selector::select_experiment;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use shared::http::text_response;
use shared::{counter, histogram};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use store::ObjectStore;

const GENERIC_404_BODY: &str = "404 Not Found";

#[derive(Clone)]
pub struct ExperimentService {
    store: Arc<dyn ObjectStore>,
    fingerprint: Arc<FingerprintConfig>,
}

impl ExperimentService {
    pub fn new(store: Arc<dyn ObjectStore>, fingerprint: FingerprintConfig) -> Self {
        Self {
            store,
            fingerprint: Arc::new(fingerprint),
        }
    }

    /// Run the full pipeline for one request. Any method is treated as a
    /// GET-style content fetch; only the path and the two fingerprint
    /// headers are consumed.
    pub async fn handle<B: Send>(
        &self,
        req: Request<B>,
    ) -> Result<Response<BoxBody<Bytes, RouterError>>, RouterError> {
        let started = Instant::now();
        let path = req.uri().path().to_string();
        let fingerprint = Fingerprint::from_headers(req.headers(), &self.fingerprint);
        drop(req);

        let response = match self.route(&fingerprint, &path).await {
            Ok(response) => response,
            Err(RouterError::EmptyExperimentSet) => {
                counter!(EMPTY_EXPERIMENT_SET).increment(1);
                tracing::error!(%path, "bucket listing revealed no experiments");
                text_response(StatusCode::SERVICE_UNAVAILABLE, "no experiments available\n")
            }
            Err(RouterError::Store(err)) => {
                counter!(STORE_ERRORS).increment(1);
                tracing::error!(%path, error = %err, "backing store failed");
                text_response(StatusCode::BAD_GATEWAY, "backing store unavailable\n")
            }
            Err(err) => {
                tracing::error!(%path, error = %err, "request failed");
                text_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error\n")
            }
        };

        histogram!(REQUEST_DURATION).record(started.elapsed().as_secs_f64());
        Ok(response)
    }

    async fn route(
        &self,
        fingerprint: &Fingerprint,
        path: &str,
    ) -> Result<Response<BoxBody<Bytes, RouterError>>, RouterError> {
        let experiments = ExperimentSet::discover(self.store.as_ref()).await?;
        let experiment = select_experiment(fingerprint, &experiments)?;
        tracing::debug!(%experiment, %path, "assigned experiment");

        let resolution = resolve(self.store.as_ref(), experiment, path).await?;
        Ok(emit(resolution))
    }
}

/// Turn a resolution into the wire response: object bytes verbatim with the
/// resolved status, or the fixed plain-text 404.
fn emit(resolution: Resolution) -> Response<BoxBody<Bytes, RouterError>> {
    match resolution {
        Resolution::Object { status, body, .. } => {
            let mut res = Response::new(Full::new(body).map_err(|e| match e {}).boxed());
            *res.status_mut() = status;
            res
        }
        Resolution::Missing => {
            counter!(GENERIC_NOT_FOUND).increment(1);
            text_response(StatusCode::NOT_FOUND, GENERIC_404_BODY)
        }
    }
}

impl Service<Request<Incoming>> for ExperimentService {
    type Response = Response<BoxBody<Bytes, RouterError>>;
    type Error = RouterError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { service.handle(req).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use http_body_util::Empty;
    use store::{MemoryStore, StoreError};

    fn service(store: MemoryStore) -> ExperimentService {
        ExperimentService::new(Arc::new(store), FingerprintConfig::default())
    }

    fn request(path: &str, client_ip: Option<&str>) -> Request<Empty<Bytes>> {
        let mut builder = Request::builder().uri(path);
        if let Some(ip) = client_ip {
            builder = builder.header("x-client-ip", ip);
        }
        builder.body(Empty::new()).unwrap()
    }

    async fn body_text(res: Response<BoxBody<Bytes, RouterError>>) -> String {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn serves_index_from_the_single_experiment() {
        let svc = service(MemoryStore::new().with("control_site/index.html", "<h1>control</h1>"));

        let res = svc.handle(request("/", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "<h1>control</h1>");
    }

    #[tokio::test]
    async fn assignment_follows_the_fingerprint() {
        // Two experiments, listed control first. The hash of
        // ["203.0.113.7",null] lands on index 0, [null,null] on index 1.
        let store = MemoryStore::new()
            .with("control_site/index.html", "control home")
            .with("banner_site/index.html", "banner home");
        let svc = service(store);

        let res = svc.handle(request("/", Some("203.0.113.7"))).await.unwrap();
        assert_eq!(body_text(res).await, "control home");

        let res = svc.handle(request("/", None)).await.unwrap();
        assert_eq!(body_text(res).await, "banner home");
    }

    #[tokio::test]
    async fn repeat_requests_get_the_same_experiment() {
        let store = MemoryStore::new()
            .with("control_site/index.html", "control home")
            .with("banner_site/index.html", "banner home");
        let svc = service(store);

        let first = body_text(svc.handle(request("/", Some("198.51.100.23"))).await.unwrap()).await;
        for _ in 0..10 {
            let again =
                body_text(svc.handle(request("/", Some("198.51.100.23"))).await.unwrap()).await;
            assert_eq!(again, first);
        }
    }

    #[tokio::test]
    async fn custom_404_is_served_with_status_404() {
        let svc = service(MemoryStore::new().with("expA/404.html", "custom miss page"));

        let res = svc.handle(request("/missing", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(res).await, "custom miss page");
    }

    #[tokio::test]
    async fn exhausted_chain_gets_the_fixed_body() {
        // The lone object makes "expA" discoverable but matches no probe
        // for "/missing", and there is no 404.html.
        let svc = service(MemoryStore::new().with("expA/style.css", "body{}"));

        let res = svc.handle(request("/missing", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(res).await, "404 Not Found");
    }

    #[tokio::test]
    async fn empty_store_is_a_service_failure() {
        let svc = service(MemoryStore::new());

        let res = svc.handle(request("/anything", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn deep_only_listing_is_a_service_failure() {
        // Keys exist but none are top-level, so no experiment is revealed.
        let svc = service(MemoryStore::new().with("a/b/c.html", "deep"));

        let res = svc.handle(request("/", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    struct FailingStore;

    #[async_trait]
    impl ObjectStore for FailingStore {
        async fn list(&self) -> Result<Vec<String>, StoreError> {
            Err(StoreError::UnexpectedStatus {
                status: 500,
                context: "list".into(),
            })
        }

        async fn get(&self, _key: &str) -> Result<Option<Bytes>, StoreError> {
            Err(StoreError::UnexpectedStatus {
                status: 500,
                context: "get".into(),
            })
        }
    }

    #[tokio::test]
    async fn store_failure_maps_to_bad_gateway() {
        let svc = ExperimentService::new(Arc::new(FailingStore), FingerprintConfig::default());

        let res = svc.handle(request("/", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    }
}
