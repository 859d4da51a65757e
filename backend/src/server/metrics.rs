//! Optional Prometheus metrics middleware.
//!
//! [`MetricsLayer`] always wraps the app so both branches share one response
//! body type; the disabled variant only boxes the body.

use std::sync::Arc;

use actix_service::{
    Service, ServiceExt as _, Transform,
    boxed::{self, BoxService},
};
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use futures_util::future::LocalBoxFuture;
use prometheus::Registry;

const NAMESPACE: &str = "cinerate";
const ENDPOINT: &str = "/metrics";

/// Build request metrics exported at `/metrics` from `registry`.
///
/// # Errors
/// Returns an error when the collectors cannot be registered.
pub fn prometheus_metrics(
    registry: Registry,
) -> Result<PrometheusMetrics, Box<dyn std::error::Error + Send + Sync>> {
    PrometheusMetricsBuilder::new(NAMESPACE)
        .registry(registry)
        .endpoint(ENDPOINT)
        .build()
}

#[derive(Clone)]
pub(crate) enum MetricsLayer {
    Enabled(Arc<PrometheusMetrics>),
    Disabled,
}

impl From<Option<PrometheusMetrics>> for MetricsLayer {
    fn from(metrics: Option<PrometheusMetrics>) -> Self {
        metrics.map_or(Self::Disabled, |m| Self::Enabled(Arc::new(m)))
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        match self {
            Self::Enabled(metrics) => {
                let fut = Compat::new(PrometheusMetrics::clone(metrics)).new_transform(service);
                Box::pin(async move { Ok(boxed::service(fut.await?)) })
            }
            Self::Disabled => {
                let svc = service.map(ServiceResponse::map_into_boxed_body);
                Box::pin(async move { Ok(boxed::service(svc)) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[actix_web::test]
    async fn enabled_layer_serves_request_counters() {
        let metrics = prometheus_metrics(Registry::new()).expect("metrics");
        let app = test::init_service(
            App::new()
                .wrap(MetricsLayer::from(Some(metrics)))
                .route("/ping", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri(ENDPOINT).to_request()).await;
        let body = test::read_body(res).await;
        let text = std::str::from_utf8(&body).expect("utf8");
        assert!(text.contains("cinerate_http_requests_total"));
    }

    #[rstest]
    #[actix_web::test]
    async fn disabled_layer_passes_through() {
        let app = test::init_service(
            App::new()
                .wrap(MetricsLayer::from(None))
                .route("/ping", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
        assert!(res.status().is_success());
        let res =
            test::call_service(&app, test::TestRequest::get().uri(ENDPOINT).to_request()).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::NOT_FOUND);
    }
}
