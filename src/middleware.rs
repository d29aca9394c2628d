//! Per-client request throttling for authenticated endpoints.

use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroU32;
use std::sync::Arc;

use actix_web::body::EitherBody;
use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::{Error, FromRequest, HttpResponse};
use futures::future::{LocalBoxFuture, Ready, ready};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use serde_json::json;

use crate::extractors::CurrentUser;

/// Body of the response sent once a client exhausts its quota.
pub const RATE_LIMIT_MESSAGE: &str = "Request limit exceeded. Try again later";

/// Number of tracked clients above which idle entries are dropped.
const PRUNE_THRESHOLD: usize = 1024;

/// Limits each client IP to `n` requests per minute and answers
/// `429 Too Many Requests` beyond it.
///
/// Clients are identified by the socket peer address; forwarding headers are
/// ignored. The quota is a GCRA cell: a burst of `n` requests, then one more
/// every `60 / n` seconds. Requests that fail authentication are answered
/// with the usual 401 and do not consume quota.
///
/// The limiter state is shared between clones, so create the middleware once
/// and clone it into every worker.
#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<DefaultKeyedRateLimiter<IpAddr>>,
}

impl RateLimit {
    pub fn per_minute(requests: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
        }
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            limiter: Arc::clone(&self.limiter),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: S,
    limiter: Arc<DefaultKeyedRateLimiter<IpAddr>>,
}

impl<S> RateLimitMiddleware<S> {
    fn prune(&self) {
        if self.limiter.len() > PRUNE_THRESHOLD {
            self.limiter.retain_recent();
            self.limiter.shrink_to_fit();
            log::debug!("Rate limiter pruned to {} clients", self.limiter.len());
        }
    }
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Err(e) = CurrentUser::from_request(req.request(), &mut Payload::None).into_inner() {
            let response = req.error_response(e).map_into_right_body();
            return Box::pin(async move { Ok(response) });
        }

        let client = req
            .peer_addr()
            .map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), |addr| addr.ip());
        let allowed = self.limiter.check_key(&client).is_ok();
        self.prune();

        if !allowed {
            log::warn!("Rate limit exceeded for {client} on {}", req.path());
            let response = HttpResponse::TooManyRequests()
                .json(json!({ "error": RATE_LIMIT_MESSAGE }))
                .map_into_right_body();
            return Box::pin(async move { Ok(req.into_response(response)) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
