//! Readiness and liveness probes.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};
use serde::Serialize;
use utoipa::ToSchema;

/// Probe flags shared between the server and its handlers.
///
/// The process starts live but not ready; the server marks it ready once
/// migrations and adapters are in place and unhealthy when it starts to drain.
#[derive(Debug)]
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness probes so orchestrators stop routing during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

/// Probe body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProbeStatus {
    #[schema(example = "ok")]
    pub status: &'static str,
}

fn probe(ok: bool) -> HttpResponse {
    let (mut builder, status) = if ok {
        (HttpResponse::Ok(), "ok")
    } else {
        (HttpResponse::ServiceUnavailable(), "unavailable")
    };
    builder
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(ProbeStatus { status })
}

/// `200` once the server can take traffic.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Ready", body = ProbeStatus),
        (status = 503, description = "Starting up", body = ProbeStatus)
    ),
    tags = ["health"],
    operation_id = "ready",
    security([])
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    probe(state.is_ready())
}

/// `200` until the server starts draining.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Alive", body = ProbeStatus),
        (status = 503, description = "Draining", body = ProbeStatus)
    ),
    tags = ["health"],
    operation_id = "live",
    security([])
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    probe(state.is_alive())
}
