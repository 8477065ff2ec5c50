use crate::{api::attendance, config::Config};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use anyhow::{Result, anyhow};
use std::sync::Arc;

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-route limiters, shared by every worker.
#[derive(Clone)]
pub struct Limiters {
    upload: Limiter,
    report: Limiter,
}

fn build_limiter(requests_per_min: u32) -> Result<Limiter> {
    let per_ms = (60_000 / u64::from(requests_per_min.max(1))).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min} per minute"))?;

    Ok(Arc::new(Governor::new(&cfg)))
}

impl Limiters {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            upload: build_limiter(config.rate_upload_per_min)?,
            report: build_limiter(config.rate_report_per_min)?,
        })
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limiters: &Limiters) {
    cfg.service(
        web::scope(api_prefix).service(
            web::scope("/attendance")
                // /attendance/upload
                .service(
                    web::resource("/upload")
                        .wrap(limiters.upload.clone())
                        .route(web::post().to(attendance::upload)),
                )
                // /attendance/daily?date=
                .service(
                    web::resource("/daily")
                        .wrap(limiters.report.clone())
                        .route(web::get().to(attendance::daily_report)),
                )
                // /attendance/employee/{employee_id}?month=
                .service(
                    web::resource("/employee/{employee_id}")
                        .wrap(limiters.report.clone())
                        .route(web::get().to(attendance::monthly_report)),
                )
                // /attendance/normalize
                .service(
                    web::resource("/normalize").route(web::post().to(attendance::normalize)),
                ),
        ),
    );
}

// UPLOAD
//  └─ POST sheet rows → quarantine bad rows → upsert by (employee_id, date)

// REPORT
//  ├─ daily   → attendance_data ⋈ employees for one date
//  └─ monthly → one employee, one month, with totals
//       └─ every record normalized on read, never stored
