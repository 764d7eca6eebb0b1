use crate::config::MediaConfig;
use crate::datastore::Datastore;
use crate::metrics;
use crate::twoface::Fallible;
use actix_web::web;
use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;

pub mod admin;
pub mod frontend;
pub mod medias;
pub mod posts;
pub mod users;

/// Shared by every handler. `ds` is cheap to clone (it's a connection pool handle).
#[derive(Clone)]
pub struct State<DS> {
    pub ds: DS,
    pub media: MediaConfig,
    /// Where the web client's files live.
    pub static_dir: PathBuf,
}

/// The generic `{result, message}` answer to a mutation.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub result: bool,
    pub message: &'static str,
}

impl Outcome {
    pub fn new(result: bool, ok: &'static str, noop: &'static str) -> Self {
        Self {
            result,
            message: if result { ok } else { noop },
        }
    }
}

/// Mount every route. The admin scope is only mounted if asked for. The web client catches every
/// other GET, so it goes last.
pub fn configure<DS: Datastore>(cfg: &mut web::ServiceConfig, enable_admin: bool) {
    cfg.service(
        web::scope("/api")
            .configure(users::configure::<DS>)
            .configure(posts::configure::<DS>)
            .configure(medias::configure::<DS>),
    )
    .service(web::scope("/uploads").configure(medias::configure_uploads::<DS>));
    if enable_admin {
        cfg.service(web::scope("/admin").configure(admin::configure::<DS>));
    }
    frontend::configure::<DS>(cfg);
}

/// Execute the closure, then log its operational metrics, e.g. time taken, whether it returned Ok/Err, etc.
async fn observe<F, Fut, R>(name: &'static str, f: F) -> Fallible<R>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Fallible<R>>,
{
    let start = Instant::now();
    let return_val = f().await;
    let duration = start.elapsed();
    metrics::HANDLER_SECS
        .with_label_values(&[name])
        .observe(duration.as_secs_f64());
    metrics::RESPONSES
        .with_label_values(&[name, variant_name(&return_val)])
        .inc();
    return_val
}

fn variant_name<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "err"
    }
}
