//! The browser client: `index.html` at `/`, and its assets from the static directory.
use crate::api::{observe, State};
use crate::datastore::Datastore;
use crate::media;
use crate::twoface::{Cause, ExternalError, Fallible, OrReject};
use actix_web::{web, HttpResponse};

const INDEX: &str = "index.html";

pub fn configure<DS: Datastore>(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(get_index::<DS>)))
        .service(web::resource("/{path:.*}").route(web::get().to(get_static::<DS>)));
}

async fn serve<DS>(state: &State<DS>, path: &str) -> Fallible<HttpResponse> {
    let bytes = media::read_under(&state.static_dir, path)
        .await?
        .or_reject(ExternalError {
            cause: Cause::NotFound,
            text: "Page not found",
        })?;
    Ok(HttpResponse::Ok()
        .content_type(media::content_type(path))
        .body(bytes))
}

async fn get_index<DS: Datastore>(state: web::Data<State<DS>>) -> Fallible<HttpResponse> {
    observe("get_index", || async move { serve(&state, INDEX).await }).await
}

async fn get_static<DS: Datastore>(
    state: web::Data<State<DS>>,
    path: web::Path<String>,
) -> Fallible<HttpResponse> {
    observe("get_static", || async move { serve(&state, &path).await }).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::mock;
    use crate::media::tests::scratch_media;
    use actix_web::{
        http::{header, StatusCode},
        test, App,
    };

    #[actix_rt::test]
    async fn test_client_pages_and_assets() {
        let media = scratch_media();
        let static_dir = scratch_media().upload_dir;
        std::fs::write(static_dir.join(INDEX), "<h1>microfeed</h1>").unwrap();
        std::fs::create_dir_all(static_dir.join("js")).unwrap();
        std::fs::write(static_dir.join("js/app.js"), "start()").unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(State {
                    ds: mock::Client::default(),
                    media: media.clone(),
                    static_dir: static_dir.clone(),
                }))
                .configure(|cfg| crate::api::configure::<mock::Client>(cfg, false)),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
        assert_eq!(&test::read_body(resp).await[..], b"<h1>microfeed</h1>");

        let req = test::TestRequest::get().uri("/js/app.js").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(&test::read_body(resp).await[..], b"start()");

        for missing in ["/missing.js", "/js"] {
            let req = test::TestRequest::get().uri(missing).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", missing);
        }

        // API routes still win over the catch-all.
        let req = test::TestRequest::get().uri("/api/users/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        std::fs::remove_dir_all(&static_dir).unwrap();
        std::fs::remove_dir_all(&media.upload_dir).unwrap();
    }
}
