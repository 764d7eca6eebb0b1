//! Unauthenticated maintenance endpoints. Only mounted when `enable_admin` is set.
use crate::api::{observe, State};
use crate::datastore::{postfilters::PostFilters, Datastore, NewUser, Post, User};
use crate::twoface::{Cause, Fallible, TfError};
use actix_web::web;
use tracing::warn;

pub fn configure<DS: Datastore>(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/users").route(web::post().to(create_user::<DS>)))
        .service(web::resource("/users/{user_id}").route(web::delete().to(delete_user::<DS>)))
        .service(web::resource("/posts").route(web::get().to(list_all_posts::<DS>)));
}

async fn create_user<DS: Datastore>(
    state: web::Data<State<DS>>,
    new_user: web::Json<NewUser>,
) -> Fallible<web::Json<User>> {
    observe("admin_create_user", || async move {
        let user = state.ds.new_user(new_user.into_inner()).await?;
        warn!(user_id = user.id, "admin created user");
        Ok(web::Json(user))
    })
    .await
}

async fn delete_user<DS: Datastore>(
    state: web::Data<State<DS>>,
    user_id: web::Path<i32>,
) -> Fallible<web::Json<User>> {
    observe("admin_delete_user", || async move {
        let Some(user) = state.ds.delete_user(*user_id).await? else {
            return Err(TfError::rejection(Cause::NotFound, "User not found"));
        };
        warn!(user_id = user.id, "admin deleted user");
        Ok(web::Json(user))
    })
    .await
}

async fn list_all_posts<DS: Datastore>(
    state: web::Data<State<DS>>,
    filters: web::Query<PostFilters>,
) -> Fallible<web::Json<Vec<Post>>> {
    observe("admin_list_posts", || async move {
        let data = state.ds.list_posts(filters.into_inner()).await?;
        Ok(web::Json(data))
    })
    .await
}
