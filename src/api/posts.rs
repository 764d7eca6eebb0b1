//! Publishing, deleting, liking and reading posts.
use crate::api::{observe, Outcome, State};
use crate::datastore::Datastore;
use crate::feed::{self, PostView, Scope};
use crate::identity::Caller;
use crate::twoface::{Cause, Fallible, TfError};
use crate::{posts, relationships};
use actix_web::web;
use serde::{Deserialize, Serialize};

pub fn configure<DS: Datastore>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tweets")
            .route("", web::post().to(write_post::<DS>))
            .route("", web::get().to(get_feed::<DS>))
            .route("/{post_id}", web::delete().to(delete_post::<DS>))
            .route("/{post_id}/likes", web::post().to(like_post::<DS>))
            .route("/{post_id}/likes", web::delete().to(unlike_post::<DS>)),
    );
}

#[derive(Deserialize)]
pub struct WritePostBody {
    pub tweet_data: String,
    #[serde(default)]
    pub tweet_media_ids: Option<Vec<i32>>,
}

#[derive(Serialize)]
pub struct WritePostResponse {
    pub result: bool,
    pub tweet_id: i32,
}

#[derive(Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub scope: Scope,
}

/// `tweets` is null, and `result` false, when there's nothing to show.
#[derive(Serialize)]
pub struct FeedResponse {
    pub result: bool,
    pub tweets: Option<Vec<PostView>>,
}

impl From<Vec<PostView>> for FeedResponse {
    fn from(tweets: Vec<PostView>) -> Self {
        if tweets.is_empty() {
            Self {
                result: false,
                tweets: None,
            }
        } else {
            Self {
                result: true,
                tweets: Some(tweets),
            }
        }
    }
}

async fn write_post<DS: Datastore>(
    state: web::Data<State<DS>>,
    caller: Caller<DS>,
    body: web::Json<WritePostBody>,
) -> Fallible<web::Json<WritePostResponse>> {
    observe("write_post", || async move {
        let body = body.into_inner();
        let post_id = posts::create(
            &state.ds,
            &caller.user,
            body.tweet_data,
            body.tweet_media_ids.unwrap_or_default(),
        )
        .await?;
        Ok(web::Json(WritePostResponse {
            result: true,
            tweet_id: post_id,
        }))
    })
    .await
}

async fn get_feed<DS: Datastore>(
    state: web::Data<State<DS>>,
    caller: Caller<DS>,
    query: web::Query<FeedQuery>,
) -> Fallible<web::Json<FeedResponse>> {
    observe("get_feed", || async move {
        let feed = feed::get_feed(&state.ds, &caller.user, query.scope, &state.media).await?;
        Ok(web::Json(feed.into()))
    })
    .await
}

async fn delete_post<DS: Datastore>(
    state: web::Data<State<DS>>,
    caller: Caller<DS>,
    post_id: web::Path<i32>,
) -> Fallible<web::Json<Outcome>> {
    observe("delete_post", || async move {
        if !posts::delete(&state.ds, &caller.user, *post_id).await? {
            return Err(TfError::rejection(
                Cause::NotFound,
                "Post not found or no rights to delete",
            ));
        }
        Ok(web::Json(Outcome {
            result: true,
            message: "Post deleted",
        }))
    })
    .await
}

async fn like_post<DS: Datastore>(
    state: web::Data<State<DS>>,
    caller: Caller<DS>,
    post_id: web::Path<i32>,
) -> Fallible<web::Json<Outcome>> {
    observe("like_post", || async move {
        let liked = relationships::like(&state.ds, &caller.user, *post_id).await?;
        Ok(web::Json(Outcome::new(
            liked,
            "Like added",
            "Already liked, or the post doesn't exist",
        )))
    })
    .await
}

async fn unlike_post<DS: Datastore>(
    state: web::Data<State<DS>>,
    caller: Caller<DS>,
    post_id: web::Path<i32>,
) -> Fallible<web::Json<Outcome>> {
    observe("unlike_post", || async move {
        let unliked = relationships::unlike(&state.ds, &caller.user, *post_id).await?;
        Ok(web::Json(Outcome::new(
            unliked,
            "Like removed",
            "The post isn't liked",
        )))
    })
    .await
}
