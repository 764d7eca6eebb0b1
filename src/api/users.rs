//! Profiles and the follow graph.
use crate::api::{observe, Outcome, State};
use crate::datastore::{Datastore, Profile};
use crate::feed::UserSummary;
use crate::identity::Caller;
use crate::relationships;
use crate::twoface::Fallible;
use actix_web::web;
use serde::Serialize;
use tracing::info;

pub fn configure<DS: Datastore>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("/me", web::get().to(get_me::<DS>))
            .route("/{user_id}", web::get().to(get_user::<DS>))
            .route("/{user_id}/follow", web::post().to(follow_user::<DS>))
            .route("/{user_id}/follow", web::delete().to(unfollow_user::<DS>)),
    );
}

/// A user as other users see them, with both directions of the follow graph.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct UserProfile {
    pub id: i32,
    pub name: String,
    pub followers: Vec<UserSummary>,
    pub following: Vec<UserSummary>,
}

impl From<Profile> for UserProfile {
    fn from(p: Profile) -> Self {
        Self {
            id: p.user.id,
            name: p.user.name,
            followers: p.followers.into_iter().map(UserSummary::from).collect(),
            following: p.following.into_iter().map(UserSummary::from).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct UserResponse {
    pub result: bool,
    pub user: Option<UserProfile>,
}

impl From<Option<Profile>> for UserResponse {
    fn from(profile: Option<Profile>) -> Self {
        Self {
            result: profile.is_some(),
            user: profile.map(UserProfile::from),
        }
    }
}

async fn get_me<DS: Datastore>(
    state: web::Data<State<DS>>,
    caller: Caller<DS>,
) -> Fallible<web::Json<UserResponse>> {
    observe("get_me", || async move {
        let profile = state.ds.user_profile(caller.user.id).await?;
        Ok(web::Json(profile.into()))
    })
    .await
}

async fn get_user<DS: Datastore>(
    state: web::Data<State<DS>>,
    caller: Caller<DS>,
    user_id: web::Path<i32>,
) -> Fallible<web::Json<UserResponse>> {
    observe("get_user", || async move {
        let user_id = user_id.into_inner();
        info!(user_id = caller.user.id, target_id = user_id, "profile requested");
        let profile = state.ds.user_profile(user_id).await?;
        Ok(web::Json(profile.into()))
    })
    .await
}

async fn follow_user<DS: Datastore>(
    state: web::Data<State<DS>>,
    caller: Caller<DS>,
    user_id: web::Path<i32>,
) -> Fallible<web::Json<Outcome>> {
    observe("follow_user", || async move {
        let followed = relationships::follow(&state.ds, &caller.user, *user_id).await?;
        Ok(web::Json(Outcome::new(
            followed,
            "Follow created",
            "Already following, or the user can't be followed",
        )))
    })
    .await
}

async fn unfollow_user<DS: Datastore>(
    state: web::Data<State<DS>>,
    caller: Caller<DS>,
    user_id: web::Path<i32>,
) -> Fallible<web::Json<Outcome>> {
    observe("unfollow_user", || async move {
        let unfollowed = relationships::unfollow(&state.ds, &caller.user, *user_id).await?;
        Ok(web::Json(Outcome::new(
            unfollowed,
            "Follow removed",
            "Not following, or the user can't be unfollowed",
        )))
    })
    .await
}
