//! Follow/unfollow and like/unlike. Every operation is safe to repeat: a no-op (already
//! following, nothing to unlike, ...) reports `false` instead of failing.
//!
//! The actor's edges are reloaded from the store before each membership test, so a `User`
//! resolved earlier in the request can never make a decision on stale collections.
use crate::datastore::{Follow, Like, PostStore, RelationshipStore, User, UserStore};
use crate::twoface::Fallible;
use tracing::{debug, info};

pub async fn follow<DS>(ds: &DS, actor: &User, target_id: i32) -> Fallible<bool>
where
    DS: UserStore + RelationshipStore,
{
    let relations = ds.relations(actor.id).await?;
    let Some(target) = ds.find_user(target_id).await? else {
        debug!(user_id = actor.id, target_id, "follow target doesn't exist");
        return Ok(false);
    };
    if target.id == actor.id || relations.following.contains(&target.id) {
        return Ok(false);
    }

    let created = ds
        .add_follow(Follow {
            follower_id: actor.id,
            followee_id: target.id,
        })
        .await?;
    if created {
        info!(user_id = actor.id, target_id, "followed user");
    }
    Ok(created)
}

/// Note the guard checks whether the target follows the actor, not whether the actor follows the
/// target. A user can't unfollow someone who follows them back.
pub async fn unfollow<DS>(ds: &DS, actor: &User, target_id: i32) -> Fallible<bool>
where
    DS: UserStore + RelationshipStore,
{
    let relations = ds.relations(actor.id).await?;
    let Some(target) = ds.find_user(target_id).await? else {
        debug!(user_id = actor.id, target_id, "unfollow target doesn't exist");
        return Ok(false);
    };
    if target.id == actor.id || relations.followers.contains(&target.id) {
        return Ok(false);
    }

    let removed = ds
        .remove_follow(Follow {
            follower_id: actor.id,
            followee_id: target.id,
        })
        .await?;
    if removed {
        info!(user_id = actor.id, target_id, "unfollowed user");
    }
    Ok(removed)
}

pub async fn like<DS>(ds: &DS, actor: &User, post_id: i32) -> Fallible<bool>
where
    DS: PostStore + RelationshipStore,
{
    let relations = ds.relations(actor.id).await?;
    let Some(post) = ds.find_post(post_id).await? else {
        debug!(user_id = actor.id, post_id, "liked post doesn't exist");
        return Ok(false);
    };
    if relations.liked_posts.contains(&post.id) {
        return Ok(false);
    }

    let created = ds
        .add_like(Like {
            user_id: actor.id,
            post_id: post.id,
        })
        .await?;
    if created {
        info!(user_id = actor.id, post_id, "liked post");
    }
    Ok(created)
}

pub async fn unlike<DS>(ds: &DS, actor: &User, post_id: i32) -> Fallible<bool>
where
    DS: RelationshipStore,
{
    let relations = ds.relations(actor.id).await?;
    if !relations.liked_posts.contains(&post_id) {
        return Ok(false);
    }

    let removed = ds
        .remove_like(Like {
            user_id: actor.id,
            post_id,
        })
        .await?;
    if removed {
        info!(user_id = actor.id, post_id, "unliked post");
    }
    Ok(removed)
}
