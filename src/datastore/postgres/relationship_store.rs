use crate::datastore::{
    postgres::PostgresStore,
    tables::{follows, likes},
    Follow, Like, Relations, RelationshipStore,
};
use crate::twoface::{BlockingResp, Fallible};
use actix_web::web::block;
use async_trait::async_trait;
use diesel::{
    query_dsl::{QueryDsl, RunQueryDsl},
    ExpressionMethods,
};

#[async_trait]
impl RelationshipStore for PostgresStore {
    async fn relations(&self, user_id: i32) -> Fallible<Relations> {
        let mut conn = self.pool.get()?;
        block(move || -> Fallible<Relations> {
            let following: Vec<i32> = follows::table
                .filter(follows::follower_id.eq(user_id))
                .select(follows::followee_id)
                .get_results(&mut conn)?;
            let followers: Vec<i32> = follows::table
                .filter(follows::followee_id.eq(user_id))
                .select(follows::follower_id)
                .get_results(&mut conn)?;
            let liked_posts: Vec<i32> = likes::table
                .filter(likes::user_id.eq(user_id))
                .select(likes::post_id)
                .get_results(&mut conn)?;
            Ok(Relations {
                following,
                followers,
                liked_posts,
            })
        })
        .await
        .to_resp()
    }

    async fn add_follow(&self, follow: Follow) -> Fallible<bool> {
        let mut conn = self.pool.get()?;
        block(move || {
            diesel::insert_into(follows::table)
                .values(&follow)
                .on_conflict_do_nothing()
                .execute(&mut conn)
                .map(|inserted| inserted == 1)
        })
        .await
        .to_resp()
    }

    async fn remove_follow(&self, follow: Follow) -> Fallible<bool> {
        let mut conn = self.pool.get()?;
        block(move || {
            diesel::delete(follows::table.find((follow.follower_id, follow.followee_id)))
                .execute(&mut conn)
                .map(|deleted| deleted == 1)
        })
        .await
        .to_resp()
    }

    async fn add_like(&self, like: Like) -> Fallible<bool> {
        let mut conn = self.pool.get()?;
        block(move || {
            diesel::insert_into(likes::table)
                .values(&like)
                .on_conflict_do_nothing()
                .execute(&mut conn)
                .map(|inserted| inserted == 1)
        })
        .await
        .to_resp()
    }

    async fn remove_like(&self, like: Like) -> Fallible<bool> {
        let mut conn = self.pool.get()?;
        block(move || {
            diesel::delete(likes::table.find((like.user_id, like.post_id)))
                .execute(&mut conn)
                .map(|deleted| deleted == 1)
        })
        .await
        .to_resp()
    }
}
