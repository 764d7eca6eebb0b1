use crate::datastore::{
    postgres::PostgresStore,
    tables::{follows, users},
    NewUser, Profile, User, UserStore,
};
use crate::twoface::{BlockingResp, Cause, Describe, ExternalError, Fallible, TfError};
use actix_web::web::block;
use async_trait::async_trait;
use diesel::{
    query_dsl::{QueryDsl, RunQueryDsl},
    result::{DatabaseErrorKind, Error as DieselError},
    Connection, ExpressionMethods, JoinOnDsl, OptionalExtension, SelectableHelper,
};

#[async_trait]
impl UserStore for PostgresStore {
    async fn find_user(&self, user_id: i32) -> Fallible<Option<User>> {
        let mut conn = self.pool.get()?;
        block(move || {
            users::table
                .find(user_id)
                .select(User::as_select())
                .first(&mut conn)
                .optional()
        })
        .await
        .to_resp()
    }

    async fn find_user_by_api_key(&self, api_key: String) -> Fallible<Option<User>> {
        let mut conn = self.pool.get()?;
        block(move || {
            users::table
                .filter(users::api_key.eq(api_key))
                .select(User::as_select())
                .first(&mut conn)
                .optional()
        })
        .await
        .to_resp()
    }

    async fn user_profile(&self, user_id: i32) -> Fallible<Option<Profile>> {
        let mut conn = self.pool.get()?;
        block(move || -> Fallible<Option<Profile>> {
            let user: Option<User> = users::table
                .find(user_id)
                .select(User::as_select())
                .first(&mut conn)
                .optional()?;

            let Some(user) = user else {
                return Ok(None);
            };

            let followers: Vec<User> = follows::table
                .filter(follows::followee_id.eq(user_id))
                .inner_join(users::table.on(users::id.eq(follows::follower_id)))
                .order_by(follows::created_at)
                .select(User::as_select())
                .get_results(&mut conn)?;
            let following: Vec<User> = follows::table
                .filter(follows::follower_id.eq(user_id))
                .inner_join(users::table.on(users::id.eq(follows::followee_id)))
                .order_by(follows::created_at)
                .select(User::as_select())
                .get_results(&mut conn)?;

            Ok(Some(Profile {
                user,
                followers,
                following,
            }))
        })
        .await
        .to_resp()
    }

    async fn new_user(&self, new_user: NewUser) -> Fallible<User> {
        let mut conn = self.pool.get()?;
        block(move || {
            diesel::insert_into(users::table)
                .values(&new_user)
                .returning(User::as_returning())
                .get_result(&mut conn)
                .map_err(|e| match e {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        e.describe(ExternalError {
                            cause: Cause::UserConflict,
                            text: "A user with this api-key already exists",
                        })
                    }
                    e => TfError::from(e),
                })
        })
        .await
        .to_resp()
    }

    async fn delete_user(&self, user_id: i32) -> Fallible<Option<User>> {
        let mut conn = self.pool.get()?;
        block(move || {
            conn.transaction::<_, TfError, _>(|conn| {
                // Posts, attachments and edges are removed by the foreign key cascades.
                let deleted: Option<User> = diesel::delete(users::table.find(user_id))
                    .returning(User::as_returning())
                    .get_result(conn)
                    .optional()?;
                Ok(deleted)
            })
        })
        .await
        .to_resp()
    }
}
