use crate::datastore::{
    postfilters::PostFilters,
    postgres::PostgresStore,
    tables::{attachments, likes, posts, users},
    Attachment, Like, NewPost, Post, PostDetails, PostStore, User,
};
use crate::twoface::{BlockingResp, Fallible, TfError};
use actix_web::web::block;
use async_trait::async_trait;
use diesel::{
    expression::BoxableExpression,
    pg::Pg,
    query_dsl::{QueryDsl, RunQueryDsl},
    sql_types::Bool,
    BelongingToDsl, Connection, ExpressionMethods, GroupedBy, OptionalExtension, SelectableHelper,
    TextExpressionMethods,
};

#[async_trait]
impl PostStore for PostgresStore {
    async fn new_post(&self, new_post: NewPost, attachment_ids: Vec<i32>) -> Fallible<Post> {
        let mut conn = self.pool.get()?;
        block(move || {
            conn.transaction::<_, TfError, _>(|conn| {
                // Insert the new post
                let post: Post = diesel::insert_into(posts::table)
                    .values(&new_post)
                    .returning(Post::as_returning())
                    .get_result(conn)?;

                // Claim the attachments. Unknown ids and attachments that already belong to a
                // post are skipped.
                if !attachment_ids.is_empty() {
                    diesel::update(
                        attachments::table
                            .filter(attachments::id.eq_any(attachment_ids))
                            .filter(attachments::post_id.is_null()),
                    )
                    .set(attachments::post_id.eq(post.id))
                    .execute(conn)?;
                }

                Ok(post)
            })
        })
        .await
        .to_resp()
    }

    async fn find_post(&self, post_id: i32) -> Fallible<Option<Post>> {
        let mut conn = self.pool.get()?;
        block(move || {
            posts::table
                .find(post_id)
                .select(Post::as_select())
                .first(&mut conn)
                .optional()
        })
        .await
        .to_resp()
    }

    async fn delete_post(&self, author_id: i32, post_id: i32) -> Fallible<Option<Post>> {
        let mut conn = self.pool.get()?;
        block(move || {
            conn.transaction::<_, TfError, _>(|conn| {
                // Attachments and likes are removed by the foreign key cascades.
                let deleted: Option<Post> = diesel::delete(
                    posts::table
                        .find(post_id)
                        .filter(posts::author_id.eq(author_id)),
                )
                .returning(Post::as_returning())
                .get_result(conn)
                .optional()?;

                Ok(deleted)
            })
        })
        .await
        .to_resp()
    }

    async fn list_posts(&self, filters: PostFilters) -> Fallible<Vec<Post>> {
        let mut conn = self.pool.get()?;
        block(move || {
            let mut query = posts::table.into_boxed();
            for filter in filters.as_sql_where() {
                query = query.filter(filter);
            }
            query
                .limit(filters.limit as i64)
                .order_by(posts::created_at)
                .get_results::<Post>(&mut conn)
        })
        .await
        .to_resp()
    }

    async fn post_details(&self, author_ids: Option<Vec<i32>>) -> Fallible<Vec<PostDetails>> {
        let mut conn = self.pool.get()?;
        block(move || -> Fallible<Vec<PostDetails>> {
            let mut query = posts::table
                .inner_join(users::table)
                .select((Post::as_select(), User::as_select()))
                .order_by((posts::created_at.desc(), posts::id.desc()))
                .into_boxed();
            if let Some(author_ids) = author_ids {
                query = query.filter(posts::author_id.eq_any(author_ids));
            }
            let rows: Vec<(Post, User)> = query.load(&mut conn)?;
            let (posts, authors): (Vec<Post>, Vec<User>) = rows.into_iter().unzip();

            let attachments: Vec<Attachment> = Attachment::belonging_to(&posts)
                .select(Attachment::as_select())
                .order_by(attachments::id)
                .load(&mut conn)?;
            let attachments = attachments.grouped_by(&posts);

            let likes: Vec<(Like, User)> = Like::belonging_to(&posts)
                .inner_join(users::table)
                .select((Like::as_select(), User::as_select()))
                .order_by(likes::created_at)
                .load(&mut conn)?;
            let likes = likes.grouped_by(&posts);

            let details = posts
                .into_iter()
                .zip(authors)
                .zip(attachments)
                .zip(likes)
                .map(|(((post, author), attachments), likes)| PostDetails {
                    post,
                    author,
                    attachments,
                    likers: likes.into_iter().map(|(_, user)| user).collect(),
                })
                .collect();
            Ok(details)
        })
        .await
        .to_resp()
    }
}

impl PostFilters {
    pub fn as_sql_where(
        &self,
    ) -> Vec<Box<dyn BoxableExpression<posts::table, Pg, SqlType = Bool>>> {
        let mut wheres: Vec<Box<dyn BoxableExpression<posts::table, Pg, SqlType = Bool>>> =
            Vec::new();
        if let Some(id) = self.id {
            wheres.push(Box::new(posts::id.eq(id)))
        }
        if let Some(substring) = &self.text_contains {
            wheres.push(Box::new(posts::content.like(format!("%{}%", substring))))
        }
        if let Some(created_before) = self.created_before {
            wheres.push(Box::new(posts::created_at.lt(created_before)));
        }
        if let Some(author_id) = self.author_id {
            wheres.push(Box::new(posts::author_id.eq(author_id)))
        }
        wheres
    }
}
