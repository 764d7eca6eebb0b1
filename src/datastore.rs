#[cfg(test)]
pub mod mock;
pub mod postfilters;
pub mod postgres;
pub mod structs;
pub mod tables;

use crate::twoface::Fallible;
use async_trait::async_trait;
use postfilters::PostFilters;
pub use structs::{
    Attachment, Follow, Like, NewAttachment, NewPost, NewUser, Post, PostDetails, Profile,
    Relations, User,
};

#[async_trait]
/// The interface for looking up and managing users.
pub trait UserStore: Clone + Send + Sync + 'static {
    async fn find_user(&self, user_id: i32) -> Fallible<Option<User>>;
    async fn find_user_by_api_key(&self, api_key: String) -> Fallible<Option<User>>;
    async fn user_profile(&self, user_id: i32) -> Fallible<Option<Profile>>;
    async fn new_user(&self, new_user: NewUser) -> Fallible<User>;
    /// Deletes the user along with their posts, attachments and edges.
    async fn delete_user(&self, user_id: i32) -> Fallible<Option<User>>;
}

#[async_trait]
/// The interface for storing post data.
pub trait PostStore: Clone + Send + Sync + 'static {
    /// Inserts the post, then links every listed attachment that exists and isn't linked yet.
    async fn new_post(&self, new_post: NewPost, attachment_ids: Vec<i32>) -> Fallible<Post>;
    async fn find_post(&self, post_id: i32) -> Fallible<Option<Post>>;
    /// Deletes the post only if `author_id` wrote it. Attachments and likes of the post go with it.
    async fn delete_post(&self, author_id: i32, post_id: i32) -> Fallible<Option<Post>>;
    async fn list_posts(&self, filters: PostFilters) -> Fallible<Vec<Post>>;
    /// Posts with their author, attachments and likers. `None` means every author.
    async fn post_details(&self, author_ids: Option<Vec<i32>>) -> Fallible<Vec<PostDetails>>;
}

#[async_trait]
/// The interface for the follow and like edges.
pub trait RelationshipStore: Clone + Send + Sync + 'static {
    /// Loads the user's current edges. Never cached between calls.
    async fn relations(&self, user_id: i32) -> Fallible<Relations>;
    /// Returns false if the edge already existed.
    async fn add_follow(&self, follow: Follow) -> Fallible<bool>;
    /// Returns false if there was no such edge.
    async fn remove_follow(&self, follow: Follow) -> Fallible<bool>;
    async fn add_like(&self, like: Like) -> Fallible<bool>;
    async fn remove_like(&self, like: Like) -> Fallible<bool>;
}

#[async_trait]
/// The interface for attachment metadata. The bytes themselves live in the upload directory.
pub trait AttachmentStore: Clone + Send + Sync + 'static {
    async fn new_attachment(&self, new_attachment: NewAttachment) -> Fallible<Attachment>;
    async fn find_attachment(&self, attachment_id: i32) -> Fallible<Option<Attachment>>;
}

/// Everything the API needs from a storage backend.
pub trait Datastore: UserStore + PostStore + RelationshipStore + AttachmentStore {}

impl<T: UserStore + PostStore + RelationshipStore + AttachmentStore> Datastore for T {}
