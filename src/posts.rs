//! Publishing and removing posts.
use crate::datastore::{NewPost, PostStore, User};
use crate::twoface::Fallible;
use tracing::info;

/// Publish a post by `author` and hand it every listed attachment that exists and is still
/// unclaimed. Unknown attachment ids are skipped silently. Returns the new post's id.
pub async fn create<DS: PostStore>(
    ds: &DS,
    author: &User,
    content: String,
    attachment_ids: Vec<i32>,
) -> Fallible<i32> {
    let new_post = NewPost {
        content,
        author_id: author.id,
    };
    let post = ds.new_post(new_post, attachment_ids).await?;
    info!(user_id = author.id, post_id = post.id, "published post");
    Ok(post.id)
}

/// Delete the post if `actor` wrote it. Returns false if the post doesn't exist or belongs to
/// someone else; callers can't tell those apart.
pub async fn delete<DS: PostStore>(ds: &DS, actor: &User, post_id: i32) -> Fallible<bool> {
    let deleted = ds.delete_post(actor.id, post_id).await?;
    if deleted.is_some() {
        info!(user_id = actor.id, post_id, "deleted post");
    }
    Ok(deleted.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::{mock, AttachmentStore, Like, NewAttachment, RelationshipStore};

    #[actix_rt::test]
    async fn test_create_links_existing_attachments_only() {
        let ds = mock::Client::default();
        let author = ds.add_user("Oliver", "000");
        let first = ds
            .new_attachment(NewAttachment {
                path: "1_a.png".to_owned(),
                user_id: author.id,
            })
            .await
            .unwrap();

        let post_id = create(&ds, &author, "hi".to_owned(), vec![first.id, 9999])
            .await
            .unwrap();

        let post = ds.find_post(post_id).await.unwrap().unwrap();
        assert_eq!(post.author_id, author.id);
        assert_eq!(post.content, "hi");
        let first = ds.find_attachment(first.id).await.unwrap().unwrap();
        assert_eq!(first.post_id, Some(post_id));
    }

    #[actix_rt::test]
    async fn test_attachment_is_never_relinked() {
        let ds = mock::Client::default();
        let author = ds.add_user("Oliver", "000");
        let attachment = ds
            .new_attachment(NewAttachment {
                path: "1_a.png".to_owned(),
                user_id: author.id,
            })
            .await
            .unwrap();

        let first_post = create(&ds, &author, "one".to_owned(), vec![attachment.id])
            .await
            .unwrap();
        create(&ds, &author, "two".to_owned(), vec![attachment.id])
            .await
            .unwrap();

        let attachment = ds.find_attachment(attachment.id).await.unwrap().unwrap();
        assert_eq!(attachment.post_id, Some(first_post));
    }

    #[actix_rt::test]
    async fn test_only_author_may_delete() {
        let ds = mock::Client::default();
        let author = ds.add_user("Oliver", "000");
        let other = ds.add_user("Jenia", "123");
        let post_id = create(&ds, &author, "mine".to_owned(), vec![])
            .await
            .unwrap();

        assert!(!delete(&ds, &other, post_id).await.unwrap());
        assert!(ds.find_post(post_id).await.unwrap().is_some());

        assert!(delete(&ds, &author, post_id).await.unwrap());
        assert!(ds.find_post(post_id).await.unwrap().is_none());
        assert!(!delete(&ds, &author, post_id).await.unwrap());
    }

    #[actix_rt::test]
    async fn test_delete_cascades_to_attachments_and_likes_only() {
        let ds = mock::Client::default();
        let author = ds.add_user("Oliver", "000");
        let fan = ds.add_user("Jenia", "123");
        let attached = ds
            .new_attachment(NewAttachment {
                path: "1_attached.png".to_owned(),
                user_id: author.id,
            })
            .await
            .unwrap();
        let unattached = ds
            .new_attachment(NewAttachment {
                path: "1_unattached.png".to_owned(),
                user_id: author.id,
            })
            .await
            .unwrap();
        let post_id = create(&ds, &author, "bye".to_owned(), vec![attached.id])
            .await
            .unwrap();
        ds.add_like(Like {
            user_id: fan.id,
            post_id,
        })
        .await
        .unwrap();

        assert!(delete(&ds, &author, post_id).await.unwrap());

        assert!(ds.find_attachment(attached.id).await.unwrap().is_none());
        assert_eq!(
            ds.find_attachment(unattached.id).await.unwrap(),
            Some(unattached)
        );
        assert!(ds.likes().is_empty());
        assert!(ds.relations(fan.id).await.unwrap().liked_posts.is_empty());
    }
}
