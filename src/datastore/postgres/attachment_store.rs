use crate::datastore::{
    postgres::PostgresStore, tables::attachments, Attachment, AttachmentStore, NewAttachment,
};
use crate::twoface::{BlockingResp, Fallible};
use actix_web::web::block;
use async_trait::async_trait;
use diesel::{
    query_dsl::{QueryDsl, RunQueryDsl},
    OptionalExtension, SelectableHelper,
};

#[async_trait]
impl AttachmentStore for PostgresStore {
    async fn new_attachment(&self, new_attachment: NewAttachment) -> Fallible<Attachment> {
        let mut conn = self.pool.get()?;
        block(move || {
            diesel::insert_into(attachments::table)
                .values(&new_attachment)
                .returning(Attachment::as_returning())
                .get_result(&mut conn)
        })
        .await
        .to_resp()
    }

    async fn find_attachment(&self, attachment_id: i32) -> Fallible<Option<Attachment>> {
        let mut conn = self.pool.get()?;
        block(move || {
            attachments::table
                .find(attachment_id)
                .select(Attachment::as_select())
                .first(&mut conn)
                .optional()
        })
        .await
        .to_resp()
    }
}
