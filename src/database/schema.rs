use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Schema};

use super::connector::DB;
use super::models::{
    chat, chat_message, contact_message, post, post_comment, post_like, session, smile, user,
};

/// Creates every table that does not exist yet. Parents come before children
/// so foreign keys resolve on backends that check them eagerly.
pub async fn create_schema(db: &DB) -> Result<(), DbErr> {
    create_table(db, user::Entity).await?;
    create_table(db, session::Entity).await?;
    create_table(db, chat::Entity).await?;
    create_table(db, chat_message::Entity).await?;
    create_table(db, smile::Entity).await?;
    create_table(db, post::Entity).await?;
    create_table(db, post_like::Entity).await?;
    create_table(db, post_comment::Entity).await?;
    create_table(db, contact_message::Entity).await?;
    Ok(())
}

async fn create_table<E>(db: &DB, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    log::debug!("Ensured table {}", entity.table_name());
    Ok(())
}
