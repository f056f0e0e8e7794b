use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

// --- Users ---
pub mod user {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub fullname: String,
        #[sea_orm(unique)]
        pub email: String,
        #[serde(skip_serializing)]
        pub password: Option<String>,
        #[sea_orm(unique)]
        pub facebook: Option<String>,
        pub gender: Option<String>,
        #[sea_orm(column_type = "Text", nullable)]
        pub about: Option<String>,
        pub image: Option<String>,
        pub wallet: i64,
        pub online: bool,
        pub date: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::session::Entity")]
        Session,
        #[sea_orm(has_many = "super::post::Entity")]
        Post,
    }

    impl Related<super::session::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Session.def()
        }
    }

    impl Related<super::post::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Post.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

// --- Sessions ---
pub mod session {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel)]
    #[sea_orm(table_name = "sessions")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(unique)]
        pub token_hash: String,
        pub user_id: i32,
        pub created_at: DateTimeUtc,
        pub last_used_at: Option<DateTimeUtc>,
        pub expires_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::user::Entity",
            from = "Column::UserId",
            to = "super::user::Column::Id",
            on_delete = "Cascade"
        )]
        User,
    }

    impl Related<super::user::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::User.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

// --- Chats ---
pub mod chat {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel)]
    #[sea_orm(table_name = "chats")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub sender: i32,
        pub receiver: i32,
        pub sender_read: bool,
        pub receiver_read: bool,
        pub date: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::user::Entity",
            from = "Column::Sender",
            to = "super::user::Column::Id",
            on_delete = "Cascade"
        )]
        Sender,
        #[sea_orm(
            belongs_to = "super::user::Entity",
            from = "Column::Receiver",
            to = "super::user::Column::Id",
            on_delete = "Cascade"
        )]
        Receiver,
        #[sea_orm(has_many = "super::chat_message::Entity")]
        ChatMessage,
    }

    impl Related<super::chat_message::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::ChatMessage.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl Model {
        /// The participant on the other side of the conversation.
        pub fn counterpart(&self, user_id: i32) -> i32 {
            if self.sender == user_id {
                self.receiver
            } else {
                self.sender
            }
        }

        /// Whether `user_id` still has something unseen in this conversation.
        pub fn unread_for(&self, user_id: i32) -> bool {
            (self.receiver == user_id && !self.receiver_read)
                || (self.sender == user_id && !self.sender_read)
        }
    }
}

// --- Chat messages (one row per entry of a conversation) ---
pub mod chat_message {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel)]
    #[sea_orm(table_name = "chat_messages")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub chat_id: i32,
        pub sender_name: i32,
        pub receiver_name: i32,
        pub sender_read: bool,
        pub receiver_read: bool,
        #[sea_orm(column_type = "Text", nullable)]
        pub sender_message: Option<String>,
        #[sea_orm(column_type = "Text", nullable)]
        pub receiver_message: Option<String>,
        pub date: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::chat::Entity",
            from = "Column::ChatId",
            to = "super::chat::Column::Id",
            on_delete = "Cascade"
        )]
        Chat,
    }

    impl Related<super::chat::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Chat.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl Model {
        /// Author of the entry: the conversation's sender wrote `sender_message`,
        /// the receiver wrote `receiver_message`.
        pub fn author(&self) -> i32 {
            if self.sender_message.is_some() {
                self.sender_name
            } else {
                self.receiver_name
            }
        }

        pub fn text(&self) -> &str {
            self.sender_message
                .as_deref()
                .or(self.receiver_message.as_deref())
                .unwrap_or_default()
        }
    }
}

// --- Smiles ---
pub mod smile {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel)]
    #[sea_orm(table_name = "smiles")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub sender: i32,
        pub receiver: i32,
        pub sender_sent: bool,
        pub receiver_received: bool,
        pub date: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::user::Entity",
            from = "Column::Sender",
            to = "super::user::Column::Id",
            on_delete = "Cascade"
        )]
        Sender,
        #[sea_orm(
            belongs_to = "super::user::Entity",
            from = "Column::Receiver",
            to = "super::user::Column::Id",
            on_delete = "Cascade"
        )]
        Receiver,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

// --- Posts ---
pub mod post {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel)]
    #[sea_orm(table_name = "posts")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub post_user: i32,
        pub title: String,
        #[sea_orm(column_type = "Text")]
        pub body: String,
        pub status: String,
        pub icon: String,
        pub image: Option<String>,
        pub allow_comments: bool,
        pub date: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::user::Entity",
            from = "Column::PostUser",
            to = "super::user::Column::Id",
            on_delete = "Cascade"
        )]
        User,
        #[sea_orm(has_many = "super::post_like::Entity")]
        PostLike,
        #[sea_orm(has_many = "super::post_comment::Entity")]
        PostComment,
    }

    impl Related<super::user::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::User.def()
        }
    }

    impl Related<super::post_like::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::PostLike.def()
        }
    }

    impl Related<super::post_comment::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::PostComment.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

// --- Post likes ---
pub mod post_like {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel)]
    #[sea_orm(table_name = "post_likes")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub post_id: i32,
        pub like_user: i32,
        pub date: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::post::Entity",
            from = "Column::PostId",
            to = "super::post::Column::Id",
            on_delete = "Cascade"
        )]
        Post,
        #[sea_orm(
            belongs_to = "super::user::Entity",
            from = "Column::LikeUser",
            to = "super::user::Column::Id",
            on_delete = "Cascade"
        )]
        User,
    }

    impl Related<super::post::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Post.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

// --- Post comments ---
pub mod post_comment {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel)]
    #[sea_orm(table_name = "post_comments")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub post_id: i32,
        pub comment_user: i32,
        #[sea_orm(column_type = "Text")]
        pub comment_body: String,
        pub date: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::post::Entity",
            from = "Column::PostId",
            to = "super::post::Column::Id",
            on_delete = "Cascade"
        )]
        Post,
        #[sea_orm(
            belongs_to = "super::user::Entity",
            from = "Column::CommentUser",
            to = "super::user::Column::Id",
            on_delete = "Cascade"
        )]
        User,
    }

    impl Related<super::post::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Post.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

// --- Contact form submissions ---
pub mod contact_message {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel)]
    #[sea_orm(table_name = "contact_messages")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub fullname: String,
        pub email: String,
        #[sea_orm(column_type = "Text")]
        pub message: String,
        pub date: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
