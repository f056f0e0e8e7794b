use askama::Template;
use serde::Deserialize;

use crate::routes::views::{Layout, UserCard};

#[derive(Template)]
#[template(path = "chatRoom.html")]
pub struct ChatRoomTemplate {
    pub layout: Layout,
    pub chat_id: i32,
    pub me: UserCard,
    pub other: UserCard,
    pub messages: Vec<ChatEntryView>,
}

pub struct ChatEntryView {
    pub author: UserCard,
    pub mine: bool,
    pub text: String,
    pub when: String,
}

#[derive(Template)]
#[template(path = "chat/chats.html")]
pub struct ChatsTemplate {
    pub layout: Layout,
    pub received: Vec<ChatSummaryView>,
    pub sent: Vec<ChatSummaryView>,
}

pub struct ChatSummaryView {
    pub id: i32,
    pub other: UserCard,
    pub unread: bool,
    pub last_message: String,
    pub when: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub chat: String,
}
