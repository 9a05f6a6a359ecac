//! Agent chat with a bounded in-memory history.

mod chat_model;
mod chat_service;
mod chat_traits;

pub use chat_model::*;
pub use chat_service::ChatService;
pub use chat_traits::{ChatBroadcaster, ChatServiceTrait, NoOpChatBroadcaster};
