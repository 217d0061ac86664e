//! HTTP handlers for the Happy Thoughts API

pub mod thoughts;
pub mod users;

pub use thoughts::{
    create_thought, delete_thought, edit_thought, get_thought, like_thought, liked_thoughts,
    list_thoughts,
};
pub use users::{login, signup};
