//! Request handlers.

pub mod auth;
pub mod content;
pub mod funnels;
pub mod health;
pub mod threads;
pub mod videos;

pub use auth::*;
pub use content::*;
pub use funnels::*;
pub use health::*;
pub use threads::*;
pub use videos::*;
