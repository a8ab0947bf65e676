//! Core types for Brief Bulletin.
//!
//! This module provides type-safe wrappers for the news domain.

pub mod admin;
pub mod article;
pub mod comment;
pub mod email;
pub mod id;
pub mod status;
pub mod timestamp;

pub use admin::AdminForm;
pub use article::{Article, Category};
pub use comment::{Comment, CommentForm, NewComment};
pub use email::{Email, EmailError};
pub use id::*;
pub use status::*;
pub use timestamp::Timestamp;
