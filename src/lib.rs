// src/lib.rs

//! Comment thread initializer library
//!
//! Opens one Gitalk/Gitment comment-thread issue per page of a static site
//! and builds paginated listings for the site's special pages.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod registry;
pub mod services;
pub mod utils;
