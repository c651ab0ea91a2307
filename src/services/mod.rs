//! Service layer for the initializer.
//!
//! - Sitemap reading (`read_sitemap`)
//! - Page title fetching (`HttpPageSource`)
//! - Run orchestration (`Initializer`)

pub mod initializer;
pub mod page;
pub mod sitemap;

pub use initializer::{CreatedThread, FailedUrl, InitReport, InitState, Initializer};
pub use page::{HttpPageSource, PageSource};
pub use sitemap::{parse_sitemap, read_sitemap};
