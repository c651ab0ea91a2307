//! Pipeline entry points and the pure stages they are built from.
//!
//! - `run_init`: open comment threads for every page in the sitemap
//! - `Paginator`: build listing pages for special pages

pub mod fingerprint;
pub mod init;
pub mod paginate;
pub mod reconcile;
pub mod retry;

pub use fingerprint::fingerprint;
pub use init::run_init;
pub use paginate::{Paginator, SortOrder, paginate};
pub use reconcile::{ReconcileResult, Reconciler};
