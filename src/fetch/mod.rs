//! Upstream fetcher and submission planner (C9, spec.md §4.8).

pub mod submit;
pub mod upstream;

pub use submit::{plan_submission, Method, SubmitPlan};
pub use upstream::{attachment_page, fetch, is_attachment, looks_like_oms, FetchedBody};
