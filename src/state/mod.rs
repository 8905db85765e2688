//! State module for tracking crawl progress
//!
//! The crawl loop owns a single [`Cursor`]: the address of the next listing
//! page, or the end-of-pagination marker that stops the loop.

mod cursor;

pub use cursor::{CrawlState, Cursor};
