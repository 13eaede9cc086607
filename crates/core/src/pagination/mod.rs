//! Cursor pagination turned into a lazy, cancelable item stream
//!
//! Every list operation hands [`paginate`] a page loader and an edge mapper
//! and gets back a [`ListStream`] of `Result<T, RaitoError>` values.

pub mod stream;

pub use stream::{paginate, ListStream, CHANNEL_CAPACITY};
