//! Resource fetching for the document host.
//!
//! Script and stylesheet elements are loaded through `NetClient`, which reads
//! `file:` URLs from disk and `http(s):` URLs through reqwest, subject to a
//! small `NetPolicy`.

pub mod fetch;
pub mod policy;

pub use fetch::{FetchError, FetchedResource, NetClient};
pub use policy::NetPolicy;
