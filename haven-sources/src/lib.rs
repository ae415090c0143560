//! haven-sources
//!
//! HTTP-backed [`haven_core::SourceAdapter`] implementations:
//!
//! - [`DirectorySource`]: the 211 live resource directory, one document per
//!   call, filtered by radius and category locally.
//! - [`FinderSource`]: the `resource-finder` edge function, filtered
//!   server-side by type, radius and open status.
//!
//! Both adapters recompute `distance_meters` from the query origin, skip
//! records without a name or usable coordinates, and classify failures the
//! same way:
//!
//! | outcome                      | error            | retryable |
//! |------------------------------|------------------|-----------|
//! | 2xx with undecodable body    | `Validation`     | no        |
//! | 404                          | `NotFound`       | no        |
//! | 401 / 403                    | `Unauthorized`   | no        |
//! | other non-2xx                | `Status`         | yes       |
//! | transport timeout            | `Timeout`        | yes       |
//! | other transport failure      | `Network`        | yes       |
#![warn(missing_docs)]

mod directory;
mod finder;
mod http;

pub use directory::{DEFAULT_DIRECTORY_URL, DIRECTORY_URL_ENV, DirectorySource};
pub use finder::{DEFAULT_FINDER_URL, FINDER_KEY_ENV, FINDER_URL_ENV, FinderSource};
