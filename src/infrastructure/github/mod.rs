//! GitHub adapter - the REST implementation of the membership directory

mod directory;
mod http_client;
mod types;

pub use directory::{GitHubDirectory, DEFAULT_GITHUB_API_URL};
pub use http_client::{classify_status, parse_next_page, HttpClient, HttpClientTrait, JsonResponse};
