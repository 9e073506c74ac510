use std::future::Future;

use tracing::{debug, warn};

use super::{retry_remote, Lookup, RetryPolicy};
use crate::domain::{DomainError, Page, RemoteError};

/// Follow a paginated listing until no next page remains.
///
/// Every page fetch is retried on its own, so a flaky page does not restart
/// the whole listing. `NotFound` on the first page means the listed resource
/// does not exist; on a later page it is a resolution error.
pub async fn drain_pages<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut fetch: F,
) -> Result<Lookup<Vec<T>>, DomainError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, RemoteError>>,
{
    let mut items = Vec::new();
    let mut page: u32 = 1;

    loop {
        let current = match retry_remote(policy, operation, || fetch(page)).await? {
            Lookup::Found(current) => current,
            Lookup::NotFound if page == 1 => return Ok(Lookup::NotFound),
            Lookup::NotFound => {
                return Err(DomainError::resolution(format!(
                    "{}: page {} disappeared while paginating",
                    operation, page
                )));
            }
        };

        debug!(operation, page, count = current.items.len(), "Fetched page");
        items.extend(current.items);

        match current.next_page {
            Some(next) if next > page => page = next,
            Some(next) => {
                warn!(operation, page, next, "Next page cursor does not advance, stopping");
                break;
            }
            None => break,
        }
    }

    Ok(Lookup::Found(items))
}
