//! Roster fetcher - walks the paginated user list

use tracing::{debug, info};

use crate::domain::result::Result;
use crate::domain::{roster_union, Roster};
use crate::ports::ForumApi;

/// Builds the complete current roster from the forum API
pub struct RosterFetcher<'a, A: ForumApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: ForumApi + ?Sized> RosterFetcher<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Request pages 0, 1, 2, ... until one comes back empty.
    ///
    /// There is no page limit and no retry; the first failing request aborts
    /// the fetch.
    pub fn fetch_all_users(&self) -> Result<Roster> {
        let mut roster = Roster::new();
        let mut page = 0u32;

        loop {
            let users = self.api.fetch_user_page(page)?;
            if users.is_empty() {
                break;
            }
            debug!(page, count = users.len(), "fetched user page");

            let batch: Roster = users.into_iter().collect();
            roster = roster_union(&roster, &batch);
            page += 1;
        }

        info!(users = roster.len(), pages = page, "[API] users: {}", roster.len());
        Ok(roster)
    }
}
