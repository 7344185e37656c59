//! Forum API port
//!
//! The closed set of remote operations the announcer consumes. Each one is
//! a typed method, so an unsupported command cannot be sent by accident.

use crate::domain::result::Result;
use crate::domain::UserRecord;

/// Remote forum operations
pub trait ForumApi {
    /// Fetch one page of the user list
    ///
    /// # Arguments
    /// * `page` - Zero-based page index
    ///
    /// # Returns
    /// The users on that page; an empty page marks the end of the list
    fn fetch_user_page(&self, page: u32) -> Result<Vec<UserRecord>>;

    /// Publish a message on behalf of `login`
    ///
    /// # Returns
    /// The raw response body, used as a posting receipt
    fn publish_message(&self, text: &str, login: &str) -> Result<String>;
}
