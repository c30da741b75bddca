pub mod client_ext;

pub mod prelude {
    pub use crate::client_ext::couchdb::{BulkResult, ClientCouchExt as CouchDB, Document};
    pub use crate::client_ext::Client;

    use std::time::Duration;

    /// Build the [`Client`] shared by page fetches and CouchDB sessions.
    ///
    /// Every request carries `user_agent` and gives up after `timeout`.
    pub fn build_client(user_agent: &str, timeout: Duration) -> anyhow::Result<Client> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(client)
    }
}
