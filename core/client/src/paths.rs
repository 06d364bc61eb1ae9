//! Canonical resource URLs for the server, its databases and documents.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use cblite_common::{DatabaseName, DocumentId};

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Endpoint that starts a replication.
pub const REPLICATE_ENDPOINT: &str = "_replicate";

/// Join URL pieces with exactly one `/` between them.
///
/// Leading and trailing separators on each piece are ignored; empty pieces
/// are skipped.
pub fn join(base: &str, segments: &[&str]) -> String {
    let mut out = base.trim_end_matches('/').to_string();
    for segment in segments {
        let segment = segment.trim_matches('/');
        if segment.is_empty() {
            continue;
        }
        out.push('/');
        out.push_str(segment);
    }
    out
}

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Builds request URLs relative to a server base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePaths {
    base: String,
}

impl ResourcePaths {
    /// Create a resolver for the given base URL (scheme, host and port).
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// The server root, without a trailing separator.
    pub fn server_root(&self) -> String {
        self.base.clone()
    }

    /// URL of a database.
    pub fn database(&self, name: &DatabaseName) -> String {
        join(&self.base, &[encode(name.as_str()).as_str()])
    }

    /// URL of a document inside a database.
    pub fn document(&self, name: &DatabaseName, id: &DocumentId) -> String {
        join(
            &self.base,
            &[encode(name.as_str()).as_str(), encode(id.as_str()).as_str()],
        )
    }

    /// URL of the replication endpoint.
    pub fn replicate(&self) -> String {
        join(&self.base, &[REPLICATE_ENDPOINT])
    }
}

/// Address of a database on a remote server, as used in replication bodies.
pub fn remote_database(remote_url: &str, name: &DatabaseName) -> String {
    join(remote_url, &[name.as_str()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn db(name: &str) -> DatabaseName {
        DatabaseName::new(name).unwrap()
    }

    #[test]
    fn test_server_root_strips_trailing_separator() {
        let paths = ResourcePaths::new("http://my.couchbase.lite/");
        assert_eq!(paths.server_root(), "http://my.couchbase.lite");
    }

    #[test]
    fn test_database_path() {
        let paths = ResourcePaths::new("http://my.couchbase.lite");
        assert_eq!(
            paths.database(&db("my-database")),
            "http://my.couchbase.lite/my-database"
        );
    }

    #[test]
    fn test_document_path() {
        let paths = ResourcePaths::new("http://my.couchbase.lite/");
        let id = DocumentId::new("document").unwrap();
        assert_eq!(
            paths.document(&db("my-database"), &id),
            "http://my.couchbase.lite/my-database/document"
        );
    }

    #[test]
    fn test_document_id_is_escaped() {
        let paths = ResourcePaths::new("http://host");
        let id = DocumentId::new("a b/c").unwrap();
        assert_eq!(paths.document(&db("db"), &id), "http://host/db/a%20b%2Fc");
    }

    #[test]
    fn test_replicate_path() {
        let paths = ResourcePaths::new("http://host:5984");
        assert_eq!(paths.replicate(), "http://host:5984/_replicate");
    }

    #[test]
    fn test_remote_database() {
        assert_eq!(
            remote_database("http://my.sync.gateway/", &db("my-database")),
            "http://my.sync.gateway/my-database"
        );
    }

    proptest! {
        #[test]
        fn prop_join_uses_single_separator(
            lead in "/{0,3}",
            trail in "/{0,3}",
            segment in "[a-z0-9-]{1,16}",
        ) {
            let base = format!("http://host{}", trail);
            let piece = format!("{}{}{}", lead, segment, trail);
            let joined = join(&base, &[piece.as_str()]);
            prop_assert_eq!(joined, format!("http://host/{}", segment));
        }
    }
}
