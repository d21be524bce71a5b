use std::sync::Arc;

use quill_db::Database;
use quill_identity::IdentityClient;

use crate::middleware::TokenVerifier;

pub type AppState = Arc<AppStateInner>;

/// Shared read-only capabilities, built once in main and handed to every
/// handler: the document store, the token verifier, and the identity
/// provider client.
pub struct AppStateInner {
    pub db: Database,
    pub verifier: TokenVerifier,
    pub identity: IdentityClient,
}
