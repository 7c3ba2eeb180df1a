//! External-collaborator seams named in §6 but out of functional scope
//! (§1): object-storage artifact upload, rsync'd filesystem distribution to
//! storage nodes, and the AMQP-backed production metric bus. Handlers call
//! through these traits so the seam exists even though only an in-process
//! / no-op adapter ships here.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
// (none)

/// Uploads/deletes filter artifacts to the `storlet` container under the
/// tenant account (§6). Out of scope functionally; the no-op adapter below
/// lets upload handlers compile and log rather than silently no-op.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn put(&self, container: &str, name: &str, bytes: &[u8]) -> Result<(), String>;
    async fn delete(&self, container: &str, name: &str) -> Result<(), String>;
}

/// Synchronizes metric modules and controller binaries to every storage
/// node (§6). Out of scope functionally.
#[async_trait]
pub trait NodeSync: Send + Sync {
    async fn sync_to_all(&self, path: &str) -> Result<(), String>;
}

/// No-op adapters used until a real object-storage / rsync backend is
/// wired in; both log at the call site via `tracing` rather than failing
/// the request, since §1 marks this functionality out of scope.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopArtifactStore;

#[async_trait]
impl ArtifactStore for NoopArtifactStore {
    async fn put(&self, container: &str, name: &str, bytes: &[u8]) -> Result<(), String> {
        tracing::debug!(container, name, bytes = bytes.len(), "artifact upload skipped (out of scope)");
        Ok(())
    }

    async fn delete(&self, container: &str, name: &str) -> Result<(), String> {
        tracing::debug!(container, name, "artifact delete skipped (out of scope)");
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNodeSync;

#[async_trait]
impl NodeSync for NoopNodeSync {
    async fn sync_to_all(&self, path: &str) -> Result<(), String> {
        tracing::debug!(path, "node sync skipped (out of scope)");
        Ok(())
    }
}
