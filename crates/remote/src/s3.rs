//! Snapshot adapter backed by an S3-compatible bucket.
//!
//! Each collection is one JSON object under the configured prefix
//! (`{prefix}/annotations.json` etc.). Writes overwrite the whole object,
//! so concurrent snapshotters resolve to last-write-wins with no merge.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::error::{RemoteError, RemoteResult};
use crate::snapshot::{Collection, SnapshotStore};

/// Whole-collection snapshot store in a bucket.
pub struct S3SnapshotStore {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3SnapshotStore {
    pub fn new(client: Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into().trim_matches('/').to_string(),
        }
    }

    fn key(&self, collection: Collection) -> String {
        if self.prefix.is_empty() {
            collection.file_name().to_string()
        } else {
            format!("{}/{}", self.prefix, collection.file_name())
        }
    }
}

#[async_trait]
impl SnapshotStore for S3SnapshotStore {
    async fn sync_snapshot(
        &self,
        collection: Collection,
        data: &serde_json::Value,
    ) -> RemoteResult<()> {
        let body = serde_json::to_vec(data)
            .map_err(|e| RemoteError::Storage(format!("Serialize failed: {e}")))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.key(collection))
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| RemoteError::Storage(format!("put {collection}: {e}")))?;

        tracing::debug!(%collection, bucket = %self.bucket, "Snapshot uploaded");
        Ok(())
    }

    async fn load_snapshot(
        &self,
        collection: Collection,
    ) -> RemoteResult<Option<serde_json::Value>> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.key(collection))
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(RemoteError::Storage(format!("get {collection}: {service_err}")));
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| RemoteError::Storage(format!("read {collection}: {e}")))?
            .into_bytes();

        let value = serde_json::from_slice(&bytes)
            .map_err(|e| RemoteError::Storage(format!("parse {collection}: {e}")))?;
        Ok(Some(value))
    }

    async fn clear(&self) -> RemoteResult<()> {
        for collection in Collection::ALL {
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(self.key(collection))
                .send()
                .await
                .map_err(|e| RemoteError::Storage(format!("delete {collection}: {e}")))?;
        }
        Ok(())
    }
}
