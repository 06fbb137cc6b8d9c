use crate::{Error, ErrorChain};

pub const CERT_KEY: &str = "cert.pem";
pub const PRIVATE_KEY_KEY: &str = "key.pem";
pub const CHAIN_KEY: &str = "chain.pem";
pub const ROOT_CA_KEY: &str = "root_ca_cert.pem";

/// An object to write, key and body
pub struct StoredObject {
    pub key: &'static str,
    pub body: zeroize::Zeroizing<Vec<u8>>,
}

impl StoredObject {
    pub fn new(key: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            key,
            body: zeroize::Zeroizing::new(body.into()),
        }
    }
}

/// Destination of exported objects. Existing objects are overwritten.
pub trait ObjectStore {
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: zeroize::Zeroizing<Vec<u8>>,
    ) -> impl std::future::Future<Output = Result<(), Error>> + Send;
}

/// Write objects in order, stopping at the first failure.
///
/// Objects written before the failure stay in the bucket.
pub async fn upload_objects<S: ObjectStore>(
    store: &S,
    bucket: &str,
    objects: Vec<StoredObject>,
) -> Result<Vec<&'static str>, Error> {
    let mut uploaded = Vec::<&'static str>::with_capacity(objects.len());

    for obj in objects {
        tracing::info!(bucket, key = obj.key, "uploading");
        match store.put_object(bucket, obj.key, obj.body).await {
            Ok(()) => {
                tracing::info!(bucket, key = obj.key, "uploaded");
                uploaded.push(obj.key);
            }
            Err(e) => {
                tracing::error!(
                    bucket,
                    key = obj.key,
                    error = %ErrorChain(&e),
                    "upload failed"
                );
                return Err(Error::Upload {
                    key: obj.key.to_string(),
                    source: Box::new(e),
                });
            }
        }
    }

    Ok(uploaded)
}

#[derive(Clone, Debug)]
pub struct S3Store {
    s3_client: aws_sdk_s3::Client,
}

impl S3Store {
    pub fn new(aws_sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            s3_client: aws_sdk_s3::Client::new(aws_sdk_config),
        }
    }

    /// PutObject without content type or ACL
    fn put_request(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> aws_sdk_s3::operation::put_object::builders::PutObjectFluentBuilder {
        self.s3_client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body.into())
    }
}

impl ObjectStore for S3Store {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        mut body: zeroize::Zeroizing<Vec<u8>>,
    ) -> Result<(), Error> {
        // The SDK owns the request body from here on, it is not wiped
        let body = std::mem::take(&mut *body);
        let _resp = self.put_request(bucket, key, body).send().await?;

        Ok(())
    }
}

/// Mirror of the bucket on local disk, `<root>/<bucket>/<key>`
#[derive(Clone, Debug)]
pub struct LocalDirStore {
    root: std::path::PathBuf,
}

impl LocalDirStore {
    pub fn new<P: Into<std::path::PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

impl ObjectStore for LocalDirStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: zeroize::Zeroizing<Vec<u8>>,
    ) -> Result<(), Error> {
        use std::io::Write;

        let dir = self.root.join(bucket);
        std::fs::create_dir_all(&dir)?;
        let mut f = std::fs::File::create(dir.join(key))?;
        f.write_all(&body)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(bytes: &[u8]) -> zeroize::Zeroizing<Vec<u8>> {
        zeroize::Zeroizing::new(bytes.to_vec())
    }

    #[tokio::test]
    async fn local_dir_store_overwrites() {
        let root = tempfile::tempdir().unwrap();
        let store = LocalDirStore::new(root.path());

        store.put_object("bucket", "cert.pem", body(b"old")).await.unwrap();
        store.put_object("bucket", "cert.pem", body(b"new")).await.unwrap();

        let written = std::fs::read(root.path().join("bucket").join("cert.pem")).unwrap();
        assert_eq!(written, b"new");
    }

    #[tokio::test]
    async fn upload_writes_in_order() {
        let root = tempfile::tempdir().unwrap();
        let store = LocalDirStore::new(root.path());

        let objects = vec![
            StoredObject::new(CERT_KEY, "cert"),
            StoredObject::new(PRIVATE_KEY_KEY, "key"),
            StoredObject::new(CHAIN_KEY, "chain"),
        ];
        let uploaded = upload_objects(&store, "bucket", objects).await.unwrap();
        assert_eq!(uploaded, [CERT_KEY, PRIVATE_KEY_KEY, CHAIN_KEY]);

        let key = std::fs::read_to_string(root.path().join("bucket").join("key.pem")).unwrap();
        assert_eq!(key, "key");
    }

    #[tokio::test]
    async fn upload_stops_at_first_failure() {
        let root = tempfile::tempdir().unwrap();
        // a regular file where the bucket directory should be
        std::fs::write(root.path().join("blocked"), "").unwrap();
        let store = LocalDirStore::new(root.path());

        let objects = vec![StoredObject::new(CERT_KEY, "cert")];
        let err = upload_objects(&store, "blocked", objects).await.unwrap_err();
        assert!(matches!(err, Error::Upload { key, .. } if key == CERT_KEY));
    }

    #[test]
    fn s3_request_has_no_content_type() {
        let conf = aws_sdk_s3::Config::builder()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new("us-east-1"))
            .build();
        let store = S3Store {
            s3_client: aws_sdk_s3::Client::from_conf(conf),
        };

        let req = store.put_request("certs", "chain.pem", b"chain".to_vec());
        assert_eq!(req.get_bucket().as_deref(), Some("certs"));
        assert_eq!(req.get_key().as_deref(), Some("chain.pem"));
        assert!(req.get_content_type().is_none());
        assert!(req.get_acl().is_none());
    }
}
