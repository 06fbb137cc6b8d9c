mod acm;
mod config;
mod logging;
mod output;
mod private_key;
mod response;
mod sdk_config;
mod source;

// re-exports
pub use acm::{AcmExporter, CertificateExporter, ExportedCertificate};
pub use config::{env_vars, CertificateSource, Config};
pub use logging::init_logging;
pub use output::{
    upload_objects, LocalDirStore, ObjectStore, S3Store, StoredObject, CERT_KEY, CHAIN_KEY,
    PRIVATE_KEY_KEY, ROOT_CA_KEY,
};
pub use private_key::{decrypt_private_key, DecryptedPrivateKey};
pub use response::HandlerResponse;
pub use sdk_config::aws_config_from_env;
pub use source::{fetch_certificate, fetch_root_ca, SearchPath};

/// Names of environment variables read by [`Config`]
pub mod env {
    pub use crate::config::{
        CERTIFICATE_ARN, CERTIFICATE_BODY, CERTIFICATE_CHAIN, CERTIFICATE_DIR,
        CERTIFICATE_SOURCE, LAMBDA_TASK_ROOT, PASSPHRASE, PRIVATE_KEY, ROOT_CA_FILE, S3_BUCKET,
    };
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),
    #[error(
        "Invalid CERTIFICATE_SOURCE {value:?}, expected acm, env or file{}",
        missing_suffix(.missing)
    )]
    InvalidSource {
        value: String,
        missing: Vec<&'static str>,
    },
    #[error(transparent)]
    AcmExportError(
        #[from]
        aws_sdk_acm::error::SdkError<
            aws_sdk_acm::operation::export_certificate::ExportCertificateError,
        >,
    ),
    #[error("ACM export response has no {0}")]
    IncompleteExport(&'static str),
    #[error(transparent)]
    S3PutObjectError(
        #[from] aws_sdk_s3::error::SdkError<aws_sdk_s3::operation::put_object::PutObjectError>,
    ),
    #[error("{key}")]
    Upload {
        key: String,
        #[source]
        source: Box<Error>,
    },
    #[error(transparent)]
    Decryption(#[from] pkcs8::Error),
    #[error(transparent)]
    KeyFormat(#[from] pkcs8::der::Error),
    #[error("Unsupported private key PEM label {0:?}")]
    UnsupportedKeyFormat(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{name} not found, searched {searched:?}")]
    InputNotFound {
        name: String,
        searched: Vec<std::path::PathBuf>,
    },
}

fn missing_suffix(missing: &[&str]) -> String {
    if missing.is_empty() {
        String::new()
    } else {
        format!(
            "; Missing required environment variables: {}",
            missing.join(", ")
        )
    }
}

/// Coarse error classes reported to the caller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Required environment value absent or invalid
    Configuration,
    /// ACM or S3 call failed
    Service,
    /// Private key cannot be parsed or unlocked
    Decryption,
    Unexpected,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingConfig(_) | Self::InvalidSource { .. } => ErrorCategory::Configuration,
            Self::AcmExportError(_)
            | Self::IncompleteExport(_)
            | Self::S3PutObjectError(_)
            | Self::Upload { .. } => ErrorCategory::Service,
            Self::Decryption(_) | Self::KeyFormat(_) | Self::UnsupportedKeyFormat(_) => {
                ErrorCategory::Decryption
            }
            Self::Io(_) | Self::InputNotFound { .. } => ErrorCategory::Unexpected,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self.category() {
            ErrorCategory::Configuration => 400,
            _ => 500,
        }
    }
}

/// Display an error followed by all of its sources, `outer: inner: root`
pub struct ErrorChain<'a>(pub &'a (dyn std::error::Error + 'a));

impl std::fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(err) = source {
            write!(f, ": {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

/// Export, decrypt and upload, in that order.
///
/// Returns the keys written. The first failure aborts the remaining steps,
/// objects already written are left in place.
pub async fn export_certificate<E, S>(
    config: &Config,
    exporter: &E,
    store: &S,
) -> Result<Vec<&'static str>, Error>
where
    E: CertificateExporter,
    S: ObjectStore,
{
    let material = fetch_certificate(config, exporter).await?;
    let root_ca = fetch_root_ca(config)?;

    let private_key =
        decrypt_private_key(&material.private_key, config.passphrase()).map_err(|e| {
            tracing::error!(error = %ErrorChain(&e), "private key decryption failed");
            e
        })?;

    let mut objects = vec![
        StoredObject::new(CERT_KEY, material.certificate),
        StoredObject {
            key: PRIVATE_KEY_KEY,
            body: private_key.to_bytes(),
        },
        StoredObject::new(CHAIN_KEY, material.chain),
    ];
    if let Some(root_ca) = root_ca {
        objects.push(StoredObject::new(ROOT_CA_KEY, root_ca));
    }

    upload_objects(store, config.bucket(), objects).await
}

/// Lambda entry point logic: configuration from `vars`, then
/// [`export_certificate`]. Every outcome, panics included, becomes a
/// [`HandlerResponse`].
pub async fn handle<I, K, V, E, S>(vars: I, exporter: &E, store: &S) -> HandlerResponse
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
    E: CertificateExporter,
    S: ObjectStore,
{
    use futures::FutureExt;

    let config = match Config::from_vars(vars) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return HandlerResponse::from(&e);
        }
    };
    tracing::debug!(?config, "loaded configuration");

    let result = std::panic::AssertUnwindSafe(export_certificate(&config, exporter, store))
        .catch_unwind()
        .await;

    match result {
        Ok(Ok(uploaded)) => {
            tracing::info!(bucket = config.bucket(), ?uploaded, "export completed");
            HandlerResponse::success(&uploaded)
        }
        Ok(Err(e)) => {
            let resp = HandlerResponse::from(&e);
            tracing::error!(
                status_code = resp.status_code,
                error = %ErrorChain(&e),
                "export failed"
            );
            resp
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic".to_string());
            tracing::error!(panic = %message, "export panicked");
            HandlerResponse::unexpected(&message)
        }
    }
}
