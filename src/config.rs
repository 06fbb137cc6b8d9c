//! Configuration read from environment variables
//!
use crate::Error;

pub const S3_BUCKET: &str = "S3_BUCKET";
pub const CERTIFICATE_SOURCE: &str = "CERTIFICATE_SOURCE";
pub const CERTIFICATE_ARN: &str = "CERTIFICATE_ARN";
pub const PASSPHRASE: &str = "PASSPHRASE";
pub const CERTIFICATE_BODY: &str = "CERTIFICATE_BODY";
pub const PRIVATE_KEY: &str = "PRIVATE_KEY";
pub const CERTIFICATE_CHAIN: &str = "CERTIFICATE_CHAIN";
pub const CERTIFICATE_DIR: &str = "CERTIFICATE_DIR";
pub const ROOT_CA_FILE: &str = "ROOT_CA_FILE";
pub const LAMBDA_TASK_ROOT: &str = "LAMBDA_TASK_ROOT";

/// Where the certificate material comes from
#[derive(Clone, PartialEq, Eq)]
pub enum CertificateSource {
    /// ACM ExportCertificate API
    Acm { certificate_arn: String },
    /// Literal PEM text in environment variables
    Environment {
        certificate: String,
        private_key: String,
        chain: String,
    },
    /// cert.pem, key.pem and chain.pem on local disk
    Files { dir: Option<std::path::PathBuf> },
}

impl std::fmt::Debug for CertificateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Acm { certificate_arn } => f
                .debug_struct("Acm")
                .field("certificate_arn", certificate_arn)
                .finish(),
            // PEM bodies stay out of logs
            Self::Environment {
                certificate, chain, ..
            } => f
                .debug_struct("Environment")
                .field("certificate", &certificate.len())
                .field("private_key", &"<redacted>")
                .field("chain", &chain.len())
                .finish(),
            Self::Files { dir } => f.debug_struct("Files").field("dir", dir).finish(),
        }
    }
}

/// Process environment as UTF-8 pairs, skipping anything that is not UTF-8
pub fn env_vars() -> impl Iterator<Item = (String, String)> {
    std::env::vars_os()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
}

pub struct Config {
    bucket: String,
    source: CertificateSource,
    passphrase: Option<zeroize::Zeroizing<String>>,
    root_ca_file: Option<std::path::PathBuf>,
    task_root: Option<std::path::PathBuf>,
}

impl Config {
    /// Snapshot the process environment
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(env_vars())
    }

    /// Build configuration from name/value pairs.
    ///
    /// All missing required variables are reported at once.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !v.is_empty())
            .collect::<std::collections::HashMap<String, String>>();

        let mut missing = Vec::<&'static str>::new();
        let mut take_required = |vars: &mut std::collections::HashMap<String, String>,
                                 name: &'static str| {
            let value = vars.remove(name);
            if value.is_none() {
                missing.push(name);
            }
            value
        };

        let bucket = take_required(&mut vars, S3_BUCKET);
        let source_name = vars
            .remove(CERTIFICATE_SOURCE)
            .unwrap_or_else(|| "acm".to_string());

        let (source, passphrase) = match source_name.to_ascii_lowercase().as_str() {
            "acm" => {
                let certificate_arn = take_required(&mut vars, CERTIFICATE_ARN);
                // Never fall back to a built-in passphrase
                let passphrase = take_required(&mut vars, PASSPHRASE);
                let source = certificate_arn
                    .map(|certificate_arn| CertificateSource::Acm { certificate_arn });
                (source, passphrase)
            }
            "env" => {
                let certificate = take_required(&mut vars, CERTIFICATE_BODY);
                let private_key = take_required(&mut vars, PRIVATE_KEY);
                let chain = take_required(&mut vars, CERTIFICATE_CHAIN);
                let source = match (certificate, private_key, chain) {
                    (Some(certificate), Some(private_key), Some(chain)) => {
                        Some(CertificateSource::Environment {
                            certificate,
                            private_key,
                            chain,
                        })
                    }
                    _ => None,
                };
                (source, vars.remove(PASSPHRASE))
            }
            "file" => {
                let dir = vars.remove(CERTIFICATE_DIR).map(std::path::PathBuf::from);
                (Some(CertificateSource::Files { dir }), vars.remove(PASSPHRASE))
            }
            _ => {
                return Err(Error::InvalidSource {
                    value: source_name,
                    missing,
                })
            }
        };

        match (bucket, source) {
            (Some(bucket), Some(source)) if missing.is_empty() => Ok(Self {
                bucket,
                source,
                passphrase: passphrase.map(zeroize::Zeroizing::new),
                root_ca_file: vars.remove(ROOT_CA_FILE).map(std::path::PathBuf::from),
                task_root: vars.remove(LAMBDA_TASK_ROOT).map(std::path::PathBuf::from),
            }),
            _ => Err(Error::MissingConfig(missing)),
        }
    }

    pub fn bucket<'a>(&'a self) -> &'a str {
        self.bucket.as_str()
    }

    pub fn source<'a>(&'a self) -> &'a CertificateSource {
        &self.source
    }

    pub fn passphrase<'a>(&'a self) -> Option<&'a str> {
        self.passphrase.as_ref().map(|p| p.as_str())
    }

    pub fn root_ca_file<'a>(&'a self) -> Option<&'a std::path::Path> {
        self.root_ca_file.as_deref()
    }

    pub fn task_root<'a>(&'a self) -> Option<&'a std::path::Path> {
        self.task_root.as_deref()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bucket", &self.bucket)
            .field("source", &self.source)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("root_ca_file", &self.root_ca_file)
            .field("task_root", &self.task_root)
            .finish()
    }
}
