//! Load certificate material from the configured source
use crate::{CertificateExporter, CertificateSource, Config, Error, ExportedCertificate};

pub const CERT_FILE: &str = "cert.pem";
pub const KEY_FILE: &str = "key.pem";
pub const CHAIN_FILE: &str = "chain.pem";
/// Root CA picked up by the file source when ROOT_CA_FILE is unset
pub const DEFAULT_ROOT_CA_FILE: &str = "root_ca_10xr.pem";

pub async fn fetch_certificate<E: CertificateExporter>(
    config: &Config,
    exporter: &E,
) -> Result<ExportedCertificate, Error> {
    match config.source() {
        CertificateSource::Acm { certificate_arn } => {
            let passphrase = config
                .passphrase()
                .ok_or_else(|| Error::MissingConfig(vec![crate::config::PASSPHRASE]))?;
            let certificate_arn = certificate_arn.as_str();

            tracing::info!(certificate_arn, "exporting certificate from ACM");
            let exported = exporter
                .export_certificate(certificate_arn, passphrase.as_bytes())
                .await
                .map_err(|e| {
                    tracing::error!(certificate_arn, error = %e, "certificate export failed");
                    e
                })?;
            tracing::info!(certificate_arn, "exported certificate from ACM");
            Ok(exported)
        }
        CertificateSource::Environment {
            certificate,
            private_key,
            chain,
        } => Ok(ExportedCertificate {
            certificate: certificate.clone(),
            private_key: zeroize::Zeroizing::new(private_key.clone()),
            chain: chain.clone(),
        }),
        CertificateSource::Files { dir } => {
            let search = SearchPath::new(dir.as_deref(), config.task_root());
            Ok(ExportedCertificate {
                certificate: search.read(CERT_FILE)?,
                private_key: zeroize::Zeroizing::new(search.read(KEY_FILE)?),
                chain: search.read(CHAIN_FILE)?,
            })
        }
    }
}

/// Root CA certificate to publish, if any
pub fn fetch_root_ca(config: &Config) -> Result<Option<String>, Error> {
    let dir = match config.source() {
        CertificateSource::Files { dir } => dir.as_deref(),
        _ => None,
    };
    let search = SearchPath::new(dir, config.task_root());

    match (config.root_ca_file(), config.source()) {
        (Some(root_ca_file), _) => search.read(root_ca_file).map(Some),
        (None, CertificateSource::Files { .. }) => match search.resolve(DEFAULT_ROOT_CA_FILE) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "found root CA certificate");
                Ok(Some(std::fs::read_to_string(path)?))
            }
            Err(Error::InputNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        },
        (None, _) => Ok(None),
    }
}

/// Directories searched for relative input files, in order
#[derive(Debug)]
pub struct SearchPath {
    dirs: Vec<std::path::PathBuf>,
}

impl SearchPath {
    /// `dir` (or the working directory), then the Lambda task root,
    /// then the directory of the running executable
    pub fn new(dir: Option<&std::path::Path>, task_root: Option<&std::path::Path>) -> Self {
        let base = dir
            .map(|d| d.to_path_buf())
            .or_else(|| std::env::current_dir().ok());
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.to_path_buf()));

        let mut dirs = Vec::<std::path::PathBuf>::new();
        for d in [base, task_root.map(|p| p.to_path_buf()), exe_dir]
            .into_iter()
            .flatten()
        {
            if !dirs.contains(&d) {
                dirs.push(d);
            }
        }
        Self { dirs }
    }

    pub fn resolve<P: AsRef<std::path::Path>>(
        &self,
        name: P,
    ) -> Result<std::path::PathBuf, Error> {
        let name = name.as_ref();
        let candidates = if name.is_absolute() {
            vec![name.to_path_buf()]
        } else {
            self.dirs.iter().map(|d| d.join(name)).collect()
        };

        match candidates.iter().find(|p| p.is_file()) {
            Some(found) => Ok(found.clone()),
            None => Err(Error::InputNotFound {
                name: name.display().to_string(),
                searched: candidates,
            }),
        }
    }

    pub fn read<P: AsRef<std::path::Path>>(&self, name: P) -> Result<String, Error> {
        let path = self.resolve(name)?;
        tracing::debug!(path = %path.display(), "reading input file");
        Ok(std::fs::read_to_string(path)?)
    }
}
