use crate::Error;

/// Certificate, encrypted private key and chain, as PEM text
#[derive(Clone)]
pub struct ExportedCertificate {
    pub certificate: String,
    pub private_key: zeroize::Zeroizing<String>,
    pub chain: String,
}

impl std::fmt::Debug for ExportedCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportedCertificate")
            .field("certificate", &self.certificate.len())
            .field("private_key", &"<redacted>")
            .field("chain", &self.chain.len())
            .finish()
    }
}

/// Something that can export a certificate together with its private key
pub trait CertificateExporter {
    fn export_certificate(
        &self,
        certificate_arn: &str,
        passphrase: &[u8],
    ) -> impl std::future::Future<Output = Result<ExportedCertificate, Error>> + Send;
}

#[derive(Clone, Debug)]
pub struct AcmExporter {
    acm_client: aws_sdk_acm::Client,
}

impl AcmExporter {
    pub fn new(aws_sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            acm_client: aws_sdk_acm::Client::new(aws_sdk_config),
        }
    }

    fn export_request(
        &self,
        certificate_arn: &str,
        passphrase: &[u8],
    ) -> aws_sdk_acm::operation::export_certificate::builders::ExportCertificateFluentBuilder {
        self.acm_client
            .export_certificate()
            .certificate_arn(certificate_arn)
            .passphrase(aws_sdk_acm::primitives::Blob::new(passphrase))
    }
}

impl CertificateExporter for AcmExporter {
    async fn export_certificate(
        &self,
        certificate_arn: &str,
        passphrase: &[u8],
    ) -> Result<ExportedCertificate, Error> {
        // Call ACM ExportCertificate API
        let resp = self.export_request(certificate_arn, passphrase).send().await?;
        ExportedCertificate::try_from(&resp)
    }
}

impl TryFrom<&aws_sdk_acm::operation::export_certificate::ExportCertificateOutput>
    for ExportedCertificate
{
    type Error = Error;

    /// All three parts must be present in the response
    fn try_from(
        resp: &aws_sdk_acm::operation::export_certificate::ExportCertificateOutput,
    ) -> Result<Self, Self::Error> {
        let certificate = resp
            .certificate()
            .ok_or(Error::IncompleteExport("certificate"))?;
        let private_key = resp
            .private_key()
            .ok_or(Error::IncompleteExport("private key"))?;
        let chain = resp
            .certificate_chain()
            .ok_or(Error::IncompleteExport("certificate chain"))?;

        Ok(Self {
            certificate: certificate.to_string(),
            private_key: zeroize::Zeroizing::new(private_key.to_string()),
            chain: chain.to_string(),
        })
    }
}
