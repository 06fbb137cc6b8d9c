use crate::{Error, ErrorCategory, ErrorChain};

/// Result record returned to the Lambda runtime
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    pub fn success(uploaded: &[&str]) -> Self {
        let body = if uploaded.contains(&crate::output::ROOT_CA_KEY) {
            "Certificate, key, chain, and root CA exported successfully"
        } else {
            "Certificate, key, and chain exported successfully"
        };
        Self {
            status_code: 200,
            body: body.to_string(),
        }
    }

    /// Unexpected failure with a bare message, e.g. a panic
    pub fn unexpected(message: &str) -> Self {
        Self {
            status_code: 500,
            body: format!("Unexpected error: {}", message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

impl From<&Error> for HandlerResponse {
    fn from(err: &Error) -> Self {
        let body = match err.category() {
            ErrorCategory::Configuration => err.to_string(),
            ErrorCategory::Service => match err {
                Error::Upload { key, source } => {
                    format!("Error uploading {}: {}", key, ErrorChain(source.as_ref()))
                }
                _ => format!("Error exporting certificate: {}", ErrorChain(err)),
            },
            ErrorCategory::Decryption => {
                format!("Error decrypting private key: {}", ErrorChain(err))
            }
            ErrorCategory::Unexpected => format!("Unexpected error: {}", ErrorChain(err)),
        };

        Self {
            status_code: err.status_code(),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_lambda_field_names() {
        let resp = HandlerResponse::success(&["cert.pem", "key.pem", "chain.pem"]);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "statusCode": 200,
                "body": "Certificate, key, and chain exported successfully",
            })
        );
    }

    #[test]
    fn missing_config_is_bad_request() {
        let resp = HandlerResponse::from(&Error::MissingConfig(vec!["S3_BUCKET", "PASSPHRASE"]));
        assert_eq!(resp.status_code, 400);
        assert_eq!(
            resp.body,
            "Missing required environment variables: S3_BUCKET, PASSPHRASE"
        );
    }

    #[test]
    fn upload_error_names_key() {
        let err = Error::Upload {
            key: "key.pem".to_string(),
            source: Box::new(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "access denied",
            ))),
        };
        let resp = HandlerResponse::from(&err);
        assert_eq!(resp.status_code, 500);
        assert_eq!(resp.body, "Error uploading key.pem: access denied");
    }
}
