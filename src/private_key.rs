//! PKCS#8 private key decryption, RFC5208 / RFC5958
use crate::Error;

const ENCRYPTED_LABEL: &str = "ENCRYPTED PRIVATE KEY";
const PLAIN_LABEL: &str = "PRIVATE KEY";

/// Unencrypted PKCS#8 private key in PEM, wiped from memory on drop
pub struct DecryptedPrivateKey {
    pem: zeroize::Zeroizing<String>,
}

impl DecryptedPrivateKey {
    pub fn as_pem<'a>(&'a self) -> &'a str {
        self.pem.as_str()
    }

    pub fn to_bytes(&self) -> zeroize::Zeroizing<Vec<u8>> {
        zeroize::Zeroizing::new(self.pem.as_bytes().to_vec())
    }
}

/// Decrypt an `ENCRYPTED PRIVATE KEY` PEM and re-encode it as `PRIVATE KEY`.
///
/// Unencrypted PKCS#8 input is accepted as well and re-encoded as is.
/// Wrong passphrases and malformed keys are both reported as errors.
pub fn decrypt_private_key(
    key_pem: &str,
    passphrase: Option<&str>,
) -> Result<DecryptedPrivateKey, Error> {
    use pkcs8::der::{pem::LineEnding, Decode};

    let (label, document) = pkcs8::SecretDocument::from_pem(key_pem.trim())?;

    let document = match label {
        ENCRYPTED_LABEL => {
            let passphrase = passphrase
                .ok_or_else(|| Error::MissingConfig(vec![crate::config::PASSPHRASE]))?;
            let encrypted = pkcs8::EncryptedPrivateKeyInfo::from_der(document.as_bytes())?;
            encrypted.decrypt(passphrase)?
        }
        PLAIN_LABEL => document,
        other => return Err(Error::UnsupportedKeyFormat(other.to_string())),
    };

    // A wrong passphrase occasionally yields valid padding, so check the plaintext
    pkcs8::PrivateKeyInfo::from_der(document.as_bytes())?;

    let pem = document.to_pem(PLAIN_LABEL, LineEnding::LF)?;
    Ok(DecryptedPrivateKey { pem })
}
