//! Request signature providers.

use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

/// Error produced by a signature provider.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signer is not configured")]
    NotConfigured,

    #[error("failed to stage signing data: {0}")]
    Io(#[from] std::io::Error),

    #[error("csptest invocation failed: {0}")]
    Exec(String),
}

/// Detached-signature provider for ESIA request signing.
///
/// Implementations sign the concatenated request parameters and expose
/// the hash of the certificate registered for the system in ESIA.
pub trait SignatureProvider {
    /// Sign the given data, returning the raw signature bytes.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SignatureError>;

    /// Hash of the signing certificate.
    fn cert_hash(&self) -> &str;
}

/// Fixed-value provider for tests.
///
/// Returns the configured signature verbatim; an empty signature makes
/// [`SignatureProvider::sign`] fail, which lets tests exercise the
/// signing error path.
pub struct NopProvider {
    signature: String,
    cert_hash: String,
}

impl NopProvider {
    pub fn new(signature: impl Into<String>, cert_hash: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            cert_hash: cert_hash.into(),
        }
    }
}

impl SignatureProvider for NopProvider {
    fn sign(&self, _data: &[u8]) -> Result<Vec<u8>, SignatureError> {
        if self.signature.is_empty() {
            return Err(SignatureError::NotConfigured);
        }
        Ok(self.signature.clone().into_bytes())
    }

    fn cert_hash(&self) -> &str {
        &self.cert_hash
    }
}

/// GOST R 34.10-2012 (256 bit) signing through the `csptest` utility
/// of a locally installed CryptoPro CSP 5 workstation package.
///
/// Only suitable for debugging the ESIA integration: the workstation
/// edition of CryptoPro CSP is not licensed for server use.
pub struct CryptoProProvider {
    csptest_path: PathBuf,
    container: String,
    cert_hash: String,
}

impl CryptoProProvider {
    /// Create a provider.
    ///
    /// `csptest_path` is the full path to the `csptest` utility,
    /// `container` the certificate container name (`csptest -keyset`
    /// prints it), and `cert_hash` the certificate hash as printed by
    /// `cpverify -mk <cert.cer> -alg GR3411_2012_256`.
    pub fn new(
        csptest_path: impl Into<PathBuf>,
        container: impl Into<String>,
        cert_hash: impl Into<String>,
    ) -> Self {
        Self {
            csptest_path: csptest_path.into(),
            container: container.into(),
            cert_hash: cert_hash.into(),
        }
    }
}

impl SignatureProvider for CryptoProProvider {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SignatureError> {
        let data_file = tempfile::NamedTempFile::new()?;
        std::fs::write(data_file.path(), data)?;
        let signature_file = tempfile::NamedTempFile::new()?;

        let status = Command::new(&self.csptest_path)
            .args(["-keys", "-sign", "GOST12_256", "-cont", &self.container])
            .args(["-keytype", "exchange"])
            .arg("-in")
            .arg(data_file.path())
            .arg("-out")
            .arg(signature_file.path())
            .status()
            .map_err(|err| SignatureError::Exec(err.to_string()))?;
        if !status.success() {
            return Err(SignatureError::Exec(format!("csptest exited with {status}")));
        }

        let mut signature = std::fs::read(signature_file.path())?;
        // The CSP writes the signature little-endian; ESIA expects the
        // reverse byte order.
        signature.reverse();
        Ok(signature)
    }

    fn cert_hash(&self) -> &str {
        &self.cert_hash
    }
}
