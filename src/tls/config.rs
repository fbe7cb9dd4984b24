use mongodb::options::{Tls, TlsOptions};
use std::{path::PathBuf, str::FromStr};

/// TLS configuration for the `MongoDB` connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsConfig {
    pub mode: TlsMode,
    /// CA certificate used to verify the server
    pub ca: Option<PathBuf>,
    /// Client certificate and private key in a single PEM file
    pub cert: Option<PathBuf>,
}

/// TLS/SSL mode for the `MongoDB` connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// Keep whatever the connection string says
    #[default]
    Disable,
    /// TLS required, but no certificate verification
    Require,
    /// Verify server certificate against CA
    VerifyCA,
    /// Verify certificate and hostname
    VerifyFull,
}

impl FromStr for TlsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disable" => Ok(Self::Disable),
            "require" => Ok(Self::Require),
            "verify-ca" => Ok(Self::VerifyCA),
            "verify-full" => Ok(Self::VerifyFull),
            _ => Err(format!("Invalid TLS mode: {s}")),
        }
    }
}

impl TlsMode {
    /// Check if TLS is enabled
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disable)
    }
}

impl TlsConfig {
    /// Driver TLS settings, `None` leaves the connection string in charge
    ///
    /// The rustls backend of the driver can not skip hostname verification
    /// alone, so `VerifyCA` verifies the hostname as well.
    #[must_use]
    pub fn to_driver_tls(&self) -> Option<Tls> {
        if !self.mode.is_enabled() {
            return None;
        }

        let mut options = TlsOptions::default();
        options.allow_invalid_certificates = Some(self.mode == TlsMode::Require);
        options.ca_file_path.clone_from(&self.ca);
        options.cert_key_file_path.clone_from(&self.cert);

        Some(Tls::Enabled(options))
    }
}
