//! Manually entered private key handling
//!
//! The vault holds at most one key for the lifetime of a session. The key is
//! mirrored into the session store so a reload within the same session can
//! restore it; it is never written to disk.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use zeroize::Zeroizing;

use crate::config::NetworkType;
use crate::error::ValidationError;
use crate::storage::session::SessionStore;

/// Session store key under which the mirror lives
pub const SESSION_KEY: &str = "temp_private_key";

const WIF_PATTERN: &str =
    r"^[5KL][1-9A-HJ-NP-Za-km-z]{50,51}$|^[9c][1-9A-HJ-NP-Za-km-z]{49,50}$";
const HEX_PATTERN: &str = r"^[0-9a-fA-F]{64}$";

fn wif_regex() -> Option<&'static Regex> {
    static WIF: OnceLock<Option<Regex>> = OnceLock::new();
    WIF.get_or_init(|| Regex::new(WIF_PATTERN).ok()).as_ref()
}

fn hex_regex() -> Option<&'static Regex> {
    static HEX: OnceLock<Option<Regex>> = OnceLock::new();
    HEX.get_or_init(|| Regex::new(HEX_PATTERN).ok()).as_ref()
}

/// Shape of an accepted key string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    /// WIF starting with `5`, `K` or `L`
    WifMainnet,
    /// WIF starting with `9` or `c`
    WifTestnet,
    /// 32 raw bytes as 64 hex characters
    Hex,
}

impl KeyFormat {
    /// Classify a key string, or `None` if it is not an acceptable key
    pub fn detect(key: &str) -> Option<Self> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }

        if wif_regex().is_some_and(|re| re.is_match(key)) {
            return match key.as_bytes()[0] {
                b'5' | b'K' | b'L' => Some(KeyFormat::WifMainnet),
                _ => Some(KeyFormat::WifTestnet),
            };
        }

        if hex_regex().is_some_and(|re| re.is_match(key)) {
            return Some(KeyFormat::Hex);
        }

        None
    }
}

/// A validated private key string
///
/// The contents are zeroized on drop and never printed by `Debug`.
#[derive(Clone)]
pub struct PrivateKeyRecord {
    key: Zeroizing<String>,
    format: KeyFormat,
}

impl PrivateKeyRecord {
    /// Validate and wrap a key; surrounding whitespace is discarded
    pub fn new(key: &str) -> Result<Self, ValidationError> {
        let trimmed = key.trim();
        let format = KeyFormat::detect(trimmed).ok_or(ValidationError::InvalidPrivateKey)?;
        Ok(Self {
            key: Zeroizing::new(trimmed.to_string()),
            format,
        })
    }

    pub fn as_str(&self) -> &str {
        self.key.as_str()
    }

    pub fn format(&self) -> KeyFormat {
        self.format
    }

    /// Decode into a signing key
    ///
    /// WIF keys carry their own network and checksum; `network` applies to
    /// raw hex keys only.
    pub fn to_private_key(
        &self,
        network: NetworkType,
    ) -> Result<::bitcoin::PrivateKey, ValidationError> {
        match self.format {
            KeyFormat::WifMainnet | KeyFormat::WifTestnet => {
                ::bitcoin::PrivateKey::from_wif(self.as_str())
                    .map_err(|e| ValidationError::UndecodablePrivateKey(e.to_string()))
            }
            KeyFormat::Hex => {
                let bytes = Zeroizing::new(
                    hex::decode(self.as_str())
                        .map_err(|e| ValidationError::UndecodablePrivateKey(e.to_string()))?,
                );
                let secret = ::bitcoin::secp256k1::SecretKey::from_slice(&bytes)
                    .map_err(|e| ValidationError::UndecodablePrivateKey(e.to_string()))?;
                Ok(::bitcoin::PrivateKey::new(
                    secret,
                    ::bitcoin::Network::from(network),
                ))
            }
        }
    }
}

impl std::fmt::Debug for PrivateKeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKeyRecord")
            .field("format", &self.format)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Holder of the manually entered key
pub struct PrivateKeyVault {
    record: Option<PrivateKeyRecord>,
    session: Arc<dyn SessionStore>,
}

impl PrivateKeyVault {
    pub fn new(session: Arc<dyn SessionStore>) -> Self {
        Self {
            record: None,
            session,
        }
    }

    /// Structural check only: WIF shape or 64 hex characters
    ///
    /// The WIF checksum is not verified here; see
    /// [`PrivateKeyRecord::to_private_key`].
    pub fn validate(key: &str) -> bool {
        KeyFormat::detect(key).is_some()
    }

    /// Replace the held key and mirror it into the session store
    pub fn set(&mut self, key: &str) -> Result<(), ValidationError> {
        let record = PrivateKeyRecord::new(key)?;
        self.session.set(SESSION_KEY, record.as_str());
        log::info!("Private key stored for this session ({:?})", record.format());
        self.record = Some(record);
        Ok(())
    }

    /// The held key, restoring it from the session mirror if needed
    pub fn get(&mut self) -> Option<&PrivateKeyRecord> {
        if self.record.is_none() {
            let mirrored = self.session.get(SESSION_KEY).map(Zeroizing::new)?;
            match PrivateKeyRecord::new(&mirrored) {
                Ok(record) => {
                    log::debug!("Restored private key from session store");
                    self.record = Some(record);
                }
                Err(_) => {
                    log::warn!("Discarding invalid private key found in session store");
                    self.session.remove(SESSION_KEY);
                    return None;
                }
            }
        }
        self.record.as_ref()
    }

    /// Wipe the in-memory key and the session mirror
    pub fn clear(&mut self) {
        // Dropping the record zeroizes it.
        self.record = None;
        self.session.remove(SESSION_KEY);
    }

    pub fn has_key(&mut self) -> bool {
        self.get().is_some()
    }
}

impl std::fmt::Debug for PrivateKeyVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKeyVault")
            .field("loaded", &self.record.is_some())
            .finish()
    }
}
