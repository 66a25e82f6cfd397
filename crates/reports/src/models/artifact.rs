use std::borrow::Cow;

/// Where the compressed report file can be downloaded from.
///
/// Analytics segment URLs are pre-signed and fetched without credentials;
/// sales and finance endpoints serve the file directly and need the bearer token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArtifactLocation {
    pub url: String,
    pub requires_auth: bool,
}

impl ArtifactLocation {
    pub fn presigned(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            requires_auth: false,
        }
    }

    pub fn authenticated(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            requires_auth: true,
        }
    }
}

/// Decompressed report body. Read-only once produced.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RawPayload(Vec<u8>);

impl RawPayload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// UTF-8 view of the payload; invalid sequences are replaced.
    pub fn as_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for RawPayload {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for RawPayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}
