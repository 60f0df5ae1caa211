use std::string::FromUtf8Error;

/// Content flowing through a loader chain.
///
/// The chain starts from the raw resource bytes; loaders working on text can
/// convert once and keep passing `Text` down the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Raw(Vec<u8>),
}

impl Content {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Content::Text(text) => text.as_bytes(),
            Content::Raw(bytes) => bytes,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Content::Text(text) => text.into_bytes(),
            Content::Raw(bytes) => bytes,
        }
    }

    pub fn try_into_string(self) -> Result<String, FromUtf8Error> {
        match self {
            Content::Text(text) => Ok(text),
            Content::Raw(bytes) => String::from_utf8(bytes),
        }
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Content {
    fn from(bytes: Vec<u8>) -> Self {
        Content::Raw(bytes)
    }
}
