use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageBackend {
    Remote,
    Local,
}

impl ImageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageBackend::Remote => "remote",
            ImageBackend::Local => "local",
        }
    }
}

impl fmt::Display for ImageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a profile image ended up. `public_url` is absolute for every backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImageRef {
    pub public_url: String,
    pub key: String,
    pub backend: ImageBackend,
}

/// Minimal projection returned once the record points at the new image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileImage {
    pub profile_image: String,
}
