use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{GalleryError, Result};

/// Where an image comes from. Remote sources are displayed by reference only;
/// nothing in the gallery fetches them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Local(PathBuf),
    Remote(String),
}

impl ImageSource {
    /// Classify a reference string and resolve local ones against `assets_dir`.
    ///
    /// A leading `/` means "relative to the site root", which is the assets
    /// directory here. Absolute paths that exist on disk are kept untouched.
    pub fn parse(reference: &str, assets_dir: &Path) -> Self {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return ImageSource::Remote(reference.to_string());
        }

        let path = Path::new(reference);
        if path.is_absolute() && path.exists() {
            return ImageSource::Local(path.to_path_buf());
        }
        ImageSource::Local(assets_dir.join(reference.trim_start_matches('/')))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ImageSource::Remote(_))
    }

    /// Short human-readable label, used for placeholders and logging.
    pub fn label(&self) -> String {
        match self {
            ImageSource::Local(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            ImageSource::Remote(url) => url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoCollection {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub cover_image: ImageSource,
    pub images: Vec<ImageSource>,
}

impl PhotoCollection {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn image(&self, index: usize) -> Option<&ImageSource> {
        self.images.get(index)
    }

    /// Navigation wraps modulo the image count, so an empty collection can
    /// never be shown.
    pub fn validate(&self) -> Result<()> {
        if self.images.is_empty() {
            return Err(GalleryError::InvalidCollection { id: self.id });
        }
        Ok(())
    }
}

struct CatalogEntry {
    id: u32,
    title: &'static str,
    description: &'static str,
    cover_image: &'static str,
    images: &'static [&'static str],
}

const SEA_COVER: &str = "https://cdn.poehali.dev/files/68d30dc6-0746-4989-b899-28663ca38d2e.jpg";
const PORTRAIT: &str = "/img/8f9aff19-5734-4b79-816b-cb19fb2fee16.jpg";
const FACADE: &str = "/img/9e521f06-85e8-4191-844e-5af2137c86a4.jpg";
const LANDSCAPE: &str = "/img/2d2a5579-8623-4364-b052-b42f1090bfaa.jpg";

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: 1,
        title: "Sea Stories",
        description: "Warm moments from everyday life, family photos with a seafaring soul",
        cover_image: SEA_COVER,
        images: &[SEA_COVER, PORTRAIT, FACADE, LANDSCAPE],
    },
    CatalogEntry {
        id: 2,
        title: "Classic Portraits",
        description: "A refined collection of portrait photography in the traditional style",
        cover_image: PORTRAIT,
        images: &[PORTRAIT, FACADE, LANDSCAPE],
    },
    CatalogEntry {
        id: 3,
        title: "Architectural Classics",
        description: "Majestic buildings and architectural details in a classic rendering",
        cover_image: FACADE,
        images: &[FACADE, PORTRAIT, LANDSCAPE],
    },
    CatalogEntry {
        id: 4,
        title: "Vintage Landscapes",
        description: "Nostalgic views of nature in a traditional photographic manner",
        cover_image: LANDSCAPE,
        images: &[LANDSCAPE, PORTRAIT, FACADE],
    },
];

/// The fixed, ordered list of collections known at startup.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    collections: Vec<PhotoCollection>,
}

impl Registry {
    pub fn new(collections: Vec<PhotoCollection>) -> Result<Self> {
        let mut seen = HashSet::new();
        for collection in &collections {
            collection.validate()?;
            if !seen.insert(collection.id) {
                return Err(GalleryError::DuplicateCollection { id: collection.id });
            }
        }
        Ok(Registry { collections })
    }

    /// The compiled-in catalog with local images rooted at `assets_dir`.
    pub fn builtin(assets_dir: &Path) -> Result<Self> {
        let collections = CATALOG
            .iter()
            .map(|entry| PhotoCollection {
                id: entry.id,
                title: entry.title.to_string(),
                description: entry.description.to_string(),
                cover_image: ImageSource::parse(entry.cover_image, assets_dir),
                images: entry
                    .images
                    .iter()
                    .map(|r| ImageSource::parse(r, assets_dir))
                    .collect(),
            })
            .collect();
        Registry::new(collections)
    }

    pub fn list_collections(&self) -> &[PhotoCollection] {
        &self.collections
    }

    pub fn get(&self, id: u32) -> Option<&PhotoCollection> {
        self.collections.iter().find(|c| c.id == id)
    }
}
