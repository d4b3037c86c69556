use std::fmt::Display;
use std::fs::File;
use std::io::{
    BufWriter,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};

use log::debug;

use crate::error::TrackResult;

/// Compression applied to every object a store persists.
///
/// The store extension reflects the choice so that addressing templates
/// resolve to the right file names on the client side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreCompression {
    #[default]
    None,
    Gzip,
}

impl StoreCompression {
    pub fn name(&self) -> &'static str {
        match self {
            StoreCompression::None => "none",
            StoreCompression::Gzip => "gzip",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            StoreCompression::None => ".json",
            StoreCompression::Gzip => ".jsonz",
        }
    }
}

impl Display for StoreCompression {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Persists named byte objects under one directory, optionally gzipped.
///
/// This is the persistence boundary of the indexing engine: it knows
/// nothing about feature semantics. `put` under the same name overwrites
/// (last write wins).
#[derive(Debug)]
pub struct ChunkedObjectStore {
    root:        PathBuf,
    compression: StoreCompression,
}

impl ChunkedObjectStore {
    /// Opens a store rooted at `root`, creating the directory when absent.
    pub fn create<P: Into<PathBuf>>(
        root: P,
        compression: StoreCompression,
    ) -> TrackResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root, compression })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn compression(&self) -> StoreCompression {
        self.compression
    }

    /// The suffix addressing templates must incorporate, reflecting the
    /// configured compression.
    pub fn extension(&self) -> &'static str {
        self.compression.extension()
    }

    /// Resolved path of a named object inside the store.
    pub fn object_path(
        &self,
        name: &str,
    ) -> PathBuf {
        self.root.join(format!("{}{}", name, self.extension()))
    }

    /// Persists a named object, compressing it when configured.
    pub fn put(
        &self,
        name: &str,
        data: &[u8],
    ) -> TrackResult<()> {
        let path = self.object_path(name);
        let sink = BufWriter::new(File::create(&path)?);
        match self.compression {
            StoreCompression::None => {
                let mut sink = sink;
                sink.write_all(data)?;
                sink.flush()?;
            },
            StoreCompression::Gzip => {
                let mut encoder = flate2::write::GzEncoder::new(
                    sink,
                    flate2::Compression::default(),
                );
                encoder.write_all(data)?;
                encoder.finish()?.flush()?;
            },
        }
        debug!("stored {} ({} bytes raw)", path.display(), data.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    #[test]
    fn put_writes_object_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            ChunkedObjectStore::create(dir.path(), StoreCompression::None)
                .unwrap();

        store.put("lf-0", b"[1,2,3]").unwrap();
        let written = std::fs::read(dir.path().join("lf-0.json")).unwrap();
        assert_eq!(written, b"[1,2,3]");
    }

    #[test]
    fn put_overwrites_same_name() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            ChunkedObjectStore::create(dir.path(), StoreCompression::None)
                .unwrap();

        store.put("trackData", b"first").unwrap();
        store.put("trackData", b"second").unwrap();
        let written = std::fs::read(store.object_path("trackData")).unwrap();
        assert_eq!(written, b"second");
    }

    #[test]
    fn gzip_objects_decompress_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            ChunkedObjectStore::create(dir.path(), StoreCompression::Gzip)
                .unwrap();
        assert_eq!(store.extension(), ".jsonz");

        store.put("hist-500-0", b"[0,0,4]").unwrap();
        let file = File::open(dir.path().join("hist-500-0.jsonz")).unwrap();
        let mut decoder = flate2::read::GzDecoder::new(file);
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed).unwrap();
        assert_eq!(decompressed, b"[0,0,4]");
    }

    #[test]
    fn create_fails_on_unwritable_root() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("occupied");
        std::fs::write(&file_path, b"x").unwrap();
        // a plain file cannot become a store root
        assert!(ChunkedObjectStore::create(
            &file_path,
            StoreCompression::None
        )
        .is_err());
    }
}
