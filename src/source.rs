//! Where the database text comes from.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncBufRead, BufReader};

/// A restartable, sequential stream of database lines.
///
/// Every call to `open` starts reading from the first line again.
pub trait LineSource: Send + Sync + 'static {
    type Reader: AsyncBufRead + Unpin + Send;

    /// Human-readable name used in logs and errors.
    fn describe(&self) -> String;

    fn open(&self) -> impl Future<Output = io::Result<Self::Reader>> + Send;
}

/// A usb.ids file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineSource for FileSource {
    type Reader = BufReader<File>;

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn open(&self) -> io::Result<Self::Reader> {
        let file = File::open(&self.path).await?;
        Ok(BufReader::new(file))
    }
}
