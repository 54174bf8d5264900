use crate::{
    error::{BatchError, EmptyBatchError},
    gallery::SourceBlob,
    header::HeaderParser,
};

use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufReader, Write},
    path::{Path, PathBuf},
};
use uuid::Uuid;
use walkdir::WalkDir;
use zip::ZipArchive;

/// Outcome of saving a set of uploads into a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// DICOM files now present in the batch, in path order.
    pub accepted: Vec<PathBuf>,
    /// Uploads that were neither DICOM nor a readable zip archive.
    pub rejected: Vec<String>,
}

impl IngestReport {
    pub fn ensure_any(&self) -> Result<(), EmptyBatchError> {
        if self.accepted.is_empty() {
            Err(EmptyBatchError)
        } else {
            Ok(())
        }
    }
}

/// Isolated directory holding the files of one upload session.
///
/// Created once per batch and released with [`BatchStorage::cleanup`];
/// releasing is idempotent and a missing directory is not an error.
#[derive(Debug)]
pub struct BatchStorage {
    id: String,
    dir: PathBuf,
    released: bool,
}

impl BatchStorage {
    pub fn create(root: impl AsRef<Path>) -> Result<Self, BatchError> {
        let root = root.as_ref();
        fs::create_dir_all(root)?;

        let id = Uuid::new_v4().to_string();
        let dir = root.join(&id);
        fs::create_dir(&dir)?;
        log::info!("Created batch {id} at {}", dir.display());

        Ok(Self {
            id,
            dir,
            released: false,
        })
    }

    /// Reattaches to an existing batch by its id.
    pub fn open(root: impl AsRef<Path>, id: &str) -> Result<Self, BatchError> {
        let dir = Self::session_dir(root.as_ref(), id)?;
        if !dir.is_dir() {
            return Err(BatchError::SessionNotFound(id.to_string()));
        }
        Ok(Self {
            id: id.to_string(),
            dir,
            released: false,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Saves uploads into the batch. Uploads that fail the DICOM probe but
    /// are named `*.zip` are expanded in place.
    ///
    /// # Errors
    ///
    /// Returns error if the uploads together exceed `max_upload_bytes`, the
    /// batch was released, or the batch directory cannot be written.
    /// Unusable uploads are reported, not raised.
    pub fn ingest(
        &mut self,
        uploads: &[SourceBlob],
        max_upload_bytes: u64,
    ) -> Result<IngestReport, BatchError> {
        self.ensure_live()?;

        let size: u64 = uploads.iter().map(|upload| upload.bytes.len() as u64).sum();
        if size > max_upload_bytes {
            return Err(BatchError::UploadTooLarge {
                size,
                limit: max_upload_bytes,
            });
        }

        let mut rejected = Vec::new();
        for upload in uploads {
            if !self.save_upload(upload)? {
                rejected.push(upload.filename.clone());
            }
        }

        let accepted = self.dicom_files()?;
        log::info!(
            "Batch {}: {} DICOM files, {} rejected uploads",
            self.id,
            accepted.len(),
            rejected.len()
        );
        Ok(IngestReport { accepted, rejected })
    }

    /// All files in the batch that pass the DICOM probe, sorted by path.
    pub fn dicom_files(&self) -> Result<Vec<PathBuf>, BatchError> {
        self.ensure_live()?;

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.dir).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_file() && HeaderParser::probe_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Reads every DICOM file of the batch into memory.
    pub fn load_blobs(&self) -> Result<Vec<SourceBlob>, BatchError> {
        self.dicom_files()?
            .into_iter()
            .map(|path| {
                let bytes = fs::read(&path)?;
                let filename = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(SourceBlob { filename, bytes })
            })
            .collect()
    }

    /// Removes the batch directory. Returns whether anything was removed.
    pub fn cleanup(&mut self) -> Result<bool, BatchError> {
        if self.released {
            return Ok(false);
        }
        let removed = Self::remove_dir(&self.dir)?;
        self.released = true;
        if removed {
            log::info!("Cleaned up batch {}", self.id);
        }
        Ok(removed)
    }

    /// Removes a batch by id without holding a handle to it.
    pub fn cleanup_session(root: impl AsRef<Path>, id: &str) -> Result<bool, BatchError> {
        let dir = Self::session_dir(root.as_ref(), id)?;
        Self::remove_dir(&dir)
    }

    fn remove_dir(dir: &Path) -> Result<bool, BatchError> {
        match fs::remove_dir_all(dir) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn session_dir(root: &Path, id: &str) -> Result<PathBuf, BatchError> {
        if Uuid::parse_str(id).is_err() {
            return Err(BatchError::InvalidSessionId(id.to_string()));
        }
        Ok(root.join(id))
    }

    fn ensure_live(&self) -> Result<(), BatchError> {
        if self.released {
            return Err(BatchError::Released(self.dir.clone()));
        }
        Ok(())
    }

    /// Returns false when the upload contributes nothing usable.
    fn save_upload(&self, upload: &SourceBlob) -> Result<bool, BatchError> {
        let Some(name) = secure_filename(&upload.filename) else {
            log::warn!("Rejecting upload with unusable name {:?}", upload.filename);
            return Ok(false);
        };

        let (path, mut file) = create_unique(&self.dir, &name)?;
        file.write_all(&upload.bytes)?;
        if path != self.dir.join(&name) {
            log::info!("Saved {:?} as {}", upload.filename, path.display());
        }

        if HeaderParser::probe(&upload.bytes) {
            return Ok(true);
        }
        if !name.to_ascii_lowercase().ends_with(".zip") {
            log::debug!("{name} is not DICOM");
            return Ok(false);
        }

        match self.expand_archive(&path) {
            Ok(count) => {
                log::info!("Expanded {name}: {count} files");
                Ok(true)
            }
            Err(err) => {
                log::warn!("Error extracting zip file {name}: {err}");
                Ok(false)
            }
        }
    }

    fn expand_archive(&self, archive_path: &Path) -> Result<usize, BatchError> {
        let file = File::open(archive_path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;
        let mut extracted = 0;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let Some(relative) = entry.enclosed_name() else {
                log::warn!("Skipping archive entry outside the batch: {}", entry.name());
                continue;
            };
            let target = self.dir.join(&relative);

            if entry.is_dir() {
                fs::create_dir_all(&target)?;
                continue;
            }
            let (Some(parent), Some(name)) = (target.parent(), target.file_name()) else {
                continue;
            };
            fs::create_dir_all(parent)?;
            let (_, mut output) = create_unique(parent, &name.to_string_lossy())?;
            io::copy(&mut entry, &mut output)?;
            extracted += 1;
        }

        Ok(extracted)
    }
}

/// Creates `dir/name`, or `dir/<stem>_<n>.<ext>` with the lowest free `n`
/// when the name is taken. Existing files are never overwritten.
fn create_unique(dir: &Path, name: &str) -> io::Result<(PathBuf, File)> {
    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
        _ => (name, None),
    };

    let mut candidate = name.to_string();
    let mut n = 0u32;
    loop {
        let path = dir.join(&candidate);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {}
            Err(err) => return Err(err),
        }
        n += 1;
        candidate = match extension {
            Some(extension) => format!("{stem}_{n}.{extension}"),
            None => format!("{stem}_{n}"),
        };
    }
}

/// Reduces an uploaded file name to a safe basename.
pub fn secure_filename(filename: &str) -> Option<String> {
    let basename = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = basename
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_');
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}
