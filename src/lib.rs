//! # DICOM-stack library
//!
//! This crate turns a batch of DICOM files into ordered series of display
//! frames, ready to be shown as stacks.
//!
//! This library builds on the dicom-rs ecosystem. A batch is one upload
//! session: its objects are probed, parsed and decoded, the raw samples are
//! normalized to 8 bit and rendered to PNG frames no larger than 800x600.
//! Rendered slices are grouped by Series Instance UID, ordered inside each
//! series and listed in a catalog from which one series is selected for
//! display. Objects that are not DICOM, carry no pixel data or have an
//! unusable sample layout are skipped; they never abort the batch.
//!
//! Slices are ordered by
//!  - Instance Number
//!  - Slice Location
//!  - the z component of Image Position (Patient)
//!
//! in that priority. DICOM files are assumed to have the following
//! attributes:
//!   - No multiframe (always the first frame is used)
//!   - Uncompressed or natively decodable pixel data
//!
//! # Examples
//!
//! ## Building a gallery from an upload session
//!
//! Save uploads into an isolated batch directory, display the default
//! series, then release the batch.
//!
//! ```no_run
//! # use dicom_stack::{BatchStorage, Gallery, SourceBlob, ViewerConfig};
//! let config = ViewerConfig::default();
//! let mut batch = BatchStorage::create(&config.upload_root)
//!     .expect("should have created batch directory");
//! let uploads = vec![SourceBlob::new("IM0001.dcm", std::fs::read("IM0001.dcm").unwrap())];
//! batch
//!     .ingest(&uploads, config.max_upload_bytes)
//!     .expect("should have saved uploads");
//!
//! let blobs = batch.load_blobs().expect("should have read batch files");
//! let gallery = Gallery::build(&blobs, None, &config);
//! for entry in gallery.slices() {
//!     println!("{} {}", entry.frame.source_filename, entry.record.instance_number);
//! }
//! batch.cleanup().expect("should have removed batch directory");
//! ```

pub mod batch;
pub mod catalog;
pub mod config;
pub mod enums;
pub mod error;
pub mod frame;
pub mod gallery;
pub mod header;
pub mod normalizer;
pub mod ordering;
pub mod record;
pub mod series;

pub use batch::{BatchStorage, IngestReport};
pub use catalog::SeriesCatalog;
pub use config::ViewerConfig;
pub use gallery::{Gallery, SourceBlob};
pub use record::{ImageRecord, SampleArray};
