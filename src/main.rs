use std::{fs, path::PathBuf, process::ExitCode};

use clap::Parser;
use dicom_stack::{
    BatchStorage, Gallery, SourceBlob, ViewerConfig, batch::secure_filename, enums::TieBreak,
};

#[derive(Parser)]
#[command(
    name = "dicom-stack",
    version = env!("CARGO_PKG_VERSION"),
    about = "Groups DICOM files into series and renders each slice for stacked viewing",
    max_term_width = 80
)]
struct Cli {
    #[arg(required = true, help = "DICOM files or zip archives of DICOM files")]
    inputs: Vec<PathBuf>,

    #[arg(long, help = "Series Instance UID to display instead of the largest series")]
    series: Option<String>,

    #[arg(long, help = "Directory to write the rendered PNG frames of the selected series to")]
    out: Option<PathBuf>,

    #[arg(long, default_value = "uploads", help = "Root directory for batch storage")]
    upload_root: PathBuf,

    #[arg(long, default_value_t = false, help = "Break ties by discovery order instead of UID")]
    first_seen: bool,

    #[arg(long, default_value_t = false, help = "Keep the batch directory after the run")]
    keep: bool,
}

fn main() -> ExitCode {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .try_init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            log::error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let tie_break = if cli.first_seen {
        TieBreak::FirstSeen
    } else {
        TieBreak::LowestUid
    };
    let config = ViewerConfig::new()
        .with_upload_root(&cli.upload_root)
        .with_tie_break(tie_break);

    let uploads = cli
        .inputs
        .iter()
        .map(|path| {
            let bytes = fs::read(path).map_err(|err| format!("{}: {err}", path.display()))?;
            Ok(SourceBlob::new(path.to_string_lossy(), bytes))
        })
        .collect::<Result<Vec<_>, String>>()?;

    let mut batch = BatchStorage::create(&config.upload_root).map_err(|err| err.to_string())?;
    let result = show_batch(&mut batch, &uploads, cli, &config);

    if !cli.keep {
        batch.cleanup().map_err(|err| err.to_string())?;
    } else {
        println!("Batch kept at {}", batch.path().display());
    }
    result
}

fn show_batch(
    batch: &mut BatchStorage,
    uploads: &[SourceBlob],
    cli: &Cli,
    config: &ViewerConfig,
) -> Result<(), String> {
    let report = batch
        .ingest(uploads, config.max_upload_bytes)
        .map_err(|err| err.to_string())?;
    for name in &report.rejected {
        println!("Ignored {name}");
    }
    report.ensure_any().map_err(|err| err.to_string())?;

    let blobs = batch.load_blobs().map_err(|err| err.to_string())?;
    let gallery = Gallery::build(&blobs, cli.series.as_deref(), config);
    gallery.ensure_not_empty().map_err(|err| err.to_string())?;

    let catalog = &gallery.catalog;
    println!("{} series", catalog.total_series);
    for summary in &catalog.series_list {
        let marker = if Some(&summary.uid) == catalog.current_series_uid.as_ref() {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} #{:<4} {:<8} {:>4} images  {}  {}",
            summary.series_number,
            summary.modality,
            summary.image_count,
            summary.description,
            summary.uid
        );
    }

    println!();
    for (index, entry) in gallery.slices().iter().enumerate() {
        let record = &entry.record;
        println!(
            "{:>4}  {}  instance={} location={} z={}  {}x{}",
            index + 1,
            entry.frame.source_filename,
            record.instance_number,
            record.slice_location,
            record.image_position_patient[2],
            entry.frame.width,
            entry.frame.height
        );
    }

    if let Some(out) = &cli.out {
        fs::create_dir_all(out).map_err(|err| format!("{}: {err}", out.display()))?;
        for (index, entry) in gallery.slices().iter().enumerate() {
            let stem = secure_filename(&entry.frame.source_filename).unwrap_or_default();
            let path = out.join(format!("{:04}_{stem}.png", index + 1));
            fs::write(&path, &entry.frame.png)
                .map_err(|err| format!("{}: {err}", path.display()))?;
        }
        println!("Wrote {} frames to {}", gallery.slices().len(), out.display());
    }

    Ok(())
}
