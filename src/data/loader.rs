// ============================================================
// Layer 4 — Image Loaders
// ============================================================
// Two ways to get labelled 28x28 grayscale images:
//
//   MnistSource — Burn's vision::MnistDataset. Downloads the
//                 MNIST archives into the Burn cache directory
//                 on first use, then reads them from disk.
//
//   IdxSource   — Reads the IDX files directly from a local
//                 directory. Fashion-MNIST ships in the same
//                 format, so this also covers that dataset and
//                 machines without network access.
//
// The IDX format (all integers big-endian):
//
//   images: magic 0x00000803 | count | rows | cols | count*rows*cols bytes
//   labels: magic 0x00000801 | count | count bytes
//
// Files may be gzip-compressed (.gz) as they are distributed;
// flate2 decompresses them in memory.
//
// Reference: Burn Book §4 (Datasets)
//            flate2 crate documentation

use anyhow::{bail, Context, Result};
use burn::data::dataset::{vision::MnistDataset, Dataset};
use flate2::read::GzDecoder;
use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use crate::domain::image::{ImageSample, Split};
use crate::domain::settings::DataSourceKind;
use crate::domain::traits::ImageSource;

const IDX_IMAGES_MAGIC: u32 = 0x0000_0803;
const IDX_LABELS_MAGIC: u32 = 0x0000_0801;

/// Pick the loader for a configured data source.
/// `data_dir` is only used by the IDX source.
pub fn open_source(kind: DataSourceKind, data_dir: &str, limit: Option<usize>) -> Box<dyn ImageSource> {
    match kind {
        DataSourceKind::Mnist => Box::new(MnistSource::new(limit)),
        DataSourceKind::Idx   => Box::new(IdxSource::new(data_dir, limit)),
    }
}

// ─── MnistSource ──────────────────────────────────────────────────────────────
/// MNIST through Burn's built-in dataset.
pub struct MnistSource {
    limit: Option<usize>,
}

impl MnistSource {
    pub fn new(limit: Option<usize>) -> Self {
        Self { limit }
    }
}

impl ImageSource for MnistSource {
    fn load(&self, split: Split) -> Result<Vec<ImageSample>> {
        tracing::info!("Loading MNIST {:?} split (downloaded on first use)", split);
        let dataset = match split {
            Split::Train => MnistDataset::train(),
            Split::Test  => MnistDataset::test(),
        };

        let take = self.limit.unwrap_or(usize::MAX);
        let samples: Vec<ImageSample> = dataset
            .iter()
            .take(take)
            .map(|item| {
                let height = item.image.len();
                let width  = item.image.first().map(|row| row.len()).unwrap_or(0);
                let pixels = item.image.iter().flat_map(|row| row.iter().copied()).collect();
                ImageSample::new(pixels, width, height, item.label)
            })
            .collect();

        if samples.is_empty() {
            bail!("MNIST {:?} split is empty", split);
        }
        Ok(samples)
    }

    fn describe(&self) -> String {
        "MNIST (burn vision dataset)".to_string()
    }
}

// ─── IdxSource ────────────────────────────────────────────────────────────────
/// IDX files from a local directory.
pub struct IdxSource {
    dir:   PathBuf,
    limit: Option<usize>,
}

impl IdxSource {
    pub fn new(dir: impl Into<PathBuf>, limit: Option<usize>) -> Self {
        Self { dir: dir.into(), limit }
    }

    /// Find `<stem>` or `<stem>.gz` in the data directory
    fn locate(&self, stem: &str) -> Result<PathBuf> {
        let plain = self.dir.join(stem);
        if plain.is_file() {
            return Ok(plain);
        }
        let gz = self.dir.join(format!("{stem}.gz"));
        if gz.is_file() {
            return Ok(gz);
        }
        bail!(
            "Cannot find '{}' (or its .gz) in '{}'",
            stem,
            self.dir.display()
        )
    }
}

impl ImageSource for IdxSource {
    fn load(&self, split: Split) -> Result<Vec<ImageSample>> {
        let prefix = match split {
            Split::Train => "train",
            Split::Test  => "t10k",
        };

        let images_path = self.locate(&format!("{prefix}-images-idx3-ubyte"))?;
        let labels_path = self.locate(&format!("{prefix}-labels-idx1-ubyte"))?;
        tracing::info!(
            "Reading IDX files '{}' and '{}'",
            images_path.display(),
            labels_path.display()
        );

        let images = parse_idx_images(&read_maybe_gz(&images_path)?)
            .with_context(|| format!("Invalid IDX image file '{}'", images_path.display()))?;
        let labels = parse_idx_labels(&read_maybe_gz(&labels_path)?)
            .with_context(|| format!("Invalid IDX label file '{}'", labels_path.display()))?;

        let mut samples = pair_images_with_labels(images, labels)?;
        if let Some(limit) = self.limit {
            samples.truncate(limit);
        }
        Ok(samples)
    }

    fn describe(&self) -> String {
        format!("IDX files in '{}'", self.dir.display())
    }
}

// ─── IDX Parsing ──────────────────────────────────────────────────────────────

/// Decoded IDX image file: `count` images of `rows x cols` bytes.
#[derive(Debug, Clone)]
pub struct IdxImages {
    pub rows:   usize,
    pub cols:   usize,
    pub pixels: Vec<Vec<u8>>,
}

/// Read a file, transparently gunzipping it when the name ends in .gz
fn read_maybe_gz(path: &Path) -> Result<Vec<u8>> {
    let raw = fs::read(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;

    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        let mut out = Vec::new();
        GzDecoder::new(raw.as_slice())
            .read_to_end(&mut out)
            .with_context(|| format!("Cannot decompress '{}'", path.display()))?;
        Ok(out)
    } else {
        Ok(raw)
    }
}

fn read_u32_be(bytes: &[u8], offset: usize) -> Result<u32> {
    let Some(chunk) = bytes.get(offset..offset + 4) else {
        bail!("IDX header truncated at byte {}", offset);
    };
    Ok(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
}

pub fn parse_idx_images(bytes: &[u8]) -> Result<IdxImages> {
    let magic = read_u32_be(bytes, 0)?;
    if magic != IDX_IMAGES_MAGIC {
        bail!("bad IDX image magic {:#010x}, expected {:#010x}", magic, IDX_IMAGES_MAGIC);
    }
    let count = read_u32_be(bytes, 4)? as usize;
    let rows  = read_u32_be(bytes, 8)? as usize;
    let cols  = read_u32_be(bytes, 12)? as usize;

    if rows == 0 || cols == 0 {
        bail!("IDX images must have non-zero dimensions, header says {}x{}", rows, cols);
    }
    let Some(needed) = rows.checked_mul(cols).and_then(|len| len.checked_mul(count)) else {
        bail!("IDX header is not plausible: {} images of {}x{}", count, rows, cols);
    };

    let image_len = rows * cols;
    let body      = &bytes[16..];
    if body.len() < needed {
        bail!(
            "IDX image payload truncated: header says {} images of {}x{} ({} bytes), found {} bytes",
            count, rows, cols, needed, body.len()
        );
    }

    let pixels = body
        .chunks_exact(image_len)
        .take(count)
        .map(|c| c.to_vec())
        .collect();

    Ok(IdxImages { rows, cols, pixels })
}

pub fn parse_idx_labels(bytes: &[u8]) -> Result<Vec<u8>> {
    let magic = read_u32_be(bytes, 0)?;
    if magic != IDX_LABELS_MAGIC {
        bail!("bad IDX label magic {:#010x}, expected {:#010x}", magic, IDX_LABELS_MAGIC);
    }
    let count = read_u32_be(bytes, 4)? as usize;
    let body  = &bytes[8..];
    if body.len() < count {
        bail!("IDX label payload truncated: expected {} labels, found {}", count, body.len());
    }
    Ok(body[..count].to_vec())
}

pub fn pair_images_with_labels(images: IdxImages, labels: Vec<u8>) -> Result<Vec<ImageSample>> {
    if images.pixels.len() != labels.len() {
        bail!(
            "image/label count mismatch: {} images, {} labels",
            images.pixels.len(),
            labels.len()
        );
    }

    let IdxImages { rows, cols, pixels } = images;
    Ok(pixels
        .into_iter()
        .zip(labels)
        .map(|(px, label)| {
            let px = px.into_iter().map(f32::from).collect();
            ImageSample::new(px, cols, rows, label)
        })
        .collect())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    fn idx_images(count: u32, rows: u32, cols: u32, fill: impl Fn(usize) -> u8) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&IDX_IMAGES_MAGIC.to_be_bytes());
        bytes.extend_from_slice(&count.to_be_bytes());
        bytes.extend_from_slice(&rows.to_be_bytes());
        bytes.extend_from_slice(&cols.to_be_bytes());
        let n = (count * rows * cols) as usize;
        bytes.extend((0..n).map(fill));
        bytes
    }

    fn idx_labels(labels: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&IDX_LABELS_MAGIC.to_be_bytes());
        bytes.extend_from_slice(&(labels.len() as u32).to_be_bytes());
        bytes.extend_from_slice(labels);
        bytes
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("mlp-walkthrough-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_parse_images() {
        let bytes  = idx_images(2, 2, 3, |i| i as u8);
        let images = parse_idx_images(&bytes).unwrap();
        assert_eq!(images.rows, 2);
        assert_eq!(images.cols, 3);
        assert_eq!(images.pixels.len(), 2);
        assert_eq!(images.pixels[1], vec![6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut bytes = idx_images(1, 2, 2, |_| 0);
        bytes[3] = 0x01;
        assert!(parse_idx_images(&bytes).is_err());
        // A label file is not an image file
        assert!(parse_idx_images(&idx_labels(&[1, 2])).is_err());
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let mut bytes = idx_images(3, 2, 2, |_| 0);
        bytes.truncate(bytes.len() - 1);
        assert!(parse_idx_images(&bytes).is_err());

        let mut labels = idx_labels(&[1, 2, 3]);
        labels.pop();
        assert!(parse_idx_labels(&labels).is_err());

        // Header itself cut short
        assert!(parse_idx_labels(&[0, 0, 8]).is_err());
    }

    #[test]
    fn test_implausible_header_rejected() {
        let mut huge = IDX_IMAGES_MAGIC.to_be_bytes().to_vec();
        for _ in 0..3 {
            huge.extend_from_slice(&u32::MAX.to_be_bytes());
        }
        assert!(parse_idx_images(&huge).is_err());

        let mut flat = IDX_IMAGES_MAGIC.to_be_bytes().to_vec();
        flat.extend_from_slice(&u32::MAX.to_be_bytes());
        flat.extend_from_slice(&0u32.to_be_bytes());
        flat.extend_from_slice(&28u32.to_be_bytes());
        assert!(parse_idx_images(&flat).is_err());
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let images = parse_idx_images(&idx_images(2, 1, 1, |_| 0)).unwrap();
        assert!(pair_images_with_labels(images, vec![1]).is_err());
    }

    #[test]
    fn test_idx_source_reads_plain_and_gz() {
        let dir = scratch_dir("idx-source");

        fs::write(
            dir.join("train-images-idx3-ubyte"),
            idx_images(3, 2, 2, |i| (i * 10) as u8),
        ).unwrap();
        fs::write(dir.join("train-labels-idx1-ubyte"), idx_labels(&[4, 5, 6])).unwrap();

        // Test split only exists compressed
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&idx_images(1, 2, 2, |_| 255)).unwrap();
        fs::write(dir.join("t10k-images-idx3-ubyte.gz"), enc.finish().unwrap()).unwrap();
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&idx_labels(&[9])).unwrap();
        fs::write(dir.join("t10k-labels-idx1-ubyte.gz"), enc.finish().unwrap()).unwrap();

        let source = IdxSource::new(&dir, Some(2));
        let train  = source.load(Split::Train).unwrap();
        assert_eq!(train.len(), 2);
        assert_eq!(train[1].label, 5);
        assert_eq!(train[1].pixels, vec![40.0, 50.0, 60.0, 70.0]);
        assert_eq!((train[0].width, train[0].height), (2, 2));

        let test = source.load(Split::Test).unwrap();
        assert_eq!(test.len(), 1);
        assert_eq!(test[0].label, 9);
        assert!(test[0].pixels.iter().all(|&p| p == 255.0));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_files_reported() {
        let dir = scratch_dir("idx-missing");
        let err = IdxSource::new(&dir, None).load(Split::Train).unwrap_err();
        assert!(err.to_string().contains("train-images-idx3-ubyte"));
        fs::remove_dir_all(&dir).ok();
    }
}
