use std::{
    collections::{hash_map::Entry, HashMap},
    io::BufRead,
    path::{Path, PathBuf},
};

use anyhow::Context;
use compress_io::compress::CompressIo;
use regex::Regex;

// A directory is accepted as a QualiMap BamQC result directory when it
// contains both the results file and the raw data subdirectory
const RESULTS_FILE: &str = "genome_results.txt";
const RAW_DATA_DIR: &str = "raw_data_qualimapReport";
const IMAGES_DIR: &str = "images_qualimapReport";

pub struct Sample {
    name: String,
    reports: HashMap<String, PathBuf>,
    plots: HashMap<String, PathBuf>,
}

impl Sample {
    fn new(name: String) -> Self {
        Self {
            name,
            reports: HashMap::new(),
            plots: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of a raw data file, keyed on file name without extension
    pub fn report_path(&self, key: &str) -> Option<&Path> {
        self.reports.get(key).map(|x| x.as_path())
    }

    /// Path of an image file, keyed on file name without extension
    pub fn plot_path(&self, key: &str) -> Option<&Path> {
        self.plots.get(key).map(|x| x.as_path())
    }
}

/// Walk the directory tree under root (following symlinks) collecting all
/// QualiMap BamQC result directories.  It is an error if none are found.
pub fn find_qc_reports(root: &Path) -> anyhow::Result<Vec<Sample>> {
    debug!("Scanning {} for QualiMap result directories", root.display());

    let reg = Regex::new(r"bam file\s*=\s*(.*\S)")?;
    let mut samples = Vec::new();
    let mut idx: HashMap<String, usize> = HashMap::new();
    scan_dir(root, &reg, &mut samples, &mut idx)?;

    if samples.is_empty() {
        Err(anyhow!("No QualiMap reports found in {}", root.display()))
    } else {
        Ok(samples)
    }
}

fn scan_dir(
    dir: &Path,
    reg: &Regex,
    samples: &mut Vec<Sample>,
    idx: &mut HashMap<String, usize>,
) -> anyhow::Result<()> {
    let results = dir.join(RESULTS_FILE);
    if results.is_file() && dir.join(RAW_DATA_DIR).is_dir() {
        if let Some(s) = read_sample(dir, &results, reg)? {
            match idx.entry(s.name.clone()) {
                Entry::Occupied(e) => {
                    debug!("Duplicate sample name found! Overwriting: {}", s.name);
                    samples[*e.get()] = s;
                }
                Entry::Vacant(e) => {
                    e.insert(samples.len());
                    samples.push(s);
                }
            }
        }
    }

    for f in dir
        .read_dir()
        .with_context(|| format!("Error checking directory {}", dir.display()))?
    {
        let entry =
            f.with_context(|| format!("Could not get directory entry from {}", dir.display()))?;
        let path = entry.path();
        // is_dir() resolves symlinks, so linked result directories are picked up
        if path.is_dir() {
            scan_dir(&path, reg, samples, idx)?
        }
    }

    Ok(())
}

/// Read the results file to get the sample name, then index the raw data and
/// image files for the sample.  Returns None if no BAM file entry was present.
fn read_sample(dir: &Path, results: &Path, reg: &Regex) -> anyhow::Result<Option<Sample>> {
    trace!("Reading sample metadata from {}", results.display());
    let mut rdr = CompressIo::new()
        .path(results)
        .bufreader()
        .with_context(|| format!("Could not open results file {}", results.display()))?;

    let mut buf = String::new();
    let mut name = None;
    loop {
        buf.clear();
        if rdr
            .read_line(&mut buf)
            .with_context(|| format!("Error reading from {}", results.display()))?
            == 0
        {
            break;
        }
        // Last matching entry wins
        if let Some(c) = reg.captures(&buf) {
            name = Some(clean_sample_name(c.get(1).unwrap().as_str()));
        }
    }

    let name = match name {
        Some(s) => s,
        None => {
            warn!(
                "No bam file entry in {}; skipping directory",
                results.display()
            );
            return Ok(None);
        }
    };

    let mut s = Sample::new(name);
    s.reports = list_resources(&dir.join(RAW_DATA_DIR))?;

    let images = dir.join(IMAGES_DIR);
    if images.is_dir() {
        s.plots = list_resources(&images)?;
    } else {
        debug!("No image directory for sample {}", s.name);
    }

    debug!(
        "Found sample {} with {} raw data files and {} images",
        s.name,
        s.reports.len(),
        s.plots.len()
    );

    Ok(Some(s))
}

/// Derive a sample name from the BAM file path recorded in the results file
fn clean_sample_name(path: &str) -> String {
    let base = Path::new(path.trim())
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.trim().to_owned());
    for ext in [".bam", ".sam", ".cram"] {
        if let Some(s) = base.strip_suffix(ext) {
            return s.to_owned();
        }
    }
    base
}

/// List the plain files in a directory, keyed on file name with the final
/// extension stripped
fn list_resources(dir: &Path) -> anyhow::Result<HashMap<String, PathBuf>> {
    let mut h = HashMap::new();
    for f in dir
        .read_dir()
        .with_context(|| format!("Error checking directory {}", dir.display()))?
    {
        let entry =
            f.with_context(|| format!("Could not get directory entry from {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() {
            if let Some(key) = path.file_stem() {
                h.insert(key.to_string_lossy().into_owned(), path);
            }
        }
    }
    Ok(h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_result_dir(root: &Path, dir: &str, bam: &str) -> PathBuf {
        let d = root.join(dir);
        fs::create_dir_all(d.join(RAW_DATA_DIR)).unwrap();
        fs::create_dir_all(d.join(IMAGES_DIR)).unwrap();
        fs::write(
            d.join(RESULTS_FILE),
            format!(
                "BamQC report\n>>>>>>> Input\n\n     bam file = {}\n     number of windows = 400\n",
                bam
            ),
        )
        .unwrap();
        fs::write(
            d.join(RAW_DATA_DIR).join("coverage_histogram.txt"),
            "#Coverage\tNumber of genomic locations\n1\t100.0\n",
        )
        .unwrap();
        fs::write(
            d.join(IMAGES_DIR).join("genome_coverage_across_reference.png"),
            [0u8; 4],
        )
        .unwrap();
        d
    }

    #[test]
    fn locate_single_sample() {
        let tmp = TempDir::new().unwrap();
        let d = make_result_dir(tmp.path(), "run1", "/data/runs/s1.bam");

        let samples = find_qc_reports(tmp.path()).unwrap();
        assert_eq!(samples.len(), 1);
        let s = &samples[0];
        assert_eq!(s.name(), "s1");
        assert_eq!(
            s.report_path("coverage_histogram").unwrap(),
            d.join(RAW_DATA_DIR).join("coverage_histogram.txt")
        );
        assert_eq!(
            s.plot_path("genome_coverage_across_reference").unwrap(),
            d.join(IMAGES_DIR).join("genome_coverage_across_reference.png")
        );
    }

    #[test]
    fn no_reports_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("empty")).unwrap();
        assert!(find_qc_reports(tmp.path()).is_err());
    }

    #[test]
    fn duplicate_sample_name_overwrites() {
        let tmp = TempDir::new().unwrap();
        make_result_dir(tmp.path(), "run1", "/data/a/s1.bam");
        // Nested so it is always scanned after its parent
        let later = make_result_dir(tmp.path(), "run1/rerun", "/data/b/s1.bam");

        let samples = find_qc_reports(tmp.path()).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(
            samples[0].report_path("coverage_histogram").unwrap(),
            later.join(RAW_DATA_DIR).join("coverage_histogram.txt")
        );
    }

    #[test]
    fn results_without_bam_entry_skipped() {
        let tmp = TempDir::new().unwrap();
        make_result_dir(tmp.path(), "good", "/data/s2.bam");
        let bad = tmp.path().join("bad");
        fs::create_dir_all(bad.join(RAW_DATA_DIR)).unwrap();
        fs::write(bad.join(RESULTS_FILE), "no input section here\n").unwrap();

        let samples = find_qc_reports(tmp.path()).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].name(), "s2");
    }

    #[test]
    fn missing_image_dir_gives_empty_plots() {
        let tmp = TempDir::new().unwrap();
        let d = make_result_dir(tmp.path(), "run1", "/data/s1.bam");
        fs::remove_dir_all(d.join(IMAGES_DIR)).unwrap();

        let samples = find_qc_reports(tmp.path()).unwrap();
        assert!(samples[0]
            .plot_path("genome_coverage_across_reference")
            .is_none());
    }

    #[test]
    fn sample_name_extension_stripped() {
        assert_eq!(clean_sample_name(" /data/runs/S3.cram "), "S3");
        assert_eq!(clean_sample_name("s4.bam"), "s4");
        assert_eq!(clean_sample_name("plain_name"), "plain_name");
    }
}
