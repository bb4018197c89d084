use std::{collections::BTreeMap, path::Path};

use anyhow::Context;
use compress_io::compress::CompressIo;
use utils::get_next_line;

/// Read a QualiMap coverage histogram: one header line, then two white space
/// separated columns (coverage depth, genome bin count).  Depths are rounded
/// to integer keys; a repeated depth overwrites the earlier entry.
pub fn read_coverage_histogram(p: &Path) -> anyhow::Result<BTreeMap<u64, f64>> {
    let mut hist = BTreeMap::new();

    trace!("Opening coverage histogram {} for reading", p.display());
    let mut rdr = CompressIo::new()
        .path(p)
        .bufreader()
        .with_context(|| format!("Could not open coverage histogram {}", p.display()))?;

    trace!("Reading from {}", p.display());
    let mut buf = String::new();
    let mut line = 0;

    while let Some(fields) = get_next_line(&mut rdr, &mut buf)
        .with_context(|| format!("Error after reading {} lines from {}", line, p.display()))?
    {
        line += 1;
        // First line is the column header; skip blank lines
        if line == 1 || fields.is_empty() {
            continue;
        }
        if fields.len() < 2 {
            return Err(anyhow!(
                "{}:{} Short line in coverage histogram",
                p.display(),
                line
            ));
        }
        let cov = fields[0]
            .parse::<f64>()
            .with_context(|| format!("{}:{} Error reading coverage depth", p.display(), line))?
            .round() as u64;
        let n = fields[1]
            .parse::<f64>()
            .with_context(|| format!("{}:{} Error reading bin count", p.display(), line))?;
        hist.insert(cov, n);
    }

    debug!(
        "Finished reading {}; {} distinct coverage depths",
        p.display(),
        hist.len()
    );

    Ok(hist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parse_histogram() {
        let tmp = TempDir::new().unwrap();
        let p = tmp.path().join("coverage_histogram.txt");
        fs::write(
            &p,
            "#Coverage\tNumber of genomic locations\n0\t1045.0\n1\t20873.0\n2.0\t31902.0\n",
        )
        .unwrap();

        let h = read_coverage_histogram(&p).unwrap();
        assert_eq!(h.len(), 3);
        assert_eq!(h[&0], 1045.0);
        assert_eq!(h[&1], 20873.0);
        assert_eq!(h[&2], 31902.0);
    }

    #[test]
    fn fractional_depths_rounded_last_wins() {
        let tmp = TempDir::new().unwrap();
        let p = tmp.path().join("coverage_histogram.txt");
        fs::write(&p, "#Coverage\tCount\n3.4\t10.0\n2.6\t7.0\n").unwrap();

        // Both depths round to 3, so the later line replaces the earlier one
        let h = read_coverage_histogram(&p).unwrap();
        assert_eq!(h.len(), 1);
        assert_eq!(h[&3], 7.0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(read_coverage_histogram(&tmp.path().join("nonexistent")).is_err());
    }

    #[test]
    fn corrupt_line_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let p = tmp.path().join("coverage_histogram.txt");
        fs::write(&p, "#Coverage\tCount\n1\tnot_a_number\n").unwrap();
        assert!(read_coverage_histogram(&p).is_err());

        fs::write(&p, "#Coverage\tCount\n42\n").unwrap();
        assert!(read_coverage_histogram(&p).is_err());
    }
}
