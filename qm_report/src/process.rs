use crate::{
    config::Config,
    io,
    report::{self, Section, XyPlotConfig},
};

/// Strategy
///
/// For each located sample, parse the coverage histogram from its raw data
/// directory; samples without a coverage_histogram entry are skipped.  The
/// report section is only produced when at least one sample had data, and the
/// page is written once all sections have been built.
pub fn build_report(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting report generation");

    let mut sections = Vec::new();
    if let Some(s) = coverage_histogram_section(cfg)? {
        sections.push(s)
    }

    if sections.is_empty() {
        warn!("No report sections could be built from the located samples");
    }

    report::write_report(cfg, &sections)
}

fn coverage_histogram_section(cfg: &Config) -> anyhow::Result<Option<Section>> {
    let mut data = Vec::new();
    for s in cfg.sample_list() {
        if let Some(p) = s.report_path("coverage_histogram") {
            debug!("Reading coverage histogram for sample {}", s.name());
            let hist = match io::read_coverage_histogram(p) {
                Ok(h) => h,
                Err(e) => {
                    error!("Could not load input file: {}", p.display());
                    return Err(e);
                }
            };
            data.push((s.name().to_owned(), hist));
        }
    }

    if data.is_empty() {
        debug!("No samples with a coverage histogram");
        return Ok(None);
    }

    // Deterministic series order
    data.sort_by(|a, b| a.0.cmp(&b.0));

    let pconfig = XyPlotConfig {
        title: "Coverage Histogram",
        xlab: "Coverage (X)",
        ylab: "Genome Bin Counts",
        xmin: 0,
        ymin: 0,
        tt_label: "<b>{point.x}-X coverage </b>",
    };
    let content = report::plot_xy_data("qualimap_cov_hist", &data, &pconfig)?;

    Ok(Some(Section {
        name: "Coverage Histogram".to_owned(),
        anchor: "qualimap-coverage-histogram".to_owned(),
        content,
    }))
}
