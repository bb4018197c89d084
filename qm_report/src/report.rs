use std::{collections::BTreeMap, fmt::Write as _, io::Write};

use anyhow::Context;
use compress_io::compress::CompressIo;
use serde::Serialize;

use crate::config::Config;

const INTRO: &str = "<p><a href=\"http://qualimap.bioinfo.cipf.es/\" target=\"_blank\">QualiMap</a> \
is a platform-independent application to facilitate the quality control of alignment \
sequencing data and its derivatives like feature counts.</p>";

/// One report section: rendered HTML plus the name and anchor used for
/// navigation
pub struct Section {
    pub name: String,
    pub anchor: String,
    pub content: String,
}

/// Configuration block passed to the embedded line graph helper.  Field names
/// follow the keys expected by the plotting script.
#[derive(Serialize)]
pub struct XyPlotConfig {
    pub title: &'static str,
    pub xlab: &'static str,
    pub ylab: &'static str,
    pub xmin: u64,
    pub ymin: u64,
    pub tt_label: &'static str,
}

#[derive(Serialize)]
struct XySeries<'a> {
    name: &'a str,
    data: Vec<(u64, f64)>,
}

/// Render an x/y line graph fragment: a placeholder div plus a script tag
/// carrying the JSON encoded per-sample series and the plot configuration
pub fn plot_xy_data(
    id: &str,
    data: &[(String, BTreeMap<u64, f64>)],
    pconfig: &XyPlotConfig,
) -> anyhow::Result<String> {
    let series: Vec<_> = data
        .iter()
        .map(|(name, d)| XySeries {
            name,
            data: d.iter().map(|(x, y)| (*x, *y)).collect(),
        })
        .collect();

    let mut html = String::new();
    writeln!(html, "<div id=\"{}\" class=\"hc-plot\"></div>", id)?;
    writeln!(html, "<script type=\"text/javascript\">")?;
    writeln!(
        html,
        "var {}_pconfig = {};",
        id,
        serde_json::to_string(pconfig)?
    )?;
    writeln!(
        html,
        "$(function () {{ plot_xy_line_graph(\"#{}\", {}, {}_pconfig); }});",
        id,
        serde_json::to_string(&series)?,
        id
    )?;
    writeln!(html, "</script>")?;

    Ok(html)
}

/// Assemble the full report page and write it to the configured output file,
/// or to stdout when none was given
pub fn write_report(cfg: &Config, sections: &[Section]) -> anyhow::Result<()> {
    let mut html = String::with_capacity(16 * 1024);

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\"/>")?;
    writeln!(html, "<title>QualiMap QC report</title>")?;
    writeln!(html, "<style>")?;
    writeln!(
        html,
        "body{{font-family:Arial,Helvetica,sans-serif;margin:20px;color:#222;background:#fff;}}"
    )?;
    writeln!(html, "h1{{margin:0 0 8px 0;font-size:24px;}}")?;
    writeln!(html, "h2{{margin:24px 0 8px 0;font-size:20px;}}")?;
    writeln!(
        html,
        ".meta{{color:#555;font-size:13px;margin-bottom:16px;}}"
    )?;
    writeln!(html, "nav ul{{list-style:none;margin:0;padding:0;}}")?;
    writeln!(html, "nav a{{color:#003366;text-decoration:none;}}")?;
    writeln!(
        html,
        ".section{{border-top:1px solid #eee;padding-top:8px;}}"
    )?;
    writeln!(html, ".hc-plot{{height:500px;margin:8px 0 6px 0;}}")?;
    writeln!(html, "</style>")?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;

    writeln!(html, "<h1>QualiMap QC report</h1>")?;
    writeln!(
        html,
        "<div class=\"meta\">Analysis directory: {}<br/>Samples: {}</div>",
        cfg.analysis_dir().display(),
        cfg.sample_list().len()
    )?;
    html.push_str(INTRO);
    html.push('\n');

    writeln!(html, "<nav><ul>")?;
    for s in sections {
        writeln!(html, "<li><a href=\"#{}\">{}</a></li>", s.anchor, s.name)?;
    }
    writeln!(html, "</ul></nav>")?;

    for s in sections {
        writeln!(html, "<section id=\"{}\" class=\"section\">", s.anchor)?;
        writeln!(html, "<h2>{}</h2>", s.name)?;
        html.push_str(&s.content);
        writeln!(html, "</section>")?;
    }

    writeln!(html, "</body></html>")?;

    let mut wrt = CompressIo::new()
        .opt_path(cfg.output_file())
        .bufwriter()
        .with_context(|| "Failed to open output file")?;
    wrt.write_all(html.as_bytes())
        .with_context(|| "Error writing report")?;

    Ok(())
}
