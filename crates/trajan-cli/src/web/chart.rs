//! Plotly.js figures for the analysis page.
//!
//! Figures are serialized with `serde_json` and embedded as a `<div>` plus an
//! inline script that draws into it; the page loads Plotly.js once.

use serde::Serialize;

#[derive(Debug, Serialize)]
struct Title<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Axis<'a> {
    title: Title<'a>,
}

#[derive(Debug, Serialize)]
struct Layout<'a> {
    title: Title<'a>,
    xaxis: Axis<'a>,
    yaxis: Axis<'a>,
}

#[derive(Debug, Serialize)]
struct Trace<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    x: Vec<usize>,
    y: &'a [f64],
    mode: &'static str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct Figure<'a> {
    data: Vec<Trace<'a>>,
    layout: Layout<'a>,
}

/// A single-trace scatter chart.
#[derive(Debug)]
pub struct Chart<'a> {
    div_id: &'static str,
    figure: Figure<'a>,
}

impl<'a> Chart<'a> {
    fn line(
        div_id: &'static str,
        x: Vec<usize>,
        y: &'a [f64],
        mode: &'static str,
        name: &'a str,
        labels: [&'a str; 3],
    ) -> Self {
        let [title, x_title, y_title] = labels;
        Self {
            div_id,
            figure: Figure {
                data: vec![Trace {
                    kind: "scatter",
                    x,
                    y,
                    mode,
                    name,
                }],
                layout: Layout {
                    title: Title { text: title },
                    xaxis: Axis {
                        title: Title { text: x_title },
                    },
                    yaxis: Axis {
                        title: Title { text: y_title },
                    },
                },
            },
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.figure)
    }

    /// Renders the chart as an HTML fragment.
    pub fn to_html(&self) -> serde_json::Result<String> {
        // A literal "</" would end the surrounding script element early.
        let figure = self.to_json()?.replace("</", "<\\/");
        Ok(format!(
            r#"<div id="{id}" class="plotly-graph-div" style="height:450px; width:100%;"></div>
<script type="text/javascript">
  (function () {{
    var figure = {figure};
    Plotly.newPlot("{id}", figure.data, figure.layout, {{"responsive": true}});
  }})();
</script>"#,
            id = self.div_id,
            figure = figure,
        ))
    }
}

/// RMSD against frame number, frames counted from 1.
pub fn rmsd_chart(rmsd: &[f64]) -> Chart<'_> {
    Chart::line(
        "rmsd-plot",
        (1..=rmsd.len()).collect(),
        rmsd,
        "lines",
        "RMSD",
        ["RMSD (Cα)", "Frame", "RMSD (Å)"],
    )
}

/// RMSF against residue identifier.
pub fn rmsf_chart<'a>(residue_ids: &[usize], rmsf: &'a [f64]) -> Chart<'a> {
    Chart::line(
        "rmsf-plot",
        residue_ids.to_vec(),
        rmsf,
        "lines+markers",
        "RMSF (Cα)",
        ["RMSF Profile (Cα)", "Residue ID", "RMSF (Å)"],
    )
}
