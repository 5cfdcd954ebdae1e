const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// What the analysis page shows besides the upload form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageView {
    pub rmsd_plot: Option<String>,
    pub rmsf_plot: Option<String>,
    pub error: Option<String>,
}

impl PageView {
    pub fn with_plots(rmsd_plot: String, rmsf_plot: String) -> Self {
        Self {
            rmsd_plot: Some(rmsd_plot),
            rmsf_plot: Some(rmsf_plot),
            error: None,
        }
    }

    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders the full page. Plot fragments are inserted verbatim; the error
/// message is escaped.
pub fn render(view: &PageView) -> String {
    let error = view
        .error
        .as_deref()
        .map(|message| format!(r#"<div class="error">{}</div>"#, escape_html(message)))
        .unwrap_or_default();

    let plots: String = [&view.rmsd_plot, &view.rmsf_plot]
        .into_iter()
        .flatten()
        .map(|fragment| format!("<section class=\"plot\">\n{}\n</section>\n", fragment))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Trajectory RMSD / RMSF Analysis</title>
<script src="{plotly}" charset="utf-8"></script>
<style>
  body {{ font-family: sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; }}
  form {{ display: grid; gap: 0.75rem; margin-bottom: 2rem; }}
  .error {{ color: #b00020; background: #fdecea; padding: 0.75rem; border-radius: 4px; }}
  .plot {{ margin-top: 1.5rem; }}
</style>
</head>
<body>
<h1>Trajectory RMSD / RMSF Analysis</h1>
<form action="/analyze" method="post" enctype="multipart/form-data">
  <label>Reference structure (PDB) <input type="file" name="pdb_file" accept=".pdb" required></label>
  <label>Trajectory (DCD) <input type="file" name="dcd_file" accept=".dcd" required></label>
  <button type="submit">Analyze</button>
</form>
{error}
{plots}</body>
</html>
"#,
        plotly = PLOTLY_CDN,
        error = error,
        plots = plots,
    )
}
