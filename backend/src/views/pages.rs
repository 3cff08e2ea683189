use shared::{DiseaseLabel, PredictionResult};
use strum::IntoEnumIterator;
use url::form_urlencoded;

use super::{escape_html, layout};

/// A classification to show on the landing page.
#[derive(Debug, Clone)]
pub struct ResultView {
    pub prediction: PredictionResult,
    pub image_url: String,
    pub filename: String,
}

impl ResultView {
    pub fn report_url(&self) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("prediction", self.prediction.label.as_ref())
            .append_pair("confidence", &self.prediction.confidence.to_string())
            .append_pair("filename", &self.filename)
            .finish();
        format!("/download_report?{}", query)
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndexContext {
    pub flashes: Vec<String>,
    pub result: Option<ResultView>,
}

pub fn index(context: &IndexContext) -> String {
    let flashes: String = context
        .flashes
        .iter()
        .map(|message| format!(r#"<div class="flash">{}</div>"#, escape_html(message)))
        .collect();

    let result = context
        .result
        .as_ref()
        .map(|result| {
            format!(
                r#"<section class="result">
<h2>Result</h2>
<img src="{image_url}" alt="Uploaded image">
<p><strong>Prediction:</strong> {label}</p>
<p><strong>Confidence:</strong> {confidence}%</p>
<p><a href="{report_url}">Download PDF report</a></p>
</section>"#,
                image_url = escape_html(&result.image_url),
                label = escape_html(result.prediction.label.as_ref()),
                confidence = result.prediction.confidence,
                report_url = escape_html(&result.report_url()),
            )
        })
        .unwrap_or_default();

    let body = format!(
        r#"<h1>Poultry Disease Detection</h1>
{flashes}
<section>
<p>Upload a photo of poultry droppings to screen for Coccidiosis, Newcastle disease or Salmonella.</p>
<form action="/upload" method="post" enctype="multipart/form-data">
<input type="file" name="file" accept="image/png,image/jpeg,image/gif">
<button type="submit">Analyze</button>
</form>
</section>
{result}
<section>
<h2>Research</h2>
<form action="/research" method="get">
<input type="text" name="query" placeholder="e.g. Newcastle Disease">
<button type="submit">Search</button>
</form>
</section>"#
    );
    layout("Home", &body)
}

pub fn training() -> String {
    let rows: String = DiseaseLabel::iter()
        .filter_map(|label| label.info().map(|info| (label, info)))
        .map(|(label, info)| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(label.as_ref()),
                escape_html(info.symptoms),
                escape_html(info.treatment),
                escape_html(info.management),
            )
        })
        .collect();

    let body = format!(
        r#"<h1>Training Materials</h1>
<p>Reference notes for the diseases the classifier screens for.</p>
<table>
<thead><tr><th>Disease</th><th>Symptoms</th><th>Treatment</th><th>Management</th></tr></thead>
<tbody>
{rows}</tbody>
</table>"#
    );
    layout("Training", &body)
}

pub fn contact() -> String {
    layout(
        "Contact",
        r#"<h1>Contact</h1>
<p>For questions about a diagnosis, contact your local veterinary office.</p>
<p>For questions about this tool, reach the maintainers through the project repository.</p>"#,
    )
}

pub fn about() -> String {
    layout(
        "About",
        r#"<h1>About</h1>
<p>This tool classifies poultry images into four categories: Coccidiosis, Healthy, Newcastle and Salmonella.</p>
<p>Predictions come from a pre-trained image classifier and are a screening aid, not a veterinary diagnosis.</p>"#,
    )
}

pub fn error_page(status: u16, message: &str) -> String {
    let body = format!(
        r#"<h1>Something went wrong ({status})</h1>
<p>{}</p>
<p><a href="/">Back to the home page</a></p>"#,
        escape_html(message)
    );
    layout("Error", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> ResultView {
        ResultView {
            prediction: PredictionResult {
                label: DiseaseLabel::Healthy,
                confidence: 98.5,
            },
            image_url: "/static/uploads/sample.jpg".into(),
            filename: "sample.jpg".into(),
        }
    }

    #[test]
    fn report_url_carries_the_prediction() {
        assert_eq!(
            sample_result().report_url(),
            "/download_report?prediction=Healthy&confidence=98.5&filename=sample.jpg"
        );
    }

    #[test]
    fn index_shows_flashes_and_result() {
        let html = index(&IndexContext {
            flashes: vec!["No file selected.".into()],
            result: Some(sample_result()),
        });
        assert!(html.contains(r#"<div class="flash">No file selected.</div>"#));
        assert!(html.contains("<strong>Prediction:</strong> Healthy"));
        assert!(html.contains("98.5%"));
        assert!(html.contains("/download_report?prediction=Healthy&amp;confidence=98.5"));
    }

    #[test]
    fn training_lists_only_diseases() {
        let html = training();
        assert!(html.contains("<td>Coccidiosis</td>"));
        assert!(html.contains("Vaccination, biosecurity measures"));
        assert!(!html.contains("<td>Healthy</td>"));
    }

    #[test]
    fn error_page_escapes_message() {
        let html = error_page(400, "bad <input>");
        assert!(html.contains("bad &lt;input&gt;"));
        assert!(html.contains("(400)"));
    }
}
