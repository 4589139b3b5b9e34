//! HTML pages for the certificate form and its results.

use super::models::IssueReport;

pub const CONTRACT_TYPES: [&str; 4] = [
    "Obra o Labor",
    "Término Fijo",
    "Término Indefinido",
    "Prestación de Servicios",
];

const STYLE: &str = r#"
body { font-family: Arial, sans-serif; background-color: #f5f5f5; margin: 0; padding: 40px 20px; display: flex; justify-content: center; }
.container { background-color: white; max-width: 700px; width: 100%; padding: 30px 40px; border-radius: 10px; box-shadow: 0 4px 20px rgba(0,0,0,0.1); }
h1 { color: #4CAF50; font-size: 28px; text-align: center; }
h1.failed { color: #d32f2f; }
.summary { color: #555; font-size: 18px; text-align: center; }
label { display: block; margin-top: 16px; color: #333; font-weight: bold; }
input, select { width: 100%; padding: 10px; margin-top: 6px; box-sizing: border-box; }
ul { list-style-type: none; padding: 0; }
li { display: flex; align-items: center; padding: 15px; margin-bottom: 15px; border-radius: 8px; border: 1px solid #ddd; }
li.success { border-left: 5px solid #4CAF50; }
li.error { border-left: 5px solid #d32f2f; background-color: #ffebee; }
.details { display: flex; flex-direction: column; flex-grow: 1; }
.details span { color: #777; font-size: 13px; word-break: break-all; }
.download-link { background-color: #e8f5e8; color: #4CAF50; padding: 8px 15px; border-radius: 20px; text-decoration: none; font-weight: bold; }
.btn { display: inline-block; margin-top: 30px; background-color: #4CAF50; color: white; padding: 12px 30px; border: none; border-radius: 5px; font-size: 16px; text-decoration: none; cursor: pointer; }
"#;

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n<div class=\"container\">\n{}\n</div>\n</body>\n</html>\n",
        escape_html(title),
        STYLE,
        body
    )
}

/// Form asking for the ID, contract type and optional salary.
pub fn render_form() -> String {
    let options: String = CONTRACT_TYPES
        .iter()
        .map(|t| format!("<option value=\"{0}\">{0}</option>", escape_html(t)))
        .collect();

    page(
        "Certificados Laborales",
        &format!(
            r#"<h1>Certificados Laborales</h1>
<form method="post" action="/generate">
<label for="national_id">Cédula</label>
<input id="national_id" name="national_id" required>
<label for="contract_type">Tipo de contrato</label>
<select id="contract_type" name="contract_type">{options}</select>
<label for="salary_override">Salario (opcional)</label>
<input id="salary_override" name="salary_override" placeholder="$1.300.000">
<button class="btn" type="submit">Generar certificados</button>
</form>"#
        ),
    )
}

/// One entry per employer attempted, successes with a link.
pub fn render_results(report: &IssueReport) -> String {
    let success_count = report.success_count();
    let items: String = report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.link {
            Some(link) => format!(
                "<li class=\"success\"><div class=\"details\"><strong>{}</strong><span>{}</span></div><a href=\"{}\" target=\"_blank\" class=\"download-link\">Ver / Descargar</a></li>\n",
                escape_html(&outcome.employer),
                escape_html(&outcome.filename),
                escape_html(link)
            ),
            None => format!(
                "<li class=\"error\"><div class=\"details\"><strong>{}</strong><span>{}</span><span>{}</span></div></li>\n",
                escape_html(&outcome.employer),
                escape_html(&outcome.filename),
                escape_html(outcome.error.as_deref().unwrap_or("Error"))
            ),
        })
        .collect();

    let (heading_class, heading) = if success_count == 0 {
        ("failed", "No se pudo generar ningún certificado")
    } else {
        ("", "Proceso Completado")
    };

    page(
        "Certificados Generados",
        &format!(
            "<h1 class=\"{heading_class}\">{heading}</h1>\n<p class=\"summary\">Se generaron <strong>{success_count}</strong> certificados con éxito.</p>\n<ul>\n{items}</ul>\n<a href=\"/\" class=\"btn\">Generar Otros Certificados</a>"
        ),
    )
}
