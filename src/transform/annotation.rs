use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::entities::annotation::{
    DEFAULT_MAGNITUDE, DEFAULT_REPUTATION, DEFAULT_SUMMARY, DiseaseAnnotation,
};
use crate::utils::html;

const ROW_CLASS_PREFIX: &str = "row-";

static LABEL_RE: OnceLock<Regex> = OnceLock::new();

/// Parses every `row-*` row of a `Special:Ask` result table.
pub fn from_ask_table(page: &str) -> Vec<DiseaseAnnotation> {
    html::rows_with_class_prefix(page, ROW_CLASS_PREFIX)
        .into_iter()
        .map(from_row)
        .collect()
}

/// Parses one table row, substituting [`DiseaseAnnotation::parse_failure`]
/// for any row that does not have the expected shape.
pub fn from_row(row: &str) -> DiseaseAnnotation {
    match parse_row(row) {
        Ok(annotation) => annotation,
        Err(reason) => {
            warn!(reason, "Unparseable genotype row; using placeholder record");
            DiseaseAnnotation::parse_failure()
        }
    }
}

fn parse_row(row: &str) -> Result<DiseaseAnnotation, &'static str> {
    let cells = html::cells(row);
    let (label_cell, rest) = cells.split_first().ok_or("row has no cells")?;
    let label = html::first_anchor_title(label_cell).ok_or("label cell has no titled link")?;
    let (rsid, genotype) = split_label(&label).ok_or("label is not of the form rsid(genotype)")?;

    let [magnitude, reputation, summary] = match rest {
        [m, r, s, ..] => [*m, *r, *s],
        _ => return Err("row has fewer than four cells"),
    };

    Ok(DiseaseAnnotation {
        rsid: rsid.to_lowercase(),
        genotype: genotype.replace(';', ""),
        magnitude: cell_or(magnitude, DEFAULT_MAGNITUDE),
        reputation: cell_or(reputation, DEFAULT_REPUTATION),
        summary: cell_or(summary, DEFAULT_SUMMARY),
    })
}

/// Splits `Rs53576(A;G)` into `("Rs53576", "A;G")`.
fn split_label(label: &str) -> Option<(&str, &str)> {
    let re = LABEL_RE
        .get_or_init(|| Regex::new(r"^([^()]+)\(([^)]+)\)").expect("valid genotype label regex"));
    let caps = re.captures(label)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

fn cell_or(cell: &str, default: &str) -> String {
    let text = html::text(cell);
    if text.is_empty() {
        default.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, cells: &[&str]) -> String {
        let mut out = format!(r#"<td><a href="/index.php/{label}" title="{label}">{label}</a></td>"#);
        for cell in cells {
            out.push_str(&format!("<td>{cell}</td>"));
        }
        out
    }

    #[test]
    fn from_row_maps_trimmed_cells() {
        let out = from_row(&row(
            "Rs53576(A;G)",
            &["  2.5 ", "<span>Good</span>", " more empathic "],
        ));
        assert_eq!(
            out,
            DiseaseAnnotation {
                rsid: "rs53576".into(),
                genotype: "AG".into(),
                magnitude: "2.5".into(),
                reputation: "Good".into(),
                summary: "more empathic".into(),
            }
        );
    }

    #[test]
    fn from_row_applies_column_defaults_for_blank_cells() {
        let out = from_row(&row("I3000001(D;I)", &["  ", "", "&nbsp;"]));
        assert_eq!(out.rsid, "i3000001");
        assert_eq!(out.genotype, "DI");
        assert_eq!(out.magnitude, "1");
        assert_eq!(out.reputation, "");
        assert_eq!(out.summary, "");
    }

    #[test]
    fn from_row_ignores_cells_beyond_summary() {
        let out = from_row(&row("Rs1(C;C)", &["3", "Bad", "risk", "extra"]));
        assert_eq!(out.summary, "risk");
    }

    #[test]
    fn from_row_returns_placeholder_for_missing_cells() {
        let out = from_row(&row("Rs1(C;C)", &["3", "Bad"]));
        assert_eq!(out, DiseaseAnnotation::parse_failure());
    }

    #[test]
    fn from_row_returns_placeholder_for_unparseable_label() {
        let out = from_row(&row("Rs1", &["3", "Bad", "risk"]));
        assert_eq!(out, DiseaseAnnotation::parse_failure());
        assert_eq!(out.rsid, "none");
        assert_eq!(out.genotype, "none");
        assert_eq!(out.magnitude, "1");
    }

    #[test]
    fn from_row_returns_placeholder_for_missing_link() {
        let out = from_row("<td>Rs1(C;C)</td><td>3</td><td>Bad</td><td>risk</td>");
        assert_eq!(out, DiseaseAnnotation::parse_failure());
        assert_eq!(from_row(""), DiseaseAnnotation::parse_failure());
    }

    #[test]
    fn from_ask_table_keeps_row_order_and_placeholders() {
        let page = format!(
            r#"<table><tr><th>x</th></tr><tr class="row-odd">{}</tr><tr class="row-even"><td>broken</td></tr><tr class="row-odd">{}</tr></table>"#,
            row("Rs1(A;A)", &["4", "Bad", "a"]),
            row("Rs2(G;T)", &["2", "Good", "b"]),
        );
        let out = from_ask_table(&page);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].rsid, "rs1");
        assert_eq!(out[1], DiseaseAnnotation::parse_failure());
        assert_eq!(out[2].genotype, "GT");
    }

    #[test]
    fn split_label_requires_parenthesised_genotype() {
        assert_eq!(split_label("Rs1(A;T)"), Some(("Rs1", "A;T")));
        assert_eq!(split_label("Rs1()"), None);
        assert_eq!(split_label("(A;T)"), None);
    }
}
