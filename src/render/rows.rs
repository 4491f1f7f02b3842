//! Plain-text table of review rows.

use crate::constants::DISPLAY_COLUMNS;
use crate::table::ReviewRow;

fn cells(row: &ReviewRow) -> Vec<String> {
    vec![
        row.error_id.to_string(),
        row.grid_id.to_string(),
        row.image_name.clone(),
        row.grid_x.to_string(),
        row.grid_y.to_string(),
        row.label.to_string(),
        row.preds.to_string(),
        format!("{:.4}", row.scores),
        row.confmat_labels.clone(),
        row.label_new.to_string(),
    ]
}

/// Format rows as a header line plus one aligned line per row.
pub fn format_rows(rows: &[ReviewRow]) -> String {
    let body: Vec<Vec<String>> = rows.iter().map(cells).collect();

    let widths: Vec<usize> = DISPLAY_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, header)| {
            body.iter()
                .map(|cells| cells[i].len())
                .chain(std::iter::once(header.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:>width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let header: Vec<String> = DISPLAY_COLUMNS.iter().map(|s| s.to_string()).collect();
    let mut lines = vec![line(header.as_slice())];
    lines.extend(body.iter().map(|cells| line(cells.as_slice())));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ArtifactFlag;

    #[test]
    fn test_format_single_row() {
        let row = ReviewRow {
            error_id: 2,
            grid_id: 12,
            image_name: "img1".to_string(),
            grid_x: 400,
            grid_y: 0,
            label: ArtifactFlag::Artifact,
            preds: ArtifactFlag::NoArtifact,
            scores: 0.12345,
            confmat_labels: "FN".to_string(),
            label_new: ArtifactFlag::NoArtifact,
        };

        let text = format_rows(&[row]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].trim_start().starts_with("error_id"));
        assert!(lines[0].ends_with("label_new"));
        assert!(lines[1].contains("img1"));
        assert!(lines[1].contains("0.1235"));
        // Columns line up on their right edge
        assert_eq!(lines[0].len(), lines[1].len());
    }

    #[test]
    fn test_format_no_rows_is_header_only() {
        assert_eq!(format_rows(&[]).lines().count(), 1);
    }
}
