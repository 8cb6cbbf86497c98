use crate::error::PayloadError;
use std::fmt::Write;
use v_htmlescape::escape;

/// A tabular job result: one header row followed by body rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Splits `rows` into headers and body, keeping row and column order.
    ///
    /// Every body row is made as wide as the header: short rows are padded
    /// with empty cells and rows with extra cells are rejected.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Result<Self, PayloadError> {
        let mut rows = rows.into_iter();
        let headers = rows.next().ok_or(PayloadError::MissingRows)?;
        let width = headers.len();

        let rows = rows
            .enumerate()
            .map(|(i, mut row)| {
                if row.len() > width {
                    // Index into the payload, where the header is row 0.
                    return Err(PayloadError::InvalidRow(i + 1));
                }
                row.resize(width, String::new());
                Ok(row)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { headers, rows })
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn to_markup(&self) -> String {
        let mut markup = String::from("<table class=\"table table-striped\"><thead><tr>");
        for header in &self.headers {
            let _ = write!(markup, "<th>{}</th>", escape(header));
        }
        markup.push_str("</tr></thead><tbody>");
        for row in &self.rows {
            markup.push_str("<tr>");
            for cell in row {
                let _ = write!(markup, "<td>{}</td>", escape(cell));
            }
            markup.push_str("</tr>");
        }
        markup.push_str("</tbody></table>");
        markup
    }
}
