//! 表格导出（CSV / XLSX）

use actix_web::{HttpResponse, Result as ActixResult};
use rust_xlsxwriter::{Format, Workbook};
use tracing::error;

use crate::errors::{PreschoolError, Result};

/// 导出格式，未识别的取值按 CSV 处理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("xlsx") {
            Self::Xlsx
        } else {
            Self::Csv
        }
    }

    fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Cell::Number(f64::from(value))
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Empty, Into::into)
    }
}

/// 待导出的表格
#[derive(Debug, Clone)]
pub struct Table {
    pub file_stem: String,
    pub headers: &'static [&'static str],
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(file_stem: impl Into<String>, headers: &'static [&'static str]) -> Self {
        Self {
            file_stem: file_stem.into(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }
}

pub fn render_csv(table: &Table) -> Result<Vec<u8>> {
    let csv_error = |e: csv::Error| PreschoolError::export(format!("CSV write failed: {e}"));

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(table.headers).map_err(csv_error)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(Cell::as_text))
            .map_err(csv_error)?;
    }

    wtr.into_inner()
        .map_err(|e| PreschoolError::export(format!("CSV flush failed: {e}")))
}

pub fn render_xlsx(table: &Table) -> Result<Vec<u8>> {
    let xlsx_error =
        |e: rust_xlsxwriter::XlsxError| PreschoolError::export(format!("XLSX write failed: {e}"));

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header_format = Format::new().set_bold();

    for (col, header) in table.headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(xlsx_error)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(s) => {
                    worksheet.write_string(row_num, col, s).map_err(xlsx_error)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(row_num, col, *n).map_err(xlsx_error)?;
                }
                Cell::Empty => {}
            }
        }
    }

    workbook.save_to_buffer().map_err(xlsx_error)
}

/// 渲染为下载响应
pub fn into_response(format: ExportFormat, table: &Table) -> ActixResult<HttpResponse> {
    let rendered = match format {
        ExportFormat::Csv => render_csv(table),
        ExportFormat::Xlsx => render_xlsx(table),
    };

    let body = rendered.map_err(|e| {
        error!("Export of {} failed: {}", table.file_stem, e);
        actix_web::error::ErrorInternalServerError(e.to_string())
    })?;

    Ok(HttpResponse::Ok()
        .content_type(format.content_type())
        .insert_header((
            "Content-Disposition",
            format!(
                "attachment; filename=\"{}.{}\"",
                table.file_stem,
                format.extension()
            ),
        ))
        .body(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new("students", &["id", "name", "teacher_id"]);
        table.push(vec![1i64.into(), "Asha, K".into(), Some(3i64).into()]);
        table.push(vec![2i64.into(), "Ravi".into(), None::<i64>.into()]);
        table
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(ExportFormat::parse("xlsx"), ExportFormat::Xlsx);
        assert_eq!(ExportFormat::parse("XLSX"), ExportFormat::Xlsx);
        assert_eq!(ExportFormat::parse("csv"), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse("pdf"), ExportFormat::Csv);
    }

    #[test]
    fn test_render_csv() {
        let bytes = render_csv(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "id,name,teacher_id\n1,\"Asha, K\",3\n2,Ravi,\n");
    }

    #[test]
    fn test_render_xlsx_is_zip() {
        let bytes = render_xlsx(&sample()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_response_headers() {
        let resp = into_response(ExportFormat::Xlsx, &sample()).unwrap();
        let disposition = resp
            .headers()
            .get("Content-Disposition")
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(disposition, "attachment; filename=\"students.xlsx\"");
    }
}
