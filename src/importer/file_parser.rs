// ==========================================
// 企业定额匹配系统 - 文件解析器
// ==========================================
// 阶段 0: 把 Excel (.xlsx/.xls) / CSV (.csv) 读成
//         表头 → 值 的原始行记录，后续字段映射与此解耦
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Reader, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 原始行记录: 表头 → 单元格文本
pub type RawRow = HashMap<String, String>;

// ==========================================
// 按扩展名分派的统一入口
// ==========================================
pub fn parse_rows(file_path: &Path) -> ImportResult<Vec<RawRow>> {
    if !file_path.exists() {
        return Err(ImportError::FileNotFound(
            file_path.display().to_string(),
        ));
    }

    let ext = file_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => parse_csv(file_path),
        "xlsx" | "xls" => parse_excel(file_path),
        _ => Err(ImportError::UnsupportedFormat(ext)),
    }
}

// ==========================================
// CSV 解析
// ==========================================
fn parse_csv(file_path: &Path) -> ImportResult<Vec<RawRow>> {
    let file = File::open(file_path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // 允许行长度不一致
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row_map = RawRow::new();

        for (col_idx, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                row_map.insert(header.clone(), value.trim().to_string());
            }
        }

        // 跳过完全空白的行
        if row_map.values().all(|v| v.is_empty()) {
            continue;
        }

        records.push(row_map);
    }

    Ok(records)
}

// ==========================================
// Excel 解析（第一个工作表）
// ==========================================
fn parse_excel(file_path: &Path) -> ImportResult<Vec<RawRow>> {
    let mut workbook: Xlsx<_> = open_workbook(file_path)
        .map_err(|e: calamine::XlsxError| ImportError::ExcelParseError(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    if sheet_names.is_empty() {
        return Err(ImportError::ExcelParseError(
            "Excel 文件无工作表".to_string(),
        ));
    }

    let sheet_name = sheet_names[0].clone();
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

    // 第一行为表头
    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;

    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let mut records = Vec::new();
    for data_row in rows {
        let mut row_map = RawRow::new();

        for (col_idx, cell) in data_row.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                row_map.insert(header.clone(), cell.to_string().trim().to_string());
            }
        }

        if row_map.values().all(|v| v.is_empty()) {
            continue;
        }

        records.push(row_map);
    }

    Ok(records)
}
