//! セル塗りつぶし色の抽出
//!
//! calamine は書式を返さないため、xlsx（zip）内の
//! workbook.xml / styles.xml / シートXMLを直接読んで
//! `(行, 列) → RGB` の対応表を作る。

use crate::error::{RosterError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Read, Seek};
use tracing::debug;
use zip::ZipArchive;

const FALLBACK_SHEET_PATH: &str = "xl/worksheets/sheet1.xml";

/// 先頭シートのセル塗りつぶし色（明示RGBのみ）
pub fn read_fill_colors<R: Read + Seek>(reader: R) -> Result<HashMap<(u32, u32), String>> {
    let mut archive =
        ZipArchive::new(reader).map_err(|e| RosterError::Style(format!("xlsxを開けません: {e}")))?;

    let sheet_path = first_sheet_path(&mut archive).unwrap_or_else(|| FALLBACK_SHEET_PATH.to_string());
    debug!(sheet_path, "シートXMLを特定");

    let Some(styles) = read_entry(&mut archive, "xl/styles.xml")? else {
        return Ok(HashMap::new());
    };
    let style_fills = parse_style_fills(&styles)?;

    let sheet = read_entry(&mut archive, &sheet_path)?
        .ok_or_else(|| RosterError::Style(format!("{sheet_path} が見つかりません")))?;
    let cell_styles = parse_cell_styles(&sheet)?;

    let fills = cell_styles
        .into_iter()
        .filter_map(|(cell, style)| {
            style_fills
                .get(style as usize)
                .cloned()
                .flatten()
                .map(|rgb| (cell, rgb))
        })
        .collect::<HashMap<_, _>>();

    debug!(cells = fills.len(), "塗りつぶしセルを取得");
    Ok(fills)
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(RosterError::Style(format!("{name}: {e}"))),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}

fn attribute(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

fn xml_error(name: &str, e: quick_xml::Error) -> RosterError {
    RosterError::Style(format!("{name} の解析エラー: {e}"))
}

/// workbook.xml と rels から先頭シートのパスを解決
fn first_sheet_path<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Option<String> {
    let workbook = read_entry(archive, "xl/workbook.xml").ok()??;
    let rels = read_entry(archive, "xl/_rels/workbook.xml.rels").ok()??;

    let mut reader = Reader::from_str(&workbook);
    reader.config_mut().trim_text(true);
    let relation_id = loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) if e.local_name().as_ref() == b"sheet" => {
                break attribute(&e, b"r:id")?;
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    };

    let mut reader = Reader::from_str(&rels);
    reader.config_mut().trim_text(true);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) if e.local_name().as_ref() == b"Relationship" => {
                if attribute(&e, b"Id").as_deref() == Some(relation_id.as_str()) {
                    return attribute(&e, b"Target").map(|target| resolve_target(&target));
                }
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// rels の Target を zip 内パスに変換
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

/// styles.xml → cellXfs の番号ごとの塗りつぶしRGB
fn parse_style_fills(xml: &str) -> Result<Vec<Option<String>>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut fills: Vec<Option<String>> = Vec::new();
    let mut cell_xfs: Vec<Option<usize>> = Vec::new();
    let mut in_fills = false;
    let mut in_cell_xfs = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"fills" => in_fills = true,
                b"cellXfs" => in_cell_xfs = true,
                b"fill" if in_fills => fills.push(None),
                b"xf" if in_cell_xfs => cell_xfs.push(fill_id(&e)),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"fill" if in_fills => fills.push(None),
                b"fgColor" if in_fills => {
                    if let (Some(current), Some(rgb)) = (fills.last_mut(), attribute(&e, b"rgb")) {
                        *current = Some(rgb);
                    }
                }
                b"xf" if in_cell_xfs => cell_xfs.push(fill_id(&e)),
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"fills" => in_fills = false,
                b"cellXfs" => in_cell_xfs = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("styles.xml", e)),
            _ => {}
        }
    }

    Ok(cell_xfs
        .into_iter()
        .map(|id| id.and_then(|id| fills.get(id).cloned().flatten()))
        .collect())
}

fn fill_id(e: &BytesStart) -> Option<usize> {
    attribute(e, b"fillId").and_then(|v| v.parse().ok())
}

/// シートXML → (行, 列) ごとのスタイル番号
fn parse_cell_styles(xml: &str) -> Result<Vec<((u32, u32), u32)>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut styles = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) if e.local_name().as_ref() == b"c" => {
                let cell = attribute(&e, b"r").and_then(|r| parse_cell_ref(&r));
                let style = attribute(&e, b"s").and_then(|s| s.parse::<u32>().ok());
                if let (Some(cell), Some(style)) = (cell, style) {
                    styles.push((cell, style));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("worksheet", e)),
            _ => {}
        }
    }

    Ok(styles)
}

/// `"B2"` → (2, 2)（1始まり）
pub fn parse_cell_ref(reference: &str) -> Option<(u32, u32)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let column = letters
        .chars()
        .try_fold(0u32, |acc, c| {
            acc.checked_mul(26)?
                .checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1)
        })?;
    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }

    Some((row, column))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), Some((1, 1)));
        assert_eq!(parse_cell_ref("B2"), Some((2, 2)));
        assert_eq!(parse_cell_ref("AF12"), Some((12, 32)));
        assert_eq!(parse_cell_ref("12"), None);
        assert_eq!(parse_cell_ref("B"), None);
        assert_eq!(parse_cell_ref("B0"), None);
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(resolve_target("/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
    }

    #[test]
    fn test_parse_style_fills() {
        let xml = r#"<?xml version="1.0"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fills count="4">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
    <fill><patternFill patternType="solid"><fgColor rgb="FFD9D9D9"/><bgColor indexed="64"/></patternFill></fill>
    <fill><patternFill patternType="solid"><fgColor theme="0"/></patternFill></fill>
  </fills>
  <cellStyleXfs count="1"><xf fillId="2"/></cellStyleXfs>
  <cellXfs count="3">
    <xf fillId="0"/>
    <xf fillId="2" applyFill="1"><alignment horizontal="center"/></xf>
    <xf fillId="3" applyFill="1"/>
  </cellXfs>
</styleSheet>"#;
        let fills = parse_style_fills(xml).unwrap();
        assert_eq!(fills, vec![None, Some("FFD9D9D9".to_string()), None]);
    }

    #[test]
    fn test_parse_cell_styles() {
        let xml = r#"<worksheet><sheetData>
  <row r="2"><c r="A2"/><c r="B2" s="1" t="s"><v>0</v></c><c r="C2" s="2"/></row>
</sheetData></worksheet>"#;
        let styles = parse_cell_styles(xml).unwrap();
        assert_eq!(styles, vec![((2, 2), 1), ((2, 3), 2)]);
    }
}
