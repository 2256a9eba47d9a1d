//! PDF 文本抓取 - 业务能力层
//!
//! 尽力而为：不是 PDF 解析器，只是把文件里能读的文字捞出来

use crate::error::{AppResult, ValidationError};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

pub const PDF_MIME: &str = "application/pdf";

static HORIZONTAL_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("literal regex"));

/// 从 PDF 文件内容中抓取文本，每行一道题
///
/// 先尝试直接按 UTF-8 解码；得不到可用内容时，
/// 退回到按字节解码并去掉不可打印字符
pub fn scrape_pdf_text(bytes: &[u8], mime: &str) -> AppResult<String> {
    if mime != PDF_MIME {
        return Err(ValidationError::NotPdf {
            mime: mime.to_string(),
        }
        .into());
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        if !text.chars().any(is_binary_noise) {
            let lines = clean_lines(text);
            if !lines.is_empty() {
                debug!("PDF 直接解码得到 {} 行", lines.len());
                return Ok(lines.join("\n"));
            }
        }
    }

    let printable: String = bytes
        .iter()
        .map(|&b| match b {
            b'\n' | b'\r' => '\n',
            0x20..=0x7e => b as char,
            _ => ' ',
        })
        .collect();
    let lines = clean_lines(&printable);

    info!("PDF 按字节抓取得到 {} 行（可能不完整）", lines.len());
    Ok(lines.join("\n"))
}

fn is_binary_noise(c: char) -> bool {
    c.is_control() && !matches!(c, '\n' | '\r' | '\t')
}

fn clean_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| HORIZONTAL_SPACE.replace_all(line.trim(), " ").into_owned())
        .filter(|line| line.chars().any(char::is_alphanumeric))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_pdf_mime() {
        let result = scrape_pdf_text(b"Convert 1/2 to a decimal", "text/plain");
        assert!(matches!(
            result,
            Err(crate::error::AppError::Validation(ValidationError::NotPdf { .. }))
        ));
    }

    #[test]
    fn test_plain_text_decodes_directly() {
        let text = scrape_pdf_text(
            b"Convert 3/4 to a decimal\n\n   What is   25% of 80?\n",
            PDF_MIME,
        )
        .unwrap();
        assert_eq!(text, "Convert 3/4 to a decimal\nWhat is 25% of 80?");
    }

    #[test]
    fn test_binary_falls_back_to_printable_bytes() {
        let mut bytes = b"%PDF-1.4\n".to_vec();
        bytes.extend_from_slice(&[0x00, 0xff, 0xfe, 0x01]);
        bytes.extend_from_slice(b"\nCalculate 10% of 200\n");
        bytes.extend_from_slice(&[0x9c, 0x80, b'\n']);

        let text = scrape_pdf_text(&bytes, PDF_MIME).unwrap();
        assert_eq!(text, "%PDF-1.4\nCalculate 10% of 200");
    }
}
