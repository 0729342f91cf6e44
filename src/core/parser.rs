use crate::domain::model::{OrderLine, PackageCode, ParsedLine};
use crate::utils::error::{OrderError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// `PLAYER_ID IDENTIFIER CODE_GROUP`，恰好三個以空白分隔的欄位
static LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+(\S+)\s+(\S+)$").expect("valid line pattern"));

/// 切分出每一行訂單。
///
/// 換行與逗號都會分隔訂單；逗號後若只有單一代碼（沒有空白），
/// 視為前一行代碼群組的延續，例如 `111 222 wkp,86`。
pub fn split_lines(raw: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for row in raw.lines() {
        let mut row_started = false;
        for fragment in row.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            let continues_group = row_started && !fragment.contains(char::is_whitespace);
            match lines.last_mut() {
                Some(last) if continues_group => {
                    last.push(',');
                    last.push_str(fragment);
                }
                _ => lines.push(fragment.to_string()),
            }
            row_started = true;
        }
    }
    lines
}

/// 代碼群組可用 `+` 或 `,` 分隔，重複的代碼保留為獨立項目
pub fn parse_package_codes(group: &str) -> Vec<PackageCode> {
    group
        .split(['+', ','])
        .filter_map(PackageCode::new)
        .collect()
}

pub fn parse_line(line: &str) -> Result<ParsedLine> {
    let trimmed = line.trim();
    let caps = LINE_PATTERN
        .captures(trimmed)
        .ok_or_else(|| OrderError::InvalidLineFormat {
            line: trimmed.to_string(),
        })?;

    let raw_package_codes = caps[3].to_string();
    let codes = parse_package_codes(&raw_package_codes);
    if codes.is_empty() {
        return Err(OrderError::NoPackageCodes {
            line: trimmed.to_string(),
        });
    }

    Ok(ParsedLine {
        line: OrderLine {
            player_id: caps[1].to_string(),
            identifier: caps[2].to_string(),
            raw_package_codes,
            raw_text: trimmed.to_string(),
        },
        codes,
    })
}

/// 解析整段指令；遇到第一個不合法的行即失敗
pub fn parse_command(raw: &str) -> Result<Vec<ParsedLine>> {
    let lines = split_lines(raw);
    if lines.is_empty() {
        return Err(OrderError::EmptyCommand);
    }

    let parsed = lines
        .iter()
        .map(|line| parse_line(line))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!("Parsed {} order line(s)", parsed.len());
    Ok(parsed)
}
