// ==========================================
// 制作進行管理 - 卡号范围解析
// ==========================================
// 支持:
// - 范围: C001-C010 (按起点数字宽度补零)
// - 列表: C001,C003,C007
// - 单个: C042
// 列表项内不允许再写范围 (C001,C002-C005 整体报错)
// 红线: 解析失败整体报错,不做部分应用
// ==========================================

use thiserror::Error;

/// 单次范围允许展开的最大卡数
pub const MAX_RANGE_LEN: usize = 10_000;

/// 默认卡号前缀
const DEFAULT_PREFIX: &str = "C";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CutRangeError {
    #[error("卡号范围为空")]
    Empty,

    #[error("卡号缺少数字部分: {0}")]
    MissingDigits(String),

    #[error("卡号前缀不一致: {start} / {end}")]
    PrefixMismatch { start: String, end: String },

    #[error("范围起点大于终点: {start} > {end}")]
    Reversed { start: u64, end: u64 },

    #[error("范围过大: {len} 卡 (上限 {max})")]
    TooLarge { len: u64, max: usize },

    #[error("卡号范围格式错误: {0}")]
    Malformed(String),
}

/// 拆分卡号为 (前缀, 数字部分)
///
/// 数字部分从第一个数字开始取连续数字；其后若还有字符（如 C012A）视为格式错误
fn split_code(code: &str) -> Result<(&str, &str), CutRangeError> {
    let start = code
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| CutRangeError::MissingDigits(code.to_string()))?;
    let (prefix, digits) = code.split_at(start);
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(CutRangeError::Malformed(code.to_string()));
    }
    Ok((prefix, digits))
}

/// 解析卡号范围为卡号列表
pub fn parse_cut_range(spec: &str) -> Result<Vec<String>, CutRangeError> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(CutRangeError::Empty);
    }

    if spec.contains(',') {
        return spec
            .split(',')
            .map(|s| {
                let s = s.trim();
                if s.is_empty() {
                    Err(CutRangeError::Malformed(spec.to_string()))
                } else if s.contains('-') {
                    // 列表与范围不能混写
                    Err(CutRangeError::Malformed(s.to_string()))
                } else {
                    Ok(s.to_string())
                }
            })
            .collect();
    }

    match spec.matches('-').count() {
        0 => Ok(vec![spec.to_string()]),
        1 => parse_dash_range(spec),
        _ => Err(CutRangeError::Malformed(spec.to_string())),
    }
}

fn parse_dash_range(spec: &str) -> Result<Vec<String>, CutRangeError> {
    let (left, right) = spec
        .split_once('-')
        .ok_or_else(|| CutRangeError::Malformed(spec.to_string()))?;
    let (left, right) = (left.trim(), right.trim());
    if left.is_empty() || right.is_empty() {
        return Err(CutRangeError::Malformed(spec.to_string()));
    }

    let (prefix_start, num_start) = split_code(left)?;
    let (prefix_end, num_end) = split_code(right)?;

    // C001-010 允许终点省略前缀
    if !prefix_start.is_empty() && !prefix_end.is_empty() && prefix_start != prefix_end {
        return Err(CutRangeError::PrefixMismatch {
            start: prefix_start.to_string(),
            end: prefix_end.to_string(),
        });
    }
    let prefix = if !prefix_start.is_empty() {
        prefix_start
    } else if !prefix_end.is_empty() {
        prefix_end
    } else {
        DEFAULT_PREFIX
    };

    let start: u64 = num_start
        .parse()
        .map_err(|_| CutRangeError::Malformed(left.to_string()))?;
    let end: u64 = num_end
        .parse()
        .map_err(|_| CutRangeError::Malformed(right.to_string()))?;
    if start > end {
        return Err(CutRangeError::Reversed { start, end });
    }
    let len = end - start + 1;
    if len > MAX_RANGE_LEN as u64 {
        return Err(CutRangeError::TooLarge {
            len,
            max: MAX_RANGE_LEN,
        });
    }

    let width = num_start.len();
    Ok((start..=end)
        .map(|n| format!("{}{:0width$}", prefix, n, width = width))
        .collect())
}
