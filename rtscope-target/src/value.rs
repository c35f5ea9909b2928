//! 評価結果テキストのデコード

use crate::SessionError;

/// 評価結果のテキストを u64 にパース
///
/// 10進数と 0x プレフィックス付きの16進数をサポートする。
/// gdb がポインタ値に付加する `<symbol>` 注釈や文字値の `'A'` 表記は無視する。
///
/// # Examples
/// ```
/// use rtscope_target::parse_value;
///
/// assert_eq!(parse_value("p", "0x1234").unwrap(), 0x1234);
/// assert_eq!(parse_value("p", "1234").unwrap(), 1234);
/// assert_eq!(parse_value("p", "0x20000a00 <wa_main>").unwrap(), 0x2000_0a00);
/// ```
pub fn parse_value(expr: &str, text: &str) -> Result<u64, SessionError> {
    let malformed = || SessionError::Malformed {
        expr: expr.to_string(),
        value: text.to_string(),
    };

    // 先頭のトークンだけが数値
    let token = text.split_whitespace().next().ok_or_else(malformed)?;

    if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).map_err(|_| malformed())
    } else {
        token.parse::<u64>().map_err(|_| malformed())
    }
}
