//! 記録済みダンプを再生するセッション
//!
//! 実機のデバッガに接続せずに、事前に記録した式の評価結果とメモリ内容から
//! ターゲットを再現します。ダンプは1行1ディレクティブのテキスト形式です。
//!
//! ```text
//! # コメント
//! (uint32_t)&rlist = 0x20000800
//! @0x08001000 "main\0"
//! !halted
//! ```

use crate::{SessionError, TargetSession};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// メモリ文字列の終端バイト
const SENTINEL: u8 = 0;

/// ダンプ読み込みのエラー
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read replay dump: {0}")]
    Io(#[from] std::io::Error),

    #[error("replay dump line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

/// 記録済みの値を返すターゲットセッション
#[derive(Debug, Clone, Default)]
pub struct ReplaySession {
    /// 式 -> 評価結果テキスト
    values: HashMap<String, String>,
    /// 開始アドレス -> メモリ内容
    memory: BTreeMap<u64, Vec<u8>>,
    /// ターゲットが実行中かどうか
    running: bool,
    /// 発行されたリモート呼び出しの記録
    transcript: Vec<String>,
}

impl ReplaySession {
    /// 空のセッションを作成する（ターゲットは停止状態）
    pub fn new() -> Self {
        Self::default()
    }

    /// ダンプファイルからセッションを作成する
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ReplayError> {
        let text = fs::read_to_string(path)?;
        text.parse()
    }

    /// 式の評価結果を登録する
    pub fn with_value(mut self, expr: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_value(expr, value);
        self
    }

    /// メモリ内容を登録する
    pub fn with_memory(mut self, address: u64, bytes: impl Into<Vec<u8>>) -> Self {
        self.set_memory(address, bytes);
        self
    }

    /// 式の評価結果を登録（上書き）する
    pub fn set_value(&mut self, expr: impl Into<String>, value: impl Into<String>) {
        self.values.insert(expr.into().trim().to_string(), value.into());
    }

    /// 式の評価結果を削除する（以降その式の評価は失敗する）
    pub fn remove_value(&mut self, expr: &str) -> Option<String> {
        self.values.remove(expr.trim())
    }

    /// メモリ内容を登録（上書き）する
    pub fn set_memory(&mut self, address: u64, bytes: impl Into<Vec<u8>>) {
        self.memory.insert(address, bytes.into());
    }

    /// 実行状態を設定する
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// これまでに発行されたリモート呼び出しを順に返す
    ///
    /// 式の評価は式そのもの、メモリ読み取りは `@<address>` として記録される。
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// 呼び出し記録を消去する
    pub fn clear_transcript(&mut self) {
        self.transcript.clear();
    }

    /// 登録されている式の数
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// `address` を含むメモリ領域の、そのアドレス以降のバイト列
    fn bytes_at(&self, address: u64) -> Option<&[u8]> {
        let (start, bytes) = self.memory.range(..=address).next_back()?;
        let offset = usize::try_from(address - start).ok()?;
        bytes.get(offset..).filter(|rest| !rest.is_empty())
    }
}

impl TargetSession for ReplaySession {
    fn evaluate(&mut self, expr: &str) -> Result<String, SessionError> {
        self.transcript.push(expr.to_string());
        self.values
            .get(expr.trim())
            .cloned()
            .ok_or_else(|| SessionError::EvaluationFailed {
                expr: expr.to_string(),
            })
    }

    fn read_bounded_string(&mut self, address: u64, max_len: usize) -> Result<String, SessionError> {
        self.transcript.push(format!("@{}", address));
        let bytes = self
            .bytes_at(address)
            .ok_or(SessionError::ReadFailed { address })?;

        let bounded = &bytes[..bytes.len().min(max_len)];
        let end = bounded
            .iter()
            .position(|&b| b == SENTINEL)
            .unwrap_or(bounded.len());

        Ok(String::from_utf8_lossy(&bounded[..end]).into_owned())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

impl FromStr for ReplaySession {
    type Err = ReplayError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let parser = DumpParser::new()?;
        let mut session = ReplaySession::new();

        for (i, raw) in text.lines().enumerate() {
            parser.apply(&mut session, raw).map_err(|reason| ReplayError::Syntax {
                line: i + 1,
                reason,
            })?;
        }

        debug!(
            values = session.values.len(),
            regions = session.memory.len(),
            running = session.running,
            "Loaded replay dump"
        );
        Ok(session)
    }
}

/// ダンプの1行を解釈するパーサー
struct DumpParser {
    /// `@<address> "<bytes>"`
    memory_line: Regex,
    /// `<expression> = <value>`
    value_line: Regex,
}

impl DumpParser {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            memory_line: Regex::new(r#"^@\s*(0[xX][0-9a-fA-F]+|[0-9]+)\s+"(.*)"$"#)?,
            value_line: Regex::new(r"^(.+?)\s+=\s+(.+)$")?,
        })
    }

    fn apply(&self, session: &mut ReplaySession, raw: &str) -> Result<(), String> {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        match line {
            "!running" => {
                session.set_running(true);
                return Ok(());
            }
            "!halted" => {
                session.set_running(false);
                return Ok(());
            }
            _ => {}
        }

        if let Some(caps) = self.memory_line.captures(line) {
            let address = crate::parse_value(&caps[1], &caps[1])
                .map_err(|_| format!("invalid address '{}'", &caps[1]))?;
            let bytes = unescape(&caps[2])?;
            session.set_memory(address, bytes);
            return Ok(());
        }

        if line.starts_with('!') || line.starts_with('@') {
            return Err(format!("unrecognized directive '{}'", line));
        }

        if let Some(caps) = self.value_line.captures(line) {
            session.set_value(&caps[1], caps[2].trim());
            return Ok(());
        }

        Err(format!("expected '<expression> = <value>', got '{}'", line))
    }
}

/// 引用符内のエスケープシーケンスを展開する
fn unescape(s: &str) -> Result<Vec<u8>, String> {
    let mut out = Vec::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }

        match chars.next() {
            Some('0') => out.push(0),
            Some('n') => out.push(b'\n'),
            Some('t') => out.push(b'\t'),
            Some('\\') => out.push(b'\\'),
            Some('"') => out.push(b'"'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                let byte = u8::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 2)
                    .ok_or_else(|| format!("invalid escape '\\x{}'", hex))?;
                out.push(byte);
            }
            Some(other) => return Err(format!("invalid escape '\\{}'", other)),
            None => return Err("dangling '\\' at end of string".to_string()),
        }
    }

    Ok(out)
}
