//! ターゲットセッションの契約

use thiserror::Error;

/// セッション操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// 式の評価に失敗した
    #[error("error evaluating the expression: '{expr}'")]
    EvaluationFailed { expr: String },

    /// メモリの読み取りに失敗した
    #[error("error reading memory at {address}")]
    ReadFailed { address: u64 },

    /// 評価結果が数値として解釈できない
    #[error("expression '{expr}' returned a non-numeric value: '{value}'")]
    Malformed { expr: String, value: String },
}

/// 停止中のターゲットへの直列化されたチャネル
///
/// `evaluate` と `read_bounded_string` はそれぞれ1往復の通信になる。
/// ターゲットが実行中の間はどちらも呼び出してはならず、
/// 呼び出し側が事前に `is_running` を確認する。
pub trait TargetSession {
    /// C形式の式をターゲット上で評価し、結果をテキストで返す
    fn evaluate(&mut self, expr: &str) -> Result<String, SessionError>;

    /// `address` から最大 `max_len` バイトを読み取り、終端バイトで切り詰めた文字列を返す
    fn read_bounded_string(&mut self, address: u64, max_len: usize) -> Result<String, SessionError>;

    /// ターゲットが実行中かどうか
    fn is_running(&self) -> bool;
}

impl<S: TargetSession + ?Sized> TargetSession for &mut S {
    fn evaluate(&mut self, expr: &str) -> Result<String, SessionError> {
        (**self).evaluate(expr)
    }

    fn read_bounded_string(&mut self, address: u64, max_len: usize) -> Result<String, SessionError> {
        (**self).read_bounded_string(address, max_len)
    }

    fn is_running(&self) -> bool {
        (**self).is_running()
    }
}

impl<S: TargetSession + ?Sized> TargetSession for Box<S> {
    fn evaluate(&mut self, expr: &str) -> Result<String, SessionError> {
        (**self).evaluate(expr)
    }

    fn read_bounded_string(&mut self, address: u64, max_len: usize) -> Result<String, SessionError> {
        (**self).read_bounded_string(address, max_len)
    }

    fn is_running(&self) -> bool {
        (**self).is_running()
    }
}
