//! 走査のエラー

use rtscope_target::SessionError;
use thiserror::Error;

/// 双方向循環リストの整合性違反
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Corruption {
    /// 前方または後方リンクがNULL
    #[error("NULL pointer in {link} of node {node:#x}")]
    NullLink { node: u64, link: &'static str },

    /// 後方リンクが直前に訪問したノードを指していない
    #[error("double linked list violation at node {node:#x} (expected {expected:#x}, found {found:#x})")]
    LinkMismatch { node: u64, expected: u64, found: u64 },
}

/// スレッドレジストリ走査のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// レジストリのルートシンボルが解決できない
    #[error("ChibiOS/RT not found on target (cannot resolve '{symbol}')")]
    KernelNotPresent { symbol: String, source: SessionError },

    /// レジストリのリンクメンバーが存在しない
    #[error("ChibiOS/RT registry not enabled in kernel")]
    TraceabilityDisabled { source: SessionError },

    #[error("ChibiOS/RT registry integrity check failed, {0}")]
    Corrupt(#[from] Corruption),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// 仮想タイマのデルタリスト走査のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerListError {
    /// デルタリストのルートシンボルが解決できない
    #[error("ChibiOS/RT not found on target (cannot resolve '{symbol}')")]
    KernelNotPresent { symbol: String, source: SessionError },

    #[error("ChibiOS/RT delta list integrity check failed, {0}")]
    Corrupt(#[from] Corruption),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// トレースバッファ読み取りのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceBufferError {
    /// トレースバッファがターゲットに存在しない
    #[error("trace buffer not found on target")]
    NotPresent { source: SessionError },

    /// リングの形状が不正
    #[error("trace buffer geometry is invalid: {reason}")]
    Geometry { reason: String },

    #[error(transparent)]
    Session(#[from] SessionError),
}
