//! カーネル状態の取得を束ねる窓口

use crate::errors::{RegistryError, TimerListError, TraceBufferError};
use crate::layout::KernelLayout;
use crate::record::{ThreadMap, TimerMap, TraceMap};
use crate::{registry, timers, trace};
use rtscope_target::TargetSession;
use tracing::info_span;

/// カーネルインスペクタ
///
/// 1つのセッションを所有し、3種類の走査を直列に実行する。
pub struct Inspector<S> {
    /// ターゲットセッション
    session: S,
    /// カーネル構造体のレイアウト
    layout: KernelLayout,
}

impl<S: TargetSession> Inspector<S> {
    /// デフォルトのレイアウトでインスペクタを作成する
    pub fn new(session: S) -> Self {
        Self::with_layout(session, KernelLayout::default())
    }

    /// レイアウトを指定してインスペクタを作成する
    pub fn with_layout(session: S, layout: KernelLayout) -> Self {
        Self { session, layout }
    }

    /// スレッドレジストリを読む
    pub fn threads(&mut self) -> Result<Option<ThreadMap>, RegistryError> {
        let _span = info_span!("threads", registry = %self.layout.registry_symbol).entered();
        registry::read_threads(&mut self.session, &self.layout)
    }

    /// 仮想タイマのデルタリストを読む
    pub fn timers(&mut self) -> Result<Option<TimerMap>, TimerListError> {
        let _span = info_span!("timers", list = %self.layout.timer_list_symbol).entered();
        timers::read_timers(&mut self.session, &self.layout)
    }

    /// トレースバッファを読む
    pub fn trace(&mut self) -> Result<Option<TraceMap>, TraceBufferError> {
        let _span = info_span!("trace", buffer = %self.layout.trace_buffer_symbol).entered();
        trace::read_trace_buffer(&mut self.session, &self.layout)
    }

    /// セッションを取得する
    pub fn session(&self) -> &S {
        &self.session
    }

    /// セッションを可変参照で取得する
    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// レイアウトを取得する
    pub fn layout(&self) -> &KernelLayout {
        &self.layout
    }

    /// レイアウトを差し替える
    pub fn set_layout(&mut self, layout: KernelLayout) {
        self.layout = layout;
    }

    /// セッションを取り出す
    pub fn into_session(self) -> S {
        self.session
    }
}
