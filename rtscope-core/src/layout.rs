//! カーネル構造体のシンボル名と型名
//!
//! 走査に使う式はすべてここから生成されます。
//! デフォルトは ChibiOS/RT 2.x の名前で、カーネルのバージョンやポートに合わせて
//! `with_*` で個別に差し替えられます。

use crate::expr::Expression;

/// スレッド名として読み取る最大バイト数
pub const DEFAULT_NAME_MAX_LEN: usize = 16;

/// カーネル構造体のレイアウト設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelLayout {
    /// スレッドレジストリのルートシンボル
    pub registry_symbol: String,
    /// スレッド制御ブロックの型名
    pub thread_type: String,
    /// 仮想タイマのデルタリストのルートシンボル
    pub timer_list_symbol: String,
    /// 仮想タイマの型名
    pub timer_type: String,
    /// トレースバッファのシンボル
    pub trace_buffer_symbol: String,
    /// トレースイベントの型名
    pub trace_event_type: String,
    /// スレッド名の最大長
    pub name_max_len: usize,
    /// 保存されたスタックポインタのメンバー候補（先頭から順に試す）
    pub stack_members: Vec<String>,
}

impl Default for KernelLayout {
    fn default() -> Self {
        Self {
            registry_symbol: "rlist".to_string(),
            thread_type: "Thread".to_string(),
            timer_list_symbol: "vtlist".to_string(),
            timer_type: "VirtualTimer".to_string(),
            trace_buffer_symbol: "ch_dbg_trace_buffer".to_string(),
            trace_event_type: "ch_swc_event_t".to_string(),
            name_max_len: DEFAULT_NAME_MAX_LEN,
            stack_members: vec!["p_ctx.r13".to_string(), "p_ctx.sp".to_string()],
        }
    }
}

impl KernelLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.registry_symbol = symbol.into();
        self
    }

    pub fn with_thread_type(mut self, ty: impl Into<String>) -> Self {
        self.thread_type = ty.into();
        self
    }

    pub fn with_timer_list_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.timer_list_symbol = symbol.into();
        self
    }

    pub fn with_timer_type(mut self, ty: impl Into<String>) -> Self {
        self.timer_type = ty.into();
        self
    }

    pub fn with_trace_buffer_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.trace_buffer_symbol = symbol.into();
        self
    }

    pub fn with_trace_event_type(mut self, ty: impl Into<String>) -> Self {
        self.trace_event_type = ty.into();
        self
    }

    pub fn with_name_max_len(mut self, len: usize) -> Self {
        self.name_max_len = len;
        self
    }

    pub fn with_stack_members<I, T>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.stack_members = members.into_iter().map(Into::into).collect();
        self
    }

    /// `(uint32_t)&rlist`
    pub fn registry_head(&self) -> String {
        Expression::symbol(&self.registry_symbol)
            .address_of()
            .scalar()
            .to_string()
    }

    /// `(uint32_t)((Thread *)node)->member`
    pub fn thread_field(&self, node: u64, member: &str) -> String {
        Expression::pointer(&self.thread_type, node)
            .arrow(member)
            .scalar()
            .to_string()
    }

    /// `(uint32_t)&vtlist`
    pub fn timer_list_head(&self) -> String {
        Expression::symbol(&self.timer_list_symbol)
            .address_of()
            .scalar()
            .to_string()
    }

    /// `(uint32_t)((VirtualTimer *)node)->member`
    pub fn timer_field(&self, node: u64, member: &str) -> String {
        Expression::pointer(&self.timer_type, node)
            .arrow(member)
            .scalar()
            .to_string()
    }

    /// `(uint32_t)ch_dbg_trace_buffer.member`
    pub fn trace_buffer_field(&self, member: &str) -> String {
        Expression::symbol(&self.trace_buffer_symbol)
            .member(member)
            .scalar()
            .to_string()
    }

    /// `(uint32_t)sizeof (ch_swc_event_t)`
    pub fn trace_event_size(&self) -> String {
        Expression::size_of(&self.trace_event_type)
            .scalar()
            .to_string()
    }

    /// `(uint32_t)&ch_dbg_trace_buffer.tb_buffer[capacity]`
    pub fn trace_buffer_end(&self, buffer_member: &str, capacity: u64) -> String {
        Expression::symbol(&self.trace_buffer_symbol)
            .member(buffer_member)
            .index(capacity)
            .address_of()
            .scalar()
            .to_string()
    }

    /// `(uint32_t)((ch_swc_event_t *)slot)->member`
    pub fn trace_event_field(&self, slot: u64, member: &str) -> String {
        Expression::pointer(&self.trace_event_type, slot)
            .arrow(member)
            .scalar()
            .to_string()
    }
}
