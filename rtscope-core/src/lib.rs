//! rtscope のコア機能
//!
//! このクレートは、停止中のターゲット上のカーネル構造体を式の評価だけで再構成します。
//! スレッドレジストリとタイマのデルタリストを整合性を確認しながら走査し、
//! コンテキストスイッチのトレースバッファを古い順に読み出します。

pub mod command;
pub mod errors;
pub mod expr;
pub mod inspector;
pub mod layout;
pub mod record;
pub mod registry;
pub mod state;
pub mod timers;
pub mod trace;

mod list;
mod probe;

pub use command::Command;
pub use errors::{Corruption, RegistryError, TimerListError, TraceBufferError};
pub use inspector::Inspector;
pub use layout::KernelLayout;
pub use record::{
    Field, Records, ThreadMap, ThreadName, ThreadRecord, ThreadState, TimerMap, TimerRecord,
    TraceEvent, TraceMap,
};
pub use registry::read_threads;
pub use state::{state_name, THREAD_STATES};
pub use timers::read_timers;
pub use trace::read_trace_buffer;

// 他のクレートから使用するために再エクスポート
pub use rtscope_target::{ReplaySession, SessionError, TargetSession};
