//! コンテキストスイッチのトレースバッファの読み取り
//!
//! トレースバッファは固定長のリングで、`tb_ptr` が次に書き込むスロットを指します。
//! そのスロットから1周と1スロット分を順に読むことで、古い順にイベントが並びます。
//! スレッドポインタがNULLのスロットは未使用として読み飛ばします。

use crate::errors::TraceBufferError;
use crate::layout::KernelLayout;
use crate::probe::{settle, Halt, Probe};
use crate::record::{ThreadState, TraceEvent, TraceMap};
use rtscope_target::TargetSession;
use tracing::{debug, trace};

/// リングバッファの配列メンバー
const BUFFER_MEMBER: &str = "tb_buffer";

/// リングの形状
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ring {
    /// スロット数
    capacity: u64,
    /// 1スロットのバイト数
    element_size: u64,
    /// 先頭スロットのアドレス
    start: u64,
    /// 末尾の次のアドレス
    end: u64,
    /// 次に書き込まれるスロット
    write: u64,
}

impl Ring {
    /// 次のスロットのアドレス（末尾を越えたら先頭に戻る）
    fn advance(&self, cursor: u64) -> u64 {
        let next = cursor.wrapping_add(self.element_size);
        if next >= self.end {
            self.start
        } else {
            next
        }
    }
}

type Step<T> = Result<T, Halt<TraceBufferError>>;

fn required<S: TargetSession + ?Sized>(probe: &mut Probe<'_, S>, expr: &str) -> Step<u64> {
    probe.value(expr).map_err(Halt::widen::<TraceBufferError>)
}

/// リングの容量・要素サイズ・範囲・書き込み位置を求める
fn geometry<S: TargetSession + ?Sized>(probe: &mut Probe<'_, S>, layout: &KernelLayout) -> Step<Ring> {
    // tb_size が無ければトレース機能自体が無効
    let capacity = probe
        .value(&layout.trace_buffer_field("tb_size"))
        .map_err(|h| h.map(|source| TraceBufferError::NotPresent { source }))?;

    let element_size = required(probe, &layout.trace_event_size())?;
    let start = required(probe, &layout.trace_buffer_field(BUFFER_MEMBER))?;
    let end = required(probe, &layout.trace_buffer_end(BUFFER_MEMBER, capacity))?;
    let write = required(probe, &layout.trace_buffer_field("tb_ptr"))?;

    if element_size == 0 {
        return Err(Halt::Failed(TraceBufferError::Geometry {
            reason: "event size is zero".to_string(),
        }));
    }

    Ok(Ring {
        capacity,
        element_size,
        start,
        end,
        write,
    })
}

/// 1スロット分のイベントを読む
fn read_slot<S: TargetSession + ?Sized>(
    probe: &mut Probe<'_, S>,
    layout: &KernelLayout,
    slot: u64,
    index: i64,
) -> Step<TraceEvent> {
    let time = required(probe, &layout.trace_event_field(slot, "se_time"))?;
    let thread = required(probe, &layout.trace_event_field(slot, "se_tp"))?;
    let wait_object = required(probe, &layout.trace_event_field(slot, "se_wtobjp"))?;
    let state = required(probe, &layout.trace_event_field(slot, "se_state"))?;

    Ok(TraceEvent {
        index,
        time,
        thread,
        wait_object,
        state: ThreadState::new(state),
    })
}

fn sweep<S: TargetSession + ?Sized>(probe: &mut Probe<'_, S>, layout: &KernelLayout) -> Step<TraceMap> {
    let ring = geometry(probe, layout)?;
    debug!(
        capacity = ring.capacity,
        element_size = ring.element_size,
        start = format_args!("{:#x}", ring.start),
        write = format_args!("{:#x}", ring.write),
        "Trace buffer geometry"
    );

    let capacity = i64::try_from(ring.capacity).map_err(|_| {
        Halt::Failed(TraceBufferError::Geometry {
            reason: format!("capacity {} is out of range", ring.capacity),
        })
    })?;

    let mut events = TraceMap::new();
    let mut cursor = ring.write;
    let mut index = 1 - capacity;

    // 書き込み位置から1周＋1スロット
    for _ in 0..=ring.capacity {
        let event = read_slot(probe, layout, cursor, index)?;
        if event.thread != 0 {
            events.insert(index, event);
        } else {
            trace!(slot = format_args!("{:#x}", cursor), "Empty trace slot skipped");
        }

        cursor = ring.advance(cursor);
        index += 1;
    }

    Ok(events)
}

/// トレースバッファを古い順に読み、イベントの一覧を返す
///
/// 戻り値のキーは最新イベントからの相対インデックス。
/// ターゲットが実行中なら `Ok(None)`。
///
/// # Errors
/// * `NotPresent` - トレースバッファがターゲットに存在しない
/// * `Geometry` - リングの形状が不正
/// * `Session` - その他の読み取り失敗
pub fn read_trace_buffer<S>(session: &mut S, layout: &KernelLayout) -> Result<Option<TraceMap>, TraceBufferError>
where
    S: TargetSession + ?Sized,
{
    let mut probe = Probe::new(session);
    let events = settle(sweep(&mut probe, layout), "trace buffer")?;
    if let Some(events) = &events {
        debug!(count = events.len(), "Trace buffer read");
    }
    Ok(events)
}
