//! 双方向循環リストの走査

use crate::errors::Corruption;
use crate::probe::{Halt, Probe};
use crate::record::Records;
use rtscope_target::{SessionError, TargetSession};
use tracing::{trace, warn};

/// カーネルの双方向循環リスト
///
/// 各ノードで前方リンクと後方リンクを1回ずつ評価し、
/// 後方リンクが直前のノードを指していることを確認しながら進む。
pub(crate) trait CircularList {
    type Record;
    type Error: From<SessionError> + From<Corruption>;

    /// 前方リンクのメンバー名
    const FORWARD: &'static str;
    /// 後方リンクのメンバー名
    const BACKWARD: &'static str;

    /// リストのヘッドのアドレスを求める式
    fn head_expr(&self) -> String;

    /// ヘッドが解決できなかったときのエラー
    fn head_missing(&self, source: SessionError) -> Self::Error;

    /// ノードのリンクメンバーを読む式
    fn link_expr(&self, node: u64, link: &str) -> String;

    /// 前方リンクが評価できなかったときのエラー
    fn forward_missing(&self, source: SessionError) -> Self::Error {
        Self::Error::from(source)
    }

    /// ノードのフィールドを読み取る
    fn decode<S: TargetSession + ?Sized>(
        &self,
        probe: &mut Probe<'_, S>,
        node: u64,
    ) -> Result<Self::Record, Halt<Self::Error>>;
}

/// ヘッドの次のノードから前方へ走査し、ヘッドに戻ったら終了する
pub(crate) fn walk<L, S>(
    list: &L,
    probe: &mut Probe<'_, S>,
) -> Result<Records<u64, L::Record>, Halt<L::Error>>
where
    L: CircularList,
    S: TargetSession + ?Sized,
{
    let head = probe
        .value(&list.head_expr())
        .map_err(|h| h.map(|source| list.head_missing(source)))?;
    trace!(head = format_args!("{:#x}", head), "List head resolved");

    let mut records = Records::new();
    let mut previous = head;

    loop {
        let current = probe
            .value(&list.link_expr(previous, L::FORWARD))
            .map_err(|h| h.map(|source| list.forward_missing(source)))?;
        if current == 0 {
            return Err(corrupt(Corruption::NullLink {
                node: previous,
                link: L::FORWARD,
            }));
        }

        let back = probe
            .value(&list.link_expr(current, L::BACKWARD))
            .map_err(|h| h.widen::<L::Error>())?;
        if back == 0 {
            return Err(corrupt(Corruption::NullLink {
                node: current,
                link: L::BACKWARD,
            }));
        }
        if back != previous {
            return Err(corrupt(Corruption::LinkMismatch {
                node: current,
                expected: previous,
                found: back,
            }));
        }

        if current == head {
            break;
        }

        let record = list.decode(probe, current)?;
        trace!(node = format_args!("{:#x}", current), "Node decoded");
        records.insert(current, record);
        previous = current;
    }

    Ok(records)
}

fn corrupt<E: From<Corruption>>(corruption: Corruption) -> Halt<E> {
    warn!("List integrity check failed: {}", corruption);
    Halt::Failed(E::from(corruption))
}
