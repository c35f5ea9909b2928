//! 実行状態を確認しながらセッションを呼び出すラッパー

use crate::record::Field;
use rtscope_target::{parse_value, SessionError, TargetSession};
use tracing::debug;

/// リモート呼び出しが値を返さなかった理由
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Halt<E> {
    /// ターゲットが実行中（エラーではない）
    Running,
    /// 呼び出しまたは走査が失敗した
    Failed(E),
}

impl<E> Halt<E> {
    pub(crate) fn map<F>(self, f: impl FnOnce(E) -> F) -> Halt<F> {
        match self {
            Halt::Running => Halt::Running,
            Halt::Failed(e) => Halt::Failed(f(e)),
        }
    }

    pub(crate) fn widen<F: From<E>>(self) -> Halt<F> {
        self.map(F::from)
    }
}

impl<E> From<E> for Halt<E> {
    fn from(e: E) -> Self {
        Halt::Failed(e)
    }
}

/// 走査結果を公開APIの形に変換する
///
/// 実行中の中断は `Ok(None)` になる。
pub(crate) fn settle<T, E>(result: Result<T, Halt<E>>, what: &str) -> Result<Option<T>, E> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Halt::Running) => {
            debug!("Target is running, {} not read", what);
            Ok(None)
        }
        Err(Halt::Failed(e)) => Err(e),
    }
}

/// 失敗を `None` として扱う（省略可能なフィールド用）
pub(crate) fn tolerate<T, E>(result: Result<T, Halt<SessionError>>) -> Result<Option<T>, Halt<E>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Halt::Running) => Err(Halt::Running),
        Err(Halt::Failed(e)) => {
            debug!("Optional field unavailable: {}", e);
            Ok(None)
        }
    }
}

/// セッションへの呼び出しを仲介する
///
/// すべての呼び出しの前に `is_running` を確認し、実行中なら `Halt::Running` を返す。
pub(crate) struct Probe<'a, S: ?Sized> {
    session: &'a mut S,
}

impl<'a, S: TargetSession + ?Sized> Probe<'a, S> {
    pub(crate) fn new(session: &'a mut S) -> Self {
        Self { session }
    }

    fn ensure_halted(&self) -> Result<(), Halt<SessionError>> {
        if self.session.is_running() {
            Err(Halt::Running)
        } else {
            Ok(())
        }
    }

    /// 式を評価して整数として返す
    pub(crate) fn value(&mut self, expr: &str) -> Result<u64, Halt<SessionError>> {
        self.ensure_halted()?;
        let text = self.session.evaluate(expr)?;
        Ok(parse_value(expr, &text)?)
    }

    /// 文字列を読み取る
    pub(crate) fn string(&mut self, address: u64, max_len: usize) -> Result<String, Halt<SessionError>> {
        self.ensure_halted()?;
        Ok(self.session.read_bounded_string(address, max_len)?)
    }

    /// 候補の式を順に評価し、最初に成功した値を返す
    ///
    /// すべて失敗した場合は `Field::Missing`。
    pub(crate) fn first_of<I, E>(&mut self, candidates: I) -> Result<Field<u64>, Halt<E>>
    where
        I: IntoIterator<Item = String>,
    {
        for expr in candidates {
            if let Some(value) = tolerate::<_, E>(self.value(&expr))? {
                return Ok(Field::Present(value));
            }
        }
        Ok(Field::Missing)
    }
}
