//! rtscope ターゲットセッション
//!
//! このクレートは、停止中のターゲットに対して式の評価とメモリ読み取りを行うための
//! 抽象インターフェースを提供します。
//! デバッガとの実際の通信は外部に任せ、ここではその契約と数値テキストのデコード、
//! 記録済みダンプを再生するオフラインセッションを定義します。

pub mod replay;
pub mod session;
pub mod value;

pub use replay::{ReplayError, ReplaySession};
pub use session::{SessionError, TargetSession};
pub use value::parse_value;
