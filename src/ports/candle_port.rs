//! Candle source port trait.

use crate::domain::error::KuriError;
use crate::domain::ohlcv::OhlcvBar;

pub trait CandlePort {
    /// All candles, oldest first.
    fn load_candles(&self) -> Result<Vec<OhlcvBar>, KuriError>;
}
