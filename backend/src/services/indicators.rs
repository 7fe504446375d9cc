pub const SMA_WINDOW: usize = 20;
pub const EMA_SPAN: usize = 20;
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// Percentage change from `prev` to `last`.
///
/// A zero previous close yields `0.0` rather than an infinite or NaN change.
pub fn percent_change(last: f64, prev: f64) -> f64 {
    if prev == 0.0 {
        return 0.0;
    }
    (last - prev) / prev * 100.0
}

/// Simple Moving Average (SMA)
/// Returns a vector aligned with `values`:
/// - `None` until `window` values exist
/// - `Some(avg)` of the trailing `window` values after that
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    // Running sum; subtract the value that falls out of the window.
    values
        .iter()
        .enumerate()
        .scan(0.0_f64, move |sum, (i, &v)| {
            *sum += v;
            if i >= window {
                *sum -= values[i - window];
            }

            let out = if i + 1 >= window {
                Some(*sum / window as f64)
            } else {
                None
            };

            Some(out)
        })
        .collect()
}

/// Exponential Moving Average (EMA) with smoothing factor `2 / (span + 1)`.
///
/// Seeded with the first value, so every index is defined (no warm-up gap).
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };

    let alpha = 2.0 / (span as f64 + 1.0);

    std::iter::once(first)
        .chain(values[1..].iter().scan(first, move |prev, &v| {
            *prev = alpha * v + (1.0 - alpha) * *prev;
            Some(*prev)
        }))
        .collect()
}

/// Relative Strength Index (RSI) with Wilder smoothing.
///
/// RSI values range from 0 to 100; above 70 is conventionally overbought and
/// below 30 oversold. The first `period` entries are `None`.
pub fn rsi(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; prices.len()];
    if period == 0 || prices.len() <= period {
        return result;
    }

    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    let gain = |c: f64| c.max(0.0);
    let loss = |c: f64| (-c).max(0.0);

    let mut avg_gain = changes[..period].iter().map(|&c| gain(c)).sum::<f64>() / period as f64;
    let mut avg_loss = changes[..period].iter().map(|&c| loss(c)).sum::<f64>() / period as f64;

    let value = |avg_gain: f64, avg_loss: f64| {
        if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        }
    };

    result[period] = Some(value(avg_gain, avg_loss));

    let p = period as f64;
    for (i, &c) in changes.iter().enumerate().skip(period) {
        avg_gain = (avg_gain * (p - 1.0) + gain(c)) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss(c)) / p;
        result[i + 1] = Some(value(avg_gain, avg_loss));
    }

    result
}

/// Moving Average Convergence Divergence (MACD).
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    /// Fast EMA minus slow EMA.
    pub line: Vec<f64>,
    /// EMA of `line` over the signal period.
    pub signal: Vec<f64>,
    /// `line - signal`.
    pub histogram: Vec<f64>,
}

pub fn macd(prices: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let fast_ema = ema(prices, fast);
    let slow_ema = ema(prices, slow);

    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal = ema(&line, signal);
    let histogram = line.iter().zip(&signal).map(|(m, s)| m - s).collect();

    Macd { line, signal, histogram }
}
