// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

/// Trailing moving average over at most `window` values.
///
/// `out[i]` is the mean of `values[max(0, i + 1 - window)..=i]`, so the window
/// shrinks at the start of the series. A window of 0 or 1 returns the input
/// unchanged.
#[allow(clippy::cast_precision_loss)]
pub fn smooth(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 {
        return values.to_vec();
    }

    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let span = i + 1 - start;
            let sum: f64 = values.iter().skip(start).take(span).sum();
            sum / span as f64
        })
        .collect()
}
