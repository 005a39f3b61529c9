//! Time-domain features.

/// Per-frame zero-crossing rate.
///
/// Frames of `frame_length` samples every `hop` samples, centered by
/// repeating the first and last sample `frame_length / 2` times. Values
/// with magnitude `<= threshold` count as zero and zero counts as
/// positive. Each rate is the number of sign changes divided by
/// `frame_length`.
pub fn zero_crossing_rate(
    samples: &[f64],
    frame_length: usize,
    hop: usize,
    threshold: f64,
) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }
    let pad = frame_length / 2;
    let first = samples[0];
    let last = samples[samples.len() - 1];
    let negative = |s: f64| s.abs() > threshold && s < 0.0;

    let padded_len = samples.len() + 2 * pad;
    let at = |i: usize| -> f64 {
        if i < pad {
            first
        } else if i - pad < samples.len() {
            samples[i - pad]
        } else {
            last
        }
    };

    let num_frames = 1 + (padded_len - frame_length) / hop;
    (0..num_frames)
        .map(|t| {
            let start = t * hop;
            let mut prev = negative(at(start));
            let mut crossings = 0usize;
            for i in start + 1..start + frame_length {
                let cur = negative(at(i));
                if cur != prev {
                    crossings += 1;
                }
                prev = cur;
            }
            crossings as f64 / frame_length as f64
        })
        .collect()
}
