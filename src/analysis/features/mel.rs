// Mel filter bank - triangular filters, linear at the bottom and log-spaced above
//
// Edge frequencies: `linear_filters` edges every `linear_spacing_hz` starting
// at `low_freq_hz`, then edges growing by a constant ratio `log_spacing`.
// Filter `i` rises from edge `i` to edge `i + 1` and falls to edge `i + 2`,
// with peak height `2 / (hi - lo)` so every filter has unit area.

use crate::config::FeatureConfig;

/// Smallest energy fed to the logarithm
const ENERGY_FLOOR: f64 = f64::MIN_POSITIVE;

struct TriangularFilter {
    start_bin: usize,
    weights: Vec<f64>,
}

/// Bank of triangular filters over an `fft_size`-bin magnitude spectrum
pub struct FilterBank {
    filters: Vec<TriangularFilter>,
}

impl FilterBank {
    /// Build the filter bank for a sample rate
    ///
    /// Bins at or beyond `fft_size` are dropped, so high edges above the
    /// sample rate never index out of the spectrum.
    pub fn new(config: &FeatureConfig, sample_rate: u32) -> Self {
        let edges = edge_frequencies(config);
        let fft_size = config.fft_size;
        let fs = f64::from(sample_rate);
        let bin_of = |freq: f64| (freq * fft_size as f64 / fs).floor() as usize + 1;
        let bin_freq = |bin: usize| bin as f64 / fft_size as f64 * fs;

        let filters = edges
            .windows(3)
            .map(|edge| {
                let (low, center, high) = (edge[0], edge[1], edge[2]);
                let height = 2.0 / (high - low);
                let rising = height / (center - low);
                let falling = height / (high - center);

                let start_bin = bin_of(low).min(fft_size);
                let center_bin = bin_of(center).min(fft_size);
                let end_bin = bin_of(high).min(fft_size);

                let mut weights = Vec::with_capacity(end_bin.saturating_sub(start_bin));
                for bin in start_bin..center_bin {
                    weights.push(rising * (bin_freq(bin) - low));
                }
                for bin in center_bin.max(start_bin)..end_bin {
                    weights.push(falling * (high - bin_freq(bin)));
                }

                TriangularFilter { start_bin, weights }
            })
            .collect();

        Self { filters }
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// log10 of each filter's energy over a magnitude spectrum
    ///
    /// # Arguments
    /// * `spectrum` - Magnitude spectrum, length fft_size
    /// * `log_energies` - Output, one value per filter
    pub fn log_energies(&self, spectrum: &[f64], log_energies: &mut [f64]) {
        for (filter, out) in self.filters.iter().zip(log_energies.iter_mut()) {
            let energy: f64 = spectrum[filter.start_bin..]
                .iter()
                .zip(filter.weights.iter())
                .map(|(&magnitude, &weight)| magnitude * weight)
                .sum();
            *out = energy.max(ENERGY_FLOOR).log10();
        }
    }
}

/// Edge frequencies of all filters (`filter_count + 2` values, increasing)
fn edge_frequencies(config: &FeatureConfig) -> Vec<f64> {
    let mut edges = Vec::with_capacity(config.filter_count() + 2);
    for i in 0..config.linear_filters {
        edges.push(config.low_freq_hz + i as f64 * config.linear_spacing_hz);
    }
    let last_linear = edges.last().copied().unwrap_or(config.low_freq_hz);
    for i in 1..=(config.log_filters + 2) {
        edges.push(last_linear * config.log_spacing.powi(i as i32));
    }
    edges.truncate(config.filter_count() + 2);
    edges
}
