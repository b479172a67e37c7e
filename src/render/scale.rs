use crate::data::stats::format_g;

/// Maps data values onto a pixel range and proposes tick positions.
pub trait Scale {
    fn map(&self, value: f64) -> f64;
    fn ticks(&self) -> Vec<(f64, String)>;
}

// ---------------------------------------------------------------------------
// Linear
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl LinearScale {
    /// A degenerate domain is widened by ±0.5 so it still has extent.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let (mut d0, mut d1) = domain;
        if !(d1 - d0).is_normal() || d1 < d0 {
            let mid = if d0.is_finite() { d0 } else { 0.0 };
            d0 = mid - 0.5;
            d1 = mid + 0.5;
        }
        LinearScale {
            d0,
            d1,
            r0: range.0,
            r1: range.1,
        }
    }

    /// Domain padded on both sides by `fraction` of its extent.
    pub fn with_margin(domain: (f64, f64), fraction: f64, range: (f64, f64)) -> Self {
        let pad = (domain.1 - domain.0) * fraction;
        Self::new((domain.0 - pad, domain.1 + pad), range)
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.d0, self.d1)
    }
}

impl Scale for LinearScale {
    fn map(&self, value: f64) -> f64 {
        self.r0 + (value - self.d0) / (self.d1 - self.d0) * (self.r1 - self.r0)
    }

    fn ticks(&self) -> Vec<(f64, String)> {
        nice_ticks(self.d0, self.d1, 6)
            .into_iter()
            .map(|t| (t, format_g(t)))
            .collect()
    }
}

/// Round tick positions ("nice numbers") covering `[min, max]`.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    if !(max > min) || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    let step = nice_step((max - min) / target.max(1) as f64);
    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    // snap float noise like 0.6000000000000001
    let decimals = (-step.log10().floor()).max(0.0) as i32 + 1;
    let snap = 10f64.powi(decimals);
    (first..=last)
        .map(|k| (k as f64 * step * snap).round() / snap)
        .collect()
}

fn nice_step(raw: f64) -> f64 {
    let exp = raw.log10().floor();
    let base = 10f64.powf(exp);
    let frac = raw / base;
    let eps = 1e-9;
    let nice = if frac <= 1.0 + eps {
        1.0
    } else if frac <= 2.0 + eps {
        2.0
    } else if frac <= 2.5 + eps {
        2.5
    } else if frac <= 5.0 + eps {
        5.0
    } else {
        10.0
    };
    nice * base
}

// ---------------------------------------------------------------------------
// Log10
// ---------------------------------------------------------------------------

/// Base-10 logarithmic scale. The domain must be strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogScale {
    inner: LinearScale,
}

impl LogScale {
    /// The domain is widened outward to whole decades.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Option<Self> {
        if !(domain.0 > 0.0 && domain.1 > 0.0) {
            return None;
        }
        let lo = domain.0.log10().floor();
        let mut hi = domain.1.log10().ceil();
        if hi <= lo {
            hi = lo + 1.0;
        }
        Some(LogScale {
            inner: LinearScale::new((lo, hi), range),
        })
    }
}

impl Scale for LogScale {
    fn map(&self, value: f64) -> f64 {
        self.inner.map(value.log10())
    }

    fn ticks(&self) -> Vec<(f64, String)> {
        let (lo, hi) = self.inner.domain();
        (lo.round() as i32..=hi.round() as i32)
            .map(|k| (10f64.powi(k), power_of_ten_label(k)))
            .collect()
    }
}

/// "10³"-style label for a power of ten.
pub fn power_of_ten_label(exp: i32) -> String {
    const SUPERSCRIPTS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
    let mut label = String::from("10");
    if exp < 0 {
        label.push('⁻');
    }
    for d in exp.unsigned_abs().to_string().chars() {
        if let Some(n) = d.to_digit(10) {
            label.push(SUPERSCRIPTS[n as usize]);
        }
    }
    label
}
