//! Peak finding and periodic-spacing estimation over 1-D profiles.

/// Dominant spacing recovered from a projection profile.
#[derive(Clone, Copy, Debug)]
pub struct SpacingEstimate {
    /// Modal peak-to-peak spacing, pixels.
    pub spacing_px: f32,
    /// Number of peak gaps supporting the modal spacing.
    pub support: usize,
    /// Total number of peak gaps considered.
    pub total: usize,
    /// Offset of the first supporting peak, pixels.
    pub first_peak: f32,
}

impl SpacingEstimate {
    /// Fraction of gaps agreeing with the modal spacing.
    pub fn support_ratio(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.support as f32 / self.total as f32
    }
}

/// Indices of local maxima rising above a prominence floor.
///
/// The floor is `mean + 0.5 * std` of the profile or `min_mass`, whichever
/// is higher, so a flat or noisy profile yields few peaks instead of many
/// spurious ones. Plateaus count once (left edge), keeping the result
/// deterministic.
pub fn find_peaks(profile: &[f32], min_mass: f32) -> Vec<usize> {
    if profile.len() < 3 {
        return Vec::new();
    }
    let n = profile.len() as f64;
    let mean: f64 = profile.iter().map(|&v| v as f64).sum::<f64>() / n;
    let var: f64 = profile
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let floor = ((mean + 0.5 * var.sqrt()) as f32).max(min_mass);

    let mut peaks = Vec::new();
    for i in 1..profile.len() - 1 {
        let v = profile[i];
        if v <= floor {
            continue;
        }
        if v > profile[i - 1] && v >= profile[i + 1] {
            peaks.push(i);
        }
    }
    peaks
}

/// Cluster consecutive peak spacings and return the modal one.
///
/// Scan noise produces spurious short-period gaps; picking the most
/// populated spacing cluster instead of the first candidate suppresses
/// them. Clusters closer than `rel_tol` of the running value merge. Equal
/// support breaks toward the smaller spacing so reruns cannot flap between
/// a fundamental and a subharmonic.
pub fn dominant_spacing(peaks: &[usize], rel_tol: f32) -> Option<SpacingEstimate> {
    if peaks.len() < 3 {
        return None;
    }
    let mut gaps: Vec<f32> = peaks.windows(2).map(|w| (w[1] - w[0]) as f32).collect();
    gaps.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    // single pass over sorted gaps: a gap joins the current cluster while it
    // stays within rel_tol of the cluster mean
    struct Cluster {
        sum: f32,
        count: usize,
    }
    let mut clusters: Vec<Cluster> = Vec::new();
    for gap in gaps {
        match clusters.last_mut() {
            Some(cluster) => {
                let mean = cluster.sum / cluster.count as f32;
                if (gap - mean).abs() <= rel_tol * mean.max(1.0) {
                    cluster.sum += gap;
                    cluster.count += 1;
                } else {
                    clusters.push(Cluster { sum: gap, count: 1 });
                }
            }
            None => clusters.push(Cluster { sum: gap, count: 1 }),
        }
    }

    // modal cluster; ties break to the smaller spacing (clusters are in
    // ascending spacing order)
    let total: usize = clusters.iter().map(|c| c.count).sum();
    let best = clusters.iter().max_by(|a, b| {
        a.count
            .cmp(&b.count)
            .then_with(|| b.sum.partial_cmp(&a.sum).unwrap_or(std::cmp::Ordering::Equal))
    })?;
    let spacing = best.sum / best.count as f32;
    if spacing <= 0.0 {
        return None;
    }
    Some(SpacingEstimate {
        spacing_px: spacing,
        support: best.count,
        total,
        first_peak: peaks[0] as f32,
    })
}

/// Spacing estimation with a windowed fallback for partial grids.
///
/// `min_peak_mass` gates which local maxima count as grid lines at all: a
/// line's projected mass is comparable to the perpendicular image
/// dimension, while stray mask pixels project slivers. A candidate
/// estimate then qualifies only when it has enough supporting gaps, an
/// agreeing majority, and its supporting peaks span a sizable part of the
/// profile. When the full-width profile does not qualify, overlapping
/// half-width windows are scored with the same rules relative to their own
/// length, so a grid visible in only part of the image still calibrates.
pub fn axis_spacing(profile: &[f32], rel_tol: f32, min_peak_mass: f32) -> Option<SpacingEstimate> {
    fn qualifies(est: &SpacingEstimate, len: usize) -> bool {
        est.support >= 4
            && est.support_ratio() >= 0.5
            && est.spacing_px * est.support as f32 >= 0.25 * len as f32
    }

    if let Some(est) = dominant_spacing(&find_peaks(profile, min_peak_mass), rel_tol) {
        if qualifies(&est, profile.len()) {
            return Some(est);
        }
    }

    let win = profile.len() / 2;
    if win < 8 {
        return None;
    }
    let step = win / 2;
    let mut best: Option<SpacingEstimate> = None;
    let mut start = 0usize;
    while start + win <= profile.len() {
        let peaks = find_peaks(&profile[start..start + win], min_peak_mass);
        if let Some(mut est) = dominant_spacing(&peaks, rel_tol) {
            est.first_peak += start as f32;
            let better = match &best {
                Some(b) => (est.support, est.support_ratio()) > (b.support, b.support_ratio()),
                None => true,
            };
            if qualifies(&est, win) && better {
                best = Some(est);
            }
        }
        start += step;
    }
    best
}
