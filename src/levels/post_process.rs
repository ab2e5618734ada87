//! Level post-processing: range filter, predefined blend, volume weighting,
//! clustering, ranking and the closest support/resistance pick.

use crate::config::{LevelPolicy, PostProcessOptions};
use crate::error::{ensure_positive_price, LevelError};
use crate::models::{Bar, LevelSet};
use tracing::debug;

/// Turn raw detected levels into a bounded, ranked level set.
///
/// Range filtering, the predefined blend and volume weighting run per side.
/// Both sides are then clustered together with each cluster remembering
/// which sides fed it, so a support and a resistance within
/// `cluster_tolerance` of each other collapse into one reported level. The
/// closest support is the highest retained cluster below the price with at
/// least one support member; the closest resistance is the lowest retained
/// cluster above it with a resistance member. Both picks are therefore always
/// members of `levels`. Levels outside `[price * range_low, price * range_high]`
/// are never reported, even when they would otherwise be the closest support
/// or resistance.
pub fn post_process(
    supports: &[f64],
    resistances: &[f64],
    current_price: f64,
    series: &[Bar],
    predefined: &[f64],
    options: PostProcessOptions,
    policy: &LevelPolicy,
) -> Result<LevelSet, LevelError> {
    let price = ensure_positive_price(current_price)?;
    let (low, high) = policy.price_range(price);
    let in_range = |level: &f64| level.is_finite() && *level >= low && *level <= high;

    let mut supports: Vec<f64> = supports.iter().copied().filter(in_range).collect();
    let mut resistances: Vec<f64> = resistances.iter().copied().filter(in_range).collect();

    if options.use_predefined_blend {
        for &level in predefined.iter().filter(|l| in_range(l)) {
            let side = if level < price {
                &mut supports
            } else if level > price {
                &mut resistances
            } else {
                continue;
            };
            let corroborated = side
                .iter()
                .any(|&d| (d - level).abs() / level <= policy.blend_tolerance);
            if !corroborated {
                debug!(level = level, "injecting predefined level");
                side.push(level);
            }
        }
    }

    if options.use_volume_weighting {
        match average_volume(series) {
            Some(avg) => {
                let threshold = avg * policy.volume_multiple;
                let interested = |level: &f64| {
                    volume_near(*level, series, policy.volume_proximity) >= threshold
                };
                supports.retain(interested);
                resistances.retain(interested);
            }
            None => debug!("series carries no volume, skipping volume weighting"),
        }
    }

    let tagged = supports
        .into_iter()
        .map(|level| (level, Side::Support))
        .chain(resistances.into_iter().map(|level| (level, Side::Resistance)))
        .collect();
    let clusters = rank_and_limit(
        cluster_tagged(tagged, policy.cluster_tolerance),
        price,
        policy.max_levels,
    );

    let support = clusters
        .iter()
        .filter(|c| c.support && c.mean < price)
        .map(|c| c.mean)
        .reduce(f64::max);
    let resistance = clusters
        .iter()
        .filter(|c| c.resistance && c.mean > price)
        .map(|c| c.mean)
        .reduce(f64::min);

    Ok(LevelSet {
        levels: clusters.iter().map(|c| c.mean).collect(),
        support,
        resistance,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Support,
    Resistance,
}

/// A merged level and the sides its members came from.
#[derive(Debug, Clone, Copy)]
struct Cluster {
    mean: f64,
    support: bool,
    resistance: bool,
}

/// Merge near-duplicate levels.
///
/// Levels are walked in ascending order; each one joins the current cluster
/// while it is within `tolerance` of the cluster's running mean, otherwise the
/// mean is emitted and a new cluster starts. Emitted means are ascending and
/// more than `tolerance` apart, so clustering the output again returns it
/// unchanged.
pub fn cluster_levels(levels: &[f64], tolerance: f64) -> Vec<f64> {
    let tagged = levels.iter().map(|&level| (level, Side::Support)).collect();
    cluster_tagged(tagged, tolerance)
        .into_iter()
        .map(|c| c.mean)
        .collect()
}

fn cluster_tagged(mut levels: Vec<(f64, Side)>, tolerance: f64) -> Vec<Cluster> {
    levels.retain(|(l, _)| l.is_finite() && *l > 0.0);
    levels.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut clusters = Vec::new();
    let mut current: Option<(f64, usize, Cluster)> = None;

    for (level, side) in levels {
        if let Some((sum, count, cluster)) = current.as_mut() {
            let mean = *sum / *count as f64;
            if (level - mean) / mean <= tolerance {
                *sum += level;
                *count += 1;
                cluster.support |= side == Side::Support;
                cluster.resistance |= side == Side::Resistance;
                continue;
            }
        }
        if let Some(done) = current.take() {
            clusters.push(finish(done));
        }
        current = Some((
            level,
            1,
            Cluster {
                mean: level,
                support: side == Side::Support,
                resistance: side == Side::Resistance,
            },
        ));
    }
    clusters.extend(current.map(finish));
    clusters
}

fn finish((sum, count, cluster): (f64, usize, Cluster)) -> Cluster {
    Cluster {
        mean: sum / count as f64,
        ..cluster
    }
}

/// Keep the `max_levels` clusters closest to `price`, ascending.
fn rank_and_limit(mut clusters: Vec<Cluster>, price: f64, max_levels: usize) -> Vec<Cluster> {
    if clusters.len() > max_levels {
        clusters.sort_by(|a, b| (a.mean - price).abs().total_cmp(&(b.mean - price).abs()));
        clusters.truncate(max_levels);
        clusters.sort_by(|a, b| a.mean.total_cmp(&b.mean));
    }
    clusters
}

/// Mean daily volume over bars that report one.
fn average_volume(series: &[Bar]) -> Option<f64> {
    let volumes: Vec<f64> = series.iter().filter_map(|b| b.volume).collect();
    if volumes.is_empty() {
        return None;
    }
    let avg = volumes.iter().sum::<f64>() / volumes.len() as f64;
    (avg > 0.0).then_some(avg)
}

fn volume_near(level: f64, series: &[Bar], proximity: f64) -> f64 {
    series
        .iter()
        .filter(|b| b.near_level(level, proximity))
        .filter_map(|b| b.volume)
        .sum()
}
