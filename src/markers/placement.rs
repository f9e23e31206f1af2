use super::{Lane, Marker, MarkerParams};
use crate::audio::beat::remove_near_beats;
use crate::track::spline::{BSpline, END_PADDING};

/// Curve parameter at which the marker of beat window `beat` is reached.
/// The `+ 4 / - 4` offsets compensate for the padded end points. Since
/// [`BSpline::indexes_at`] spans `len - 3` segments, the marker lands on
/// segment `beat + 4` early in the song and drifts up to one window later
/// (segment `beat + 5`) towards the end.
pub fn marker_parameter(beat: usize, padded_len: usize) -> f32 {
    let padding = 2 * END_PADDING;
    (beat + padding) as f32 / padded_len.saturating_sub(padding).max(1) as f32
}

/// Deterministic left/center/right spread: a beat landing in the same
/// residue class (mod 3) as the previous one is nudged by 1 or 2, so
/// consecutive markers rarely share a lane.
pub fn assign_lanes(beats: &[usize]) -> Vec<Lane> {
    let Some(&first) = beats.first() else {
        return Vec::new();
    };

    let mut previous = first;
    beats
        .iter()
        .map(|&beat| {
            let noise = if beat % 3 == previous % 3 { beat % 2 + 1 } else { 0 };
            previous = beat + noise;
            Lane::from_offset(((beat + noise) % 3) as i64 - 1)
        })
        .collect()
}

fn markers_for<'a>(beats: &'a [usize], spline: &BSpline, max_distance: f32) -> impl Iterator<Item = Marker> + 'a {
    let padded_len = spline.len();
    beats
        .iter()
        .zip(assign_lanes(beats))
        .map(move |(&beat, lane)| Marker {
            beat_index: beat,
            end_parameter: marker_parameter(beat, padded_len),
            z_position: lane.sign() * max_distance,
            lane,
        })
}

/// Merges two beat lists into markers. Low-band beats win: high-band beats
/// within `params.dedup_range` windows of one are dropped. Each list is
/// laned on its own; the result is ordered by curve parameter.
pub fn place_markers(low: &[usize], high: &[usize], spline: &BSpline, params: &MarkerParams) -> Vec<Marker> {
    let mut high = high.to_vec();
    let before = high.len();
    remove_near_beats(low, &mut high, params.dedup_range);
    log::debug!(
        "Markers: {} low, {} high ({} dropped near low beats)",
        low.len(),
        high.len(),
        before - high.len()
    );

    let mut markers: Vec<Marker> = markers_for(low, spline, params.max_distance_from_center)
        .chain(markers_for(&high, spline, params.max_distance_from_center))
        .collect();
    markers.sort_by(|a, b| a.end_parameter.total_cmp(&b.end_parameter));
    markers
}
