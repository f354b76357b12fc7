//! Consolidation of per-tile detections into canonical page regions.
//!
//! Two distinct operations live here and deliberately keep different
//! tie-break policies:
//!
//! - [`merge_overlapping_boxes`] deduplicates detections that overlapping
//!   tiles produced for the same physical text area. It scans in arrival
//!   order with no pre-sort; the first detection seen for an area becomes the
//!   canonical region that later duplicates extend.
//! - [`merge_nearby_boxes`] regroups recognized lines that belong to one
//!   paragraph but were detected separately. It is a single sequential sweep
//!   over a reading-order-sorted list and is order-sensitive: unsorted input
//!   silently produces wrong groups, so the precondition is asserted.

use crate::domain::region::Region;

/// Merges detections whose boxes overlap above `merge_threshold` (2-D IoU)
/// into single canonical regions.
///
/// Detections are visited in arrival order. Each one is compared against the
/// already-accepted regions; on the first match its box is unioned into that
/// region and its text appended, otherwise it is accepted as a new region.
/// Empty input returns an empty list.
///
/// Output region count never exceeds the input detection count, and running
/// the merge on its own output with the same threshold is a no-op as long as
/// the unioned boxes do not newly exceed the threshold against each other.
pub fn merge_overlapping_boxes(detections: Vec<Region>, merge_threshold: f64) -> Vec<Region> {
    if detections.is_empty() {
        return Vec::new();
    }

    let mut merged: Vec<Region> = Vec::new();

    for current in detections {
        let target = merged
            .iter()
            .position(|existing| existing.bbox.iou(&current.bbox) > merge_threshold);

        match target {
            Some(index) => merged[index].absorb(&current),
            None => merged.push(current),
        }
    }

    tracing::debug!(regions = merged.len(), "consolidated detections");
    merged
}

/// Sorts regions into reading order: top-to-bottom, then left-to-right.
pub fn sort_reading_order(regions: &mut [Region]) {
    regions.sort_by(|a, b| {
        a.center_y
            .partial_cmp(&b.center_y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.bbox.x_min().cmp(&b.bbox.x_min()))
    });
}

fn is_reading_order(regions: &[Region]) -> bool {
    regions.windows(2).all(|pair| {
        pair[0].center_y < pair[1].center_y
            || (pair[0].center_y == pair[1].center_y
                && pair[0].bbox.x_min() <= pair[1].bbox.x_min())
    })
}

/// Groups neighboring text lines into paragraph regions.
///
/// Entries must already be in reading order (see [`sort_reading_order`]);
/// the sweep keeps one accumulator group and either folds the next entry in
/// or flushes the group and starts a new one. An entry joins the current
/// group when its vertical gap below the group is under `y_threshold` *and*
/// the horizontal extents overlap or sit within `x_threshold` of each other.
/// The final group is always flushed. Empty input returns an empty list.
pub fn merge_nearby_boxes(entries: Vec<Region>, y_threshold: i32, x_threshold: i32) -> Vec<Region> {
    debug_assert!(
        is_reading_order(&entries),
        "merge_nearby_boxes requires reading-order-sorted input"
    );

    let mut entries = entries.into_iter();
    let Some(mut current_group) = entries.next() else {
        return Vec::new();
    };

    let mut merged: Vec<Region> = Vec::new();

    for next_item in entries {
        let vertical_gap = next_item.bbox.y_min() - current_group.bbox.y_max();
        let horizontal_near = current_group.bbox.x_min().max(next_item.bbox.x_min())
            < current_group.bbox.x_max().min(next_item.bbox.x_max()) + x_threshold;

        if vertical_gap < y_threshold && horizontal_near {
            current_group.absorb(&next_item);
        } else {
            merged.push(current_group);
            current_group = next_item;
        }
    }
    merged.push(current_group);

    tracing::debug!(groups = merged.len(), "grouped nearby boxes");
    merged
}
