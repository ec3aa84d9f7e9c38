//! Pure positional math: given the registry's toast list, derive each toast's
//! vertical offset within its position bucket, plus the collapsed-stack
//! refinement used when a container renders its bucket as a hoverable pile.

use crate::types::{Position, Toast, ToastId};

/// Spacing between stacked toasts in the same bucket, in pixels.
pub const DEFAULT_GUTTER: f32 = 8.0;
/// Spacing between toasts in an expanded collapsed-stack pile.
pub const STACK_GAP: f32 = 12.0;
/// Vertical compression applied to a collapsed pile.
const COLLAPSE_FACTOR: f32 = 0.2;
/// Scale shrink per toast behind the front of a collapsed pile.
const COLLAPSE_SCALE_STEP: f32 = 0.025;

#[derive(Clone, Copy, Debug)]
pub struct OffsetOptions {
    /// Mirror the stacking direction, used for bottom-anchored buckets.
    pub reverse_order: bool,
    pub gutter: f32,
    /// Bucket for toasts that carry no position of their own.
    pub default_position: Position,
}

impl Default for OffsetOptions {
    fn default() -> Self {
        Self {
            reverse_order: false,
            gutter: DEFAULT_GUTTER,
            default_position: Position::TopCenter,
        }
    }
}

/// Vertical offset of `target` within its bucket: the summed heights (plus
/// gutter) of the visible, measured siblings stacked before it.
///
/// Toasts without a measured height do not participate; a target that has not
/// been measured yet sits at offset 0.
#[must_use]
pub fn calculate_offset(toasts: &[Toast], target: &Toast, options: &OffsetOptions) -> f32 {
    let bucket = resolved_position(target, options.default_position);
    let relevant: Vec<&Toast> = toasts
        .iter()
        .filter(|t| resolved_position(t, options.default_position) == bucket && t.height.is_some())
        .collect();

    let Some(index) = relevant.iter().position(|t| t.id == target.id) else {
        return 0.0;
    };
    let toasts_before = relevant[..index].iter().filter(|t| t.visible).count();

    let visible: Vec<&&Toast> = relevant.iter().filter(|t| t.visible).collect();
    let slice: &[&&Toast] = if options.reverse_order {
        visible.get(toasts_before + 1..).unwrap_or(&[])
    } else {
        &visible[..toasts_before]
    };

    slice
        .iter()
        .map(|t| t.height.unwrap_or(0.0) + options.gutter)
        .sum()
}

/// Placement of one toast inside a collapsed-stack bucket.
#[derive(Clone, Debug, PartialEq)]
pub struct StackSlot {
    pub id: ToastId,
    /// Vertical translation in pixels, negative for bottom buckets.
    pub offset: f32,
    /// Render scale; the front toast keeps 1.0, toasts behind it shrink.
    pub scale: f32,
    /// Whether the toast is hidden behind the front of a collapsed pile.
    pub collapsed: bool,
}

/// Collapsed-stack placements for every visible, measured toast, bucket by
/// bucket. `collapsed = false` expands the pile to naturally gapped offsets,
/// as when the container is hovered.
///
/// Uses the same bucket partitioning as [`calculate_offset`]; within a bucket
/// toasts are placed oldest first, so the oldest toast sits at the front of
/// the pile at full scale.
#[must_use]
pub fn stacked_offsets(toasts: &[Toast], collapsed: bool, options: &OffsetOptions) -> Vec<StackSlot> {
    let mut slots = Vec::new();
    let mut buckets: Vec<Position> = Vec::new();
    for toast in toasts {
        let bucket = resolved_position(toast, options.default_position);
        if !buckets.contains(&bucket) {
            buckets.push(bucket);
        }
    }

    for bucket in buckets {
        let members: Vec<&Toast> = toasts
            .iter()
            .filter(|t| {
                resolved_position(t, options.default_position) == bucket
                    && t.height.is_some()
                    && t.visible
            })
            .collect();

        let mut used_height = 0.0_f32;
        let mut scale_shrink = 0.0_f32;
        for (index, toast) in members.iter().rev().enumerate() {
            let y = if collapsed {
                used_height * COLLAPSE_FACTOR
            } else {
                used_height + STACK_GAP * index_as_f32(index)
            };
            slots.push(StackSlot {
                id: toast.id.clone(),
                offset: if bucket.is_top() { y } else { -y },
                scale: if collapsed { 1.0 - scale_shrink } else { 1.0 },
                collapsed: collapsed && index > 0,
            });
            used_height += toast.height.unwrap_or(0.0);
            scale_shrink += COLLAPSE_SCALE_STEP;
        }
    }
    slots
}

fn resolved_position(toast: &Toast, default_position: Position) -> Position {
    toast.position.unwrap_or(default_position)
}

#[allow(clippy::cast_precision_loss)]
fn index_as_f32(index: usize) -> f32 {
    index as f32
}
