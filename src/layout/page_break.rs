//! # Page Break Decisions
//!
//! Logic for deciding when and how to break content across pages. Every rule
//! the report layout applies at a page boundary lives here, as a pure function
//! of heights and positions, so the engine itself only executes decisions.

/// Decide what to do when a block may not fit on the current page.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// Place the entire block on the current page (it fits).
    Place,
    /// Move the entire block to the next page.
    MoveToNextPage,
    /// Split the block: place some lines here, continue on the next page.
    Split {
        /// How many lines fit on the current page.
        items_on_current_page: usize,
    },
}

/// Given the remaining space on a page and a list of line heights,
/// decide how to break.
pub fn decide_break(
    remaining_height: f64,
    child_heights: &[f64],
    is_breakable: bool,
    min_orphan_lines: usize,
    min_widow_lines: usize,
) -> BreakDecision {
    let total: f64 = child_heights.iter().sum();

    // Small epsilon so lines that exactly fill the page are not pushed over
    // by float accumulation.
    if total <= remaining_height + 1e-6 {
        return BreakDecision::Place;
    }

    if !is_breakable {
        return BreakDecision::MoveToNextPage;
    }

    let mut running = 0.0;
    let mut fit_count = 0;
    for &h in child_heights {
        if running + h > remaining_height + 1e-6 {
            break;
        }
        running += h;
        fit_count += 1;
    }

    let total_items = child_heights.len();

    // Would we leave too few lines on the current page? (orphan)
    if fit_count < min_orphan_lines && fit_count < total_items {
        return BreakDecision::MoveToNextPage;
    }

    // Would we leave too few lines on the next page? (widow)
    let remaining_items = total_items - fit_count;
    if remaining_items < min_widow_lines && remaining_items > 0 {
        let adjusted = fit_count.saturating_sub(min_widow_lines - remaining_items);
        if adjusted == 0 {
            return BreakDecision::MoveToNextPage;
        }
        return BreakDecision::Split {
            items_on_current_page: adjusted,
        };
    }

    if fit_count == 0 {
        return BreakDecision::MoveToNextPage;
    }

    BreakDecision::Split {
        items_on_current_page: fit_count,
    }
}

/// Does the next photo need a fresh page? `slot_index` is the slot it would
/// occupy on the current photo page.
pub fn decide_photo(slot_index: usize, slots_per_page: usize) -> BreakDecision {
    if slot_index >= slots_per_page {
        BreakDecision::MoveToNextPage
    } else {
        BreakDecision::Place
    }
}

/// Signatures after text-only content: stay on the page when at least
/// `min_space` millimetres remain between the cursor and the bottom edge.
pub fn decide_signatures_after_text(cursor_y: f64, page_height: f64, min_space: f64) -> BreakDecision {
    if page_height - cursor_y >= min_space {
        BreakDecision::Place
    } else {
        BreakDecision::MoveToNextPage
    }
}

/// Signatures on the last photo page sit at a fixed offset from the bottom.
/// They share the page unless the photo slots already reach into that band,
/// which happens when the last photo page is full.
pub fn decide_signatures_after_photos(occupied_bottom: f64, signature_top: f64) -> BreakDecision {
    if occupied_bottom <= signature_top + 1e-6 {
        BreakDecision::Place
    } else {
        BreakDecision::MoveToNextPage
    }
}
