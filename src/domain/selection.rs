//! Region collection, selection and touch hit-testing

use super::geometry::RectF;
use super::region::{Corner, Quad};

/// Interpretation of an in-progress drag
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    #[default]
    None,
    /// Move the whole region
    Move,
    /// Resize by dragging one corner
    Corner(Corner),
}

/// Outcome of resolving a touch-down against the region collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    /// Drag a corner of the selected region
    Corner(Corner),
    /// Switch selection to another region
    Select(usize),
    /// Move the selected region
    Move,
    Nothing,
}

impl HitResult {
    /// Drag mode started by this hit, if any
    pub fn drag_mode(self) -> DragMode {
        match self {
            HitResult::Corner(corner) => DragMode::Corner(corner),
            HitResult::Move => DragMode::Move,
            HitResult::Select(_) | HitResult::Nothing => DragMode::None,
        }
    }
}

/// Ordered crop regions with at most one selected
///
/// Append order is z-order: later regions draw on top and are hit-tested first.
#[derive(Debug, Clone, Default)]
pub struct RegionSet {
    regions: Vec<Quad>,
    selected: Option<usize>,
    /// Set whenever regions or selection change
    dirty: bool,
}

impl RegionSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> &[Quad] {
        &self.regions
    }

    pub fn get(&self, index: usize) -> Option<&Quad> {
        self.regions.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Quad> {
        self.regions.get_mut(index)
    }

    /// Selected index, only ever a valid index into the collection
    pub fn selected(&self) -> Option<usize> {
        self.selected.filter(|&i| i < self.regions.len())
    }

    pub fn selected_quad(&self) -> Option<&Quad> {
        self.selected().and_then(|i| self.regions.get(i))
    }

    pub fn selected_quad_mut(&mut self) -> Option<&mut Quad> {
        let index = self.selected()?;
        self.regions.get_mut(index)
    }

    /// Select a region; out-of-range indices clear the selection
    pub fn select(&mut self, index: Option<usize>) {
        let index = index.filter(|&i| i < self.regions.len());
        if self.selected != index {
            self.selected = index;
            self.mark_dirty();
        }
    }

    /// Append a region on top, optionally selecting it; returns its index
    pub fn push(&mut self, quad: Quad, select: bool) -> usize {
        self.regions.push(quad);
        let index = self.regions.len() - 1;
        if select {
            self.selected = Some(index);
        }
        self.mark_dirty();
        index
    }

    /// Remove the selected region
    ///
    /// The selection moves to the last region when the removed entry was the
    /// last one, and becomes `None` when the collection is empty.
    pub fn remove_selected(&mut self) -> Option<Quad> {
        let index = self.selected()?;
        let removed = self.regions.remove(index);
        self.selected = if self.regions.is_empty() {
            None
        } else {
            Some(index.min(self.regions.len() - 1))
        };
        self.mark_dirty();
        Some(removed)
    }

    /// Replace all regions, selecting the first one if any
    pub fn replace_all(&mut self, regions: Vec<Quad>) {
        self.regions = regions;
        self.selected = if self.regions.is_empty() { None } else { Some(0) };
        self.mark_dirty();
    }

    pub fn clear(&mut self) {
        if !self.regions.is_empty() || self.selected.is_some() {
            self.mark_dirty();
        }
        self.regions.clear();
        self.selected = None;
    }

    /// Apply `f` to every region
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut Quad)) {
        for quad in &mut self.regions {
            f(quad);
        }
        if !self.regions.is_empty() {
            self.mark_dirty();
        }
    }

    /// Topmost region whose padded bounding box and exact polygon both contain the point
    pub fn region_at(&self, x: f32, y: f32, padding: f32) -> Option<usize> {
        self.regions
            .iter()
            .enumerate()
            .rev()
            .find(|(_, quad)| quad.bounding_rect().expand(padding).contains(x, y) && quad.contains(x, y))
            .map(|(i, _)| i)
    }

    /// Resolve what a touch-down at (x, y) means
    ///
    /// Precedence: corner of the selected region, then switching to another
    /// region, then moving the selected region.
    pub fn resolve_touch(&self, x: f32, y: f32, corner_radius: f32, select_padding: f32) -> HitResult {
        let selected = self.selected();

        if let Some(corner) = self
            .selected_quad()
            .and_then(|quad| quad.nearest_corner(x, y, corner_radius))
        {
            return HitResult::Corner(corner);
        }

        if let Some(index) = self.region_at(x, y, select_padding)
            && Some(index) != selected
        {
            return HitResult::Select(index);
        }

        if self.selected_quad().is_some_and(|quad| quad.contains(x, y)) {
            return HitResult::Move;
        }

        HitResult::Nothing
    }

    /// Check every corner of every region against `bounds`
    pub fn all_within(&self, bounds: &RectF) -> bool {
        self.regions
            .iter()
            .flat_map(|quad| quad.points().iter())
            .all(|p| bounds.contains(p.x, p.y))
    }
}
