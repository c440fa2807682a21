//! Single-pointer touch gesture state machine
//!
//! A gesture starts on touch-down, where the hit resolver decides whether it
//! drags a corner, moves the selected region or only changes the selection.
//! Moves are applied as deltas from the previous touch position.

use crate::config::CropConfig;
use crate::domain::{DragMode, HitResult, Point, RectF, RegionSet};

/// Phase of a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// Pointer event in view coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub x: f32,
    pub y: f32,
}

impl TouchEvent {
    pub fn new(phase: TouchPhase, x: f32, y: f32) -> Self {
        Self { phase, x, y }
    }

    pub fn down(x: f32, y: f32) -> Self {
        Self::new(TouchPhase::Down, x, y)
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(TouchPhase::Move, x, y)
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self::new(TouchPhase::Up, x, y)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// What handling an event did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GestureOutcome {
    /// The event belonged to the crop view
    pub consumed: bool,
    /// Regions or selection changed
    pub redraw: bool,
}

impl GestureOutcome {
    const IGNORED: Self = Self {
        consumed: false,
        redraw: false,
    };

    fn consumed(redraw: bool) -> Self {
        Self {
            consumed: true,
            redraw,
        }
    }
}

/// Gesture state between pointer events
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    /// A drag bound to one region for the rest of the gesture
    Dragging {
        mode: DragMode,
        region: usize,
        last: Point,
    },
}

impl GestureState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, GestureState::Dragging { .. })
    }

    /// Feed one pointer event through the state machine
    ///
    /// `bounds` is the fit rectangle every corner must stay inside.
    pub fn handle(
        &mut self,
        event: TouchEvent,
        regions: &mut RegionSet,
        bounds: &RectF,
        config: &CropConfig,
    ) -> GestureOutcome {
        match event.phase {
            TouchPhase::Down => self.touch_down(event, regions, config),
            TouchPhase::Move => self.touch_move(event, regions, bounds),
            TouchPhase::Up | TouchPhase::Cancel => {
                let was_dragging = self.is_dragging();
                *self = GestureState::Idle;
                GestureOutcome::consumed(was_dragging)
            }
        }
    }

    fn touch_down(
        &mut self,
        event: TouchEvent,
        regions: &mut RegionSet,
        config: &CropConfig,
    ) -> GestureOutcome {
        *self = GestureState::Idle;
        let hit = regions.resolve_touch(
            event.x,
            event.y,
            config.corner_touch_radius(),
            config.select_padding(),
        );
        log::debug!("Touch down at ({}, {}): {:?}", event.x, event.y, hit);

        match hit {
            HitResult::Select(index) => {
                regions.select(Some(index));
                GestureOutcome::consumed(true)
            }
            HitResult::Corner(_) | HitResult::Move => {
                let Some(region) = regions.selected() else {
                    return GestureOutcome::IGNORED;
                };
                *self = GestureState::Dragging {
                    mode: hit.drag_mode(),
                    region,
                    last: event.position(),
                };
                GestureOutcome::consumed(true)
            }
            HitResult::Nothing => GestureOutcome::IGNORED,
        }
    }

    fn touch_move(&mut self, event: TouchEvent, regions: &mut RegionSet, bounds: &RectF) -> GestureOutcome {
        let GestureState::Dragging { mode, region, last } = self else {
            return GestureOutcome::IGNORED;
        };
        let dx = event.x - last.x;
        let dy = event.y - last.y;
        *last = event.position();

        let Some(quad) = regions.get_mut(*region) else {
            return GestureOutcome::consumed(false);
        };
        let changed = match *mode {
            DragMode::Corner(corner) => {
                let before = quad.corner(corner);
                quad.move_corner(corner, dx, dy, bounds);
                quad.corner(corner) != before
            }
            DragMode::Move => quad.translate_within(dx, dy, bounds),
            DragMode::None => false,
        };
        if changed {
            regions.mark_dirty();
        }
        GestureOutcome::consumed(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Corner, Quad};
    use proptest::prelude::*;

    fn bounds() -> RectF {
        RectF::new(0.0, 0.0, 500.0, 1000.0)
    }

    fn single_region() -> RegionSet {
        let mut regions = RegionSet::new();
        regions.push(Quad::from_rect(RectF::new(100.0, 100.0, 300.0, 300.0)), true);
        regions
    }

    #[test]
    fn test_corner_drag_clamps_to_bounds() {
        let config = CropConfig::default();
        let mut regions = single_region();
        let mut state = GestureState::Idle;

        let out = state.handle(TouchEvent::down(105.0, 105.0), &mut regions, &bounds(), &config);
        assert!(out.consumed);
        assert!(matches!(
            state,
            GestureState::Dragging {
                mode: DragMode::Corner(Corner::TopLeft),
                ..
            }
        ));

        state.handle(TouchEvent::moved(-195.0, 10.0), &mut regions, &bounds(), &config);
        let quad = regions.get(0).unwrap();
        assert_eq!(quad.corner(Corner::TopLeft), Point::new(0.0, 5.0));
        assert_eq!(quad.corner(Corner::BottomRight), Point::new(300.0, 300.0));

        let out = state.handle(TouchEvent::up(-195.0, 10.0), &mut regions, &bounds(), &config);
        assert!(out.consumed);
        assert_eq!(state, GestureState::Idle);
    }

    #[test]
    fn test_move_rejected_past_edge() {
        let config = CropConfig::default();
        let mut regions = single_region();
        let mut state = GestureState::Idle;

        state.handle(TouchEvent::down(200.0, 200.0), &mut regions, &bounds(), &config);
        assert!(matches!(state, GestureState::Dragging { mode: DragMode::Move, .. }));

        let out = state.handle(TouchEvent::moved(250.0, 220.0), &mut regions, &bounds(), &config);
        assert!(out.redraw);
        assert_eq!(
            regions.get(0).unwrap().bounding_rect(),
            RectF::new(150.0, 120.0, 350.0, 320.0)
        );

        // Would push the left edge below zero: the whole move is dropped
        let out = state.handle(TouchEvent::moved(0.0, 300.0), &mut regions, &bounds(), &config);
        assert!(out.consumed);
        assert!(!out.redraw);
        assert_eq!(
            regions.get(0).unwrap().bounding_rect(),
            RectF::new(150.0, 120.0, 350.0, 320.0)
        );
    }

    #[test]
    fn test_tap_selects_without_dragging() {
        let config = CropConfig::default();
        let mut regions = single_region();
        regions.push(Quad::from_rect(RectF::new(100.0, 600.0, 400.0, 900.0)), false);
        let mut state = GestureState::Idle;

        let out = state.handle(TouchEvent::down(250.0, 750.0), &mut regions, &bounds(), &config);
        assert_eq!(out, GestureOutcome { consumed: true, redraw: true });
        assert_eq!(regions.selected(), Some(1));
        assert_eq!(state, GestureState::Idle);

        // Moving after a tap does nothing
        let out = state.handle(TouchEvent::moved(260.0, 760.0), &mut regions, &bounds(), &config);
        assert!(!out.consumed);
        assert_eq!(
            regions.get(1).unwrap().bounding_rect(),
            RectF::new(100.0, 600.0, 400.0, 900.0)
        );
    }

    #[test]
    fn test_touch_on_empty_space_not_consumed() {
        let config = CropConfig::default();
        let mut regions = single_region();
        let mut state = GestureState::Idle;
        let out = state.handle(TouchEvent::down(450.0, 900.0), &mut regions, &bounds(), &config);
        assert_eq!(out, GestureOutcome::default());
        assert_eq!(regions.selected(), Some(0));
    }

    #[test]
    fn test_drag_stays_on_grabbed_region() {
        let config = CropConfig::default();
        let mut regions = single_region();
        regions.push(Quad::from_rect(RectF::new(100.0, 500.0, 300.0, 700.0)), false);
        let mut state = GestureState::Idle;

        state.handle(TouchEvent::down(200.0, 200.0), &mut regions, &bounds(), &config);
        // Pointer passes over the other region, but the drag keeps moving region 0
        state.handle(TouchEvent::moved(200.0, 400.0), &mut regions, &bounds(), &config);
        assert_eq!(
            regions.get(0).unwrap().bounding_rect(),
            RectF::new(100.0, 300.0, 300.0, 500.0)
        );
        assert_eq!(
            regions.get(1).unwrap().bounding_rect(),
            RectF::new(100.0, 500.0, 300.0, 700.0)
        );
    }

    #[test]
    fn test_cancel_resets() {
        let config = CropConfig::default();
        let mut regions = single_region();
        let mut state = GestureState::Idle;
        state.handle(TouchEvent::down(200.0, 200.0), &mut regions, &bounds(), &config);
        let out = state.handle(
            TouchEvent::new(TouchPhase::Cancel, 0.0, 0.0),
            &mut regions,
            &bounds(),
            &config,
        );
        assert!(out.consumed);
        assert!(!state.is_dragging());
    }

    /// One step of a random gesture script
    #[derive(Debug, Clone)]
    enum Step {
        /// Touch down on a corner of a region, or at a free position
        Down { region: usize, corner: Option<usize>, x: f32, y: f32 },
        Move { x: f32, y: f32 },
        Up,
        Cancel,
    }

    fn step_strategy() -> impl Strategy<Value = Step> {
        prop_oneof![
            2 => (0..3usize, prop::option::of(0..4usize), -200.0f32..700.0, -200.0f32..1200.0)
                .prop_map(|(region, corner, x, y)| Step::Down { region, corner, x, y }),
            3 => (-400.0f32..900.0, -400.0f32..1400.0).prop_map(|(x, y)| Step::Move { x, y }),
            1 => Just(Step::Up),
            1 => Just(Step::Cancel),
        ]
    }

    proptest! {
        #[test]
        fn prop_drags_keep_corners_in_bounds(
            rects in prop::collection::vec((0.0f32..400.0, 0.0f32..900.0, 10.0f32..100.0, 10.0f32..100.0), 1..4),
            steps in prop::collection::vec(step_strategy(), 1..60),
        ) {
            let config = CropConfig::default();
            let bounds = bounds();
            let mut regions = RegionSet::new();
            for &(l, t, w, h) in &rects {
                regions.push(Quad::from_rect(RectF::new(l, t, l + w, t + h)), true);
            }
            prop_assert!(regions.all_within(&bounds));

            let mut state = GestureState::Idle;
            for step in steps {
                let event = match step {
                    Step::Down { region, corner: Some(corner), .. } if region < regions.len() => {
                        let p = regions.get(region).unwrap().points()[corner];
                        TouchEvent::down(p.x, p.y)
                    }
                    Step::Down { x, y, .. } => TouchEvent::down(x, y),
                    Step::Move { x, y } => TouchEvent::moved(x, y),
                    Step::Up => TouchEvent::up(0.0, 0.0),
                    Step::Cancel => TouchEvent::new(TouchPhase::Cancel, 0.0, 0.0),
                };
                state.handle(event, &mut regions, &bounds, &config);
                prop_assert!(regions.all_within(&bounds), "{:?} after {:?}", regions.regions(), event);
            }
        }
    }
}
