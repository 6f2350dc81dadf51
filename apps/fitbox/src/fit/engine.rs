//! Best-fit font-size search.
//!
//! The search clones the container into an off-screen probe, seeds a font
//! size from the height ratio and then walks one pixel at a time until the
//! probe stops overflowing (or stops underflowing). Every measurement is
//! truncated to whole pixels before it is compared.
//!
//! The returned size ignores the instance's min/max bounds; clamping happens
//! in [`crate::fit::constraints`].

use tracing::{debug, warn};

use crate::fit::measurer::{BoxSize, ContainerSnapshot, Measurer};

/// Whole CSS pixels.
pub type Px = i64;

/// Default cap on probe attempts per search.
pub const DEFAULT_MAX_TRY_AMOUNT: u32 = 300;

/// Smallest font size the probe is ever stepped down to.
pub const MIN_PROBE_FONT_SIZE: Px = 1;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Immutable input to one search.
#[derive(Debug, Clone, PartialEq)]
pub struct FitRequest {
    pub snapshot: ContainerSnapshot,
    /// Box the probe has to fit into. Normally the container's own box.
    pub target: BoxSize,
    pub max_iterations: u32,
    /// Treat horizontal overflow (scroll width > target width) as overflow.
    pub width_aware: bool,
}

impl FitRequest {
    pub fn new(snapshot: ContainerSnapshot) -> Self {
        let target = snapshot.size();
        FitRequest {
            snapshot,
            target,
            max_iterations: DEFAULT_MAX_TRY_AMOUNT,
            width_aware: true,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_width_aware(mut self, width_aware: bool) -> Self {
        self.width_aware = width_aware;
        self
    }
}

/// Outcome of one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitResult {
    /// Largest size found that does not overflow.
    Fit { font_size: Px },
    /// The attempt cap was exceeded. Carries the size the host had before
    /// the search, which is what the caller keeps.
    GaveUp { last_tried_font_size: Px },
    /// Nothing to fit: no text, or a zero-sized box.
    Empty,
}

/// Probe measurements after the latest font-size change.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ProbeState {
    font_size: f64,
    measured_width: Px,
    measured_height: Px,
}

impl ProbeState {
    fn measure<M: Measurer>(measurer: &M, probe: &M::Probe, font_size: f64) -> Self {
        let size = measurer.measure(probe);
        ProbeState {
            font_size,
            measured_width: truncate_px(size.width),
            measured_height: truncate_px(size.height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Decrease,
    Increase,
}

/// Whole-pixel target box.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    width: Px,
    height: Px,
    width_aware: bool,
}

impl Bounds {
    fn overflows(&self, state: &ProbeState) -> bool {
        state.measured_height > self.height
            || (self.width_aware && state.measured_width > self.width)
    }

    fn underflows(&self, state: &ProbeState) -> bool {
        state.measured_height < self.height
            && (!self.width_aware || state.measured_width <= self.width)
    }

    /// `None` when the probe already sits exactly in bounds.
    fn direction(&self, state: &ProbeState) -> Option<Direction> {
        if self.overflows(state) {
            Some(Direction::Decrease)
        } else if self.underflows(state) {
            Some(Direction::Increase)
        } else {
            None
        }
    }

    fn should_continue(&self, direction: Direction, state: &ProbeState) -> bool {
        match direction {
            Direction::Decrease => self.overflows(state),
            Direction::Increase => self.underflows(state),
        }
    }
}

impl Direction {
    fn step(self) -> Px {
        match self {
            Direction::Decrease => -1,
            Direction::Increase => 1,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Runs best-fit searches against an injected [`Measurer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FitEngine {
    /// Emit per-step diagnostics.
    pub debug: bool,
}

impl FitEngine {
    pub fn new(debug: bool) -> Self {
        FitEngine { debug }
    }

    /// Finds the largest font size at which the probe fits the request's
    /// target box.
    ///
    /// Exactly one probe is created and it is removed on every return path.
    pub fn find_best_font_size<M: Measurer>(
        &self,
        measurer: &mut M,
        request: &FitRequest,
    ) -> FitResult {
        let bounds = Bounds {
            width: truncate_px(request.target.width),
            height: truncate_px(request.target.height),
            width_aware: request.width_aware,
        };
        let original_font_size = truncate_px(request.snapshot.font_size);

        let mut probe = measurer.create_probe(&request.snapshot);
        let initial = ProbeState::measure(measurer, &probe, request.snapshot.font_size);

        if self.debug {
            debug!(
                host_width = bounds.width,
                host_height = bounds.height,
                probe_width = initial.measured_width,
                probe_height = initial.measured_height,
                "find_best_font_size() is executed"
            );
        }

        if bounds.width == 0
            || bounds.height == 0
            || initial.measured_width == 0
            || initial.measured_height == 0
            || request.snapshot.content.trim().is_empty()
        {
            if self.debug {
                debug!("No text or height equals to 0");
            }
            measurer.remove_probe(probe);
            return FitResult::Empty;
        }

        let seed = original_font_size as f64 * seed_ratio(bounds.height, initial.measured_height);
        // A negative font size is rejected by the renderer; the probe keeps
        // the size it was cloned with.
        let seed = if seed >= 0.0 { seed } else { initial.font_size };
        measurer.set_probe_font_size(&mut probe, seed);
        let mut state = ProbeState::measure(measurer, &probe, seed);

        let Some(direction) = bounds.direction(&state) else {
            if self.debug {
                debug!(font_size = seed, "Seeded font size is already the best");
            }
            measurer.remove_probe(probe);
            return FitResult::Fit {
                font_size: truncate_px(seed),
            };
        };

        if self.debug {
            debug!(?direction, seed, "Stepping probe font size");
        }

        let mut attempts: u32 = 0;
        while bounds.should_continue(direction, &state) {
            let next = truncate_px(state.font_size) + direction.step();
            if next < MIN_PROBE_FONT_SIZE {
                warn!(
                    original_font_size,
                    "No font size down to {MIN_PROBE_FONT_SIZE}px fits. Give up!"
                );
                measurer.remove_probe(probe);
                return FitResult::GaveUp {
                    last_tried_font_size: original_font_size,
                };
            }

            measurer.set_probe_font_size(&mut probe, next as f64);
            state = ProbeState::measure(measurer, &probe, next as f64);
            if self.debug {
                debug!(
                    font_size = next,
                    width = state.measured_width,
                    height = state.measured_height,
                    "Try"
                );
            }

            attempts += 1;
            if attempts > request.max_iterations {
                warn!(
                    max_try_amount = request.max_iterations,
                    original_font_size, "Exceed legal detecting amount. Give up!"
                );
                measurer.remove_probe(probe);
                return FitResult::GaveUp {
                    last_tried_font_size: original_font_size,
                };
            }
        }

        measurer.remove_probe(probe);

        // Back off one more pixel in both directions.
        let best = truncate_px(state.font_size) - 1;
        if best < MIN_PROBE_FONT_SIZE {
            warn!(
                original_font_size,
                "Backing off would drop below {MIN_PROBE_FONT_SIZE}px. Give up!"
            );
            return FitResult::GaveUp {
                last_tried_font_size: original_font_size,
            };
        }
        if self.debug {
            debug!(font_size = best, attempts, "Best font size found");
        }
        FitResult::Fit { font_size: best }
    }
}

/// Logarithmically damped height ratio used to seed the search.
pub fn seed_ratio(host_height: Px, probe_height: Px) -> f64 {
    (host_height as f64 / probe_height as f64).ln() + 1.0
}

/// Integer-prefix truncation toward zero. Non-finite input maps to 0.
pub fn truncate_px(value: f64) -> Px {
    if value.is_finite() {
        value.trunc() as Px
    } else {
        0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::measurer::ContainerId;
    use crate::fit::testing::ScriptedMeasurer;

    fn snapshot(width: f64, height: f64, font_size: f64) -> ContainerSnapshot {
        ContainerSnapshot {
            container: ContainerId::new(),
            content: "Grow or shrink me".to_string(),
            font_size,
            width,
            height,
        }
    }

    // ── seed ────────────────────────────────────────────────────────────────

    #[test]
    fn test_seed_ratio_is_log_plus_one() {
        assert_eq!(seed_ratio(50, 32), (50.0_f64 / 32.0).ln() + 1.0);
        assert!((seed_ratio(50, 32) - 1.446_287_102_628_42).abs() < 1e-12);
        assert_eq!(seed_ratio(40, 40), 1.0);
    }

    #[test]
    fn test_truncate_px_behaves_like_integer_prefix() {
        assert_eq!(truncate_px(23.9), 23);
        assert_eq!(truncate_px(-0.4), 0);
        assert_eq!(truncate_px(f64::NAN), 0);
        assert_eq!(truncate_px(f64::INFINITY), 0);
    }

    // ── increase / decrease paths ───────────────────────────────────────────

    #[test]
    fn test_increase_path_backs_off_one_pixel() {
        // Two lines of line-height 1.0: height = 2 * size.
        // seed = 16 * (ln(50/32) + 1) ≈ 23.14 → 24 (48) → 25 (50) stops.
        let mut measurer = ScriptedMeasurer::new(|size| BoxSize::new(100.0, 2.0 * size));
        let request = FitRequest::new(snapshot(100.0, 50.0, 16.0));
        let result = FitEngine::default().find_best_font_size(&mut measurer, &request);

        assert_eq!(result, FitResult::Fit { font_size: 24 });
        assert_eq!(measurer.tried_sizes()[2..], [24.0, 25.0]);
        assert_eq!(measurer.live_probes(), 0);
    }

    #[test]
    fn test_decrease_path_backs_off_one_pixel() {
        // height = size² / 8; seed ≈ 23.14 gives 66px in a 50px box.
        let mut measurer =
            ScriptedMeasurer::new(|size| BoxSize::new(100.0, size * size / 8.0));
        let request = FitRequest::new(snapshot(100.0, 50.0, 16.0));
        let result = FitEngine::default().find_best_font_size(&mut measurer, &request);

        assert_eq!(result, FitResult::Fit { font_size: 19 });
        assert_eq!(measurer.tried_sizes()[2..], [22.0, 21.0, 20.0]);
        assert_eq!(measurer.live_probes(), 0);
    }

    #[test]
    fn test_seed_already_in_bounds_stops_immediately() {
        let mut measurer = ScriptedMeasurer::new(|_| BoxSize::new(100.0, 50.0));
        let request = FitRequest::new(snapshot(100.0, 50.0, 16.0));
        let result = FitEngine::default().find_best_font_size(&mut measurer, &request);

        assert_eq!(result, FitResult::Fit { font_size: 16 });
        // Clone + seed only; no stepping.
        assert_eq!(measurer.tried_sizes().len(), 2);
        assert_eq!(measurer.live_probes(), 0);
    }

    // ── width awareness ─────────────────────────────────────────────────────

    #[test]
    fn test_width_aware_search_stops_on_horizontal_overflow() {
        // One long unbreakable word: scroll width = 10 * size, one line high.
        let measure = |size: f64| BoxSize::new(10.0 * size, 1.2 * size);
        let mut measurer = ScriptedMeasurer::new(measure);
        let request = FitRequest::new(snapshot(200.0, 100.0, 16.0));
        let result = FitEngine::default().find_best_font_size(&mut measurer, &request);

        assert_eq!(result, FitResult::Fit { font_size: 19 });
        assert!(10.0 * 19.0 <= 200.0);
    }

    #[test]
    fn test_height_only_search_ignores_width() {
        let measure = |size: f64| BoxSize::new(10.0 * size, 1.2 * size);
        let mut measurer = ScriptedMeasurer::new(measure);
        let request = FitRequest::new(snapshot(200.0, 100.0, 16.0)).with_width_aware(false);
        let result = FitEngine::default().find_best_font_size(&mut measurer, &request);

        // 84 * 1.2 = 100.8 stops the climb; back off to 83.
        assert_eq!(result, FitResult::Fit { font_size: 83 });
    }

    #[test]
    fn test_fit_never_overflows() {
        let measures: [fn(f64) -> BoxSize; 3] = [
            |s| BoxSize::new(100.0, 2.0 * s),
            |s| BoxSize::new(100.0, s * s / 8.0),
            |s| BoxSize::new(7.5 * s, 3.1 * s),
        ];
        for measure in measures {
            for (width, height) in [(100.0, 50.0), (300.0, 90.0), (150.0, 400.0)] {
                let mut measurer = ScriptedMeasurer::new(measure);
                let request = FitRequest::new(snapshot(width, height, 16.0));
                if let FitResult::Fit { font_size } =
                    FitEngine::default().find_best_font_size(&mut measurer, &request)
                {
                    let size = measure(font_size as f64);
                    assert!(truncate_px(size.height) <= truncate_px(height));
                    assert!(truncate_px(size.width) <= truncate_px(width));
                }
            }
        }
    }

    // ── give up ─────────────────────────────────────────────────────────────

    #[test]
    fn test_gives_up_after_max_iterations() {
        let measure = |size: f64| BoxSize::new(10.0 * size, 1.2 * size);
        let mut measurer = ScriptedMeasurer::new(measure);
        let request = FitRequest::new(snapshot(200.0, 100.0, 16.0)).with_max_iterations(5);
        let result = FitEngine::default().find_best_font_size(&mut measurer, &request);

        assert_eq!(
            result,
            FitResult::GaveUp {
                last_tried_font_size: 16
            }
        );
        // Clone + seed + six steps (the sixth exceeds the cap).
        assert_eq!(measurer.tried_sizes().len(), 8);
        assert_eq!(measurer.live_probes(), 0);
    }

    #[test]
    fn test_gives_up_when_nothing_fits_down_to_one_pixel() {
        let mut measurer = ScriptedMeasurer::new(|_| BoxSize::new(100.0, 1000.0));
        let request = FitRequest::new(snapshot(100.0, 50.0, 16.5));
        let result = FitEngine::default().find_best_font_size(&mut measurer, &request);

        assert_eq!(
            result,
            FitResult::GaveUp {
                last_tried_font_size: 16
            }
        );
        assert_eq!(measurer.tried_sizes().last(), Some(&1.0));
        assert_eq!(measurer.live_probes(), 0);
    }

    #[test]
    fn test_gives_up_when_only_one_pixel_fits() {
        // Backing off from 1px would leave nothing visible.
        let measure = |size: f64| BoxSize::new(100.0, if size <= 1.0 { 10.0 } else { 1000.0 });
        let mut measurer = ScriptedMeasurer::new(measure);
        let request = FitRequest::new(snapshot(100.0, 50.0, 16.0));
        let result = FitEngine::default().find_best_font_size(&mut measurer, &request);

        assert_eq!(
            result,
            FitResult::GaveUp {
                last_tried_font_size: 16
            }
        );
        assert_eq!(measurer.tried_sizes().last(), Some(&1.0));
        assert_eq!(measurer.live_probes(), 0);
    }

    // ── empty ───────────────────────────────────────────────────────────────

    #[test]
    fn test_whitespace_content_is_empty() {
        let mut measurer = ScriptedMeasurer::new(|s| BoxSize::new(100.0, s));
        let mut snap = snapshot(100.0, 50.0, 16.0);
        snap.content = "  \n\t ".to_string();
        let result = FitEngine::default().find_best_font_size(&mut measurer, &FitRequest::new(snap));

        assert_eq!(result, FitResult::Empty);
        assert_eq!(measurer.live_probes(), 0);
    }

    #[test]
    fn test_zero_height_container_is_empty() {
        let mut measurer = ScriptedMeasurer::new(|s| BoxSize::new(100.0, s));
        let request = FitRequest::new(snapshot(100.0, 0.0, 16.0));
        assert_eq!(
            FitEngine::default().find_best_font_size(&mut measurer, &request),
            FitResult::Empty
        );
        assert_eq!(measurer.live_probes(), 0);
    }

    #[test]
    fn test_zero_probe_height_is_empty() {
        let mut measurer = ScriptedMeasurer::new(|_| BoxSize::new(100.0, 0.4));
        let request = FitRequest::new(snapshot(100.0, 50.0, 16.0));
        assert_eq!(
            FitEngine::default().find_best_font_size(&mut measurer, &request),
            FitResult::Empty
        );
    }
}
