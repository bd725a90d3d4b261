//! Infinite carousel over a cloned-item window.
//!
//! The rendered track is an extended sequence: the last `K` items cloned in
//! front, the `N` originals, the first `K` cloned behind (`K = VISIBLE + 2`).
//! A single extended index (the leftmost fully visible slot) drives both
//! the track offset (`-step * index`) and the per-item opacity ring. Whenever
//! the index would leave the steady range `[K, K+N-1]`, the track teleports
//! by a whole lap of `N` slots before (or instead of) animating, so the user
//! only ever sees a one-lap-free neighbourhood.

use crate::{
    error::{KinemaError, KinemaResult},
    stage::{Channel, NodeId, Stage},
    timeline::{TaskId, Timeline, TweenSpec},
};

/// Fully visible items in the viewport centre.
const VISIBLE: usize = 2;

const OPACITY_FOCUS: f64 = 1.0;
const OPACITY_NEAR: f64 = 0.4;
const OPACITY_FAR: f64 = 0.15;

/// Carousel tuning. Defaults mirror the production values.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub slide: TweenSpec,
    pub opacity: TweenSpec,
    /// Minimum interval between accepted navigation calls.
    pub min_click_interval_ms: f64,
    /// Quiet period after the last resize before the track re-snaps.
    pub resize_debounce_ms: f64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            slide: TweenSpec::new(650.0, crate::ease::Ease::OutCubic),
            opacity: TweenSpec::new(180.0, crate::ease::Ease::OutCubic),
            min_click_interval_ms: 140.0,
            resize_debounce_ms: 60.0,
        }
    }
}

impl CarouselConfig {
    pub fn validate(&self) -> KinemaResult<()> {
        for (name, value) in [
            ("slide.duration_ms", self.slide.duration_ms),
            ("opacity.duration_ms", self.opacity.duration_ms),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(KinemaError::validation(format!(
                    "carousel {name} must be finite and positive, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("min_click_interval_ms", self.min_click_interval_ms),
            ("resize_debounce_ms", self.resize_debounce_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(KinemaError::validation(format!(
                    "carousel {name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// How a navigation is performed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GoMode {
    /// Cancel any slide in flight and land on the target instantly.
    Immediate,
    /// Debounced, mutually exclusive slide tween.
    Animated,
}

/// Extended-index carousel controller. Owns its timeline; the host feeds it
/// navigation calls, resize events and timestamped ticks.
#[derive(Debug)]
pub struct Carousel {
    track: NodeId,
    /// Extended sequence: `K` leading clones, `N` originals, `K` trailing clones.
    items: Vec<NodeId>,
    originals: usize,
    clone_count: usize,
    index: usize,
    config: CarouselConfig,
    timeline: Timeline,
    slide: Option<TaskId>,
    animating: bool,
    last_accept_at: Option<f64>,
    resize_deadline: Option<f64>,
}

impl Carousel {
    /// Build the extended sequence around `originals` and seed the track at
    /// extended index `K` so the first item leads.
    ///
    /// Needs measured metrics: the first item's width plus the track gap must
    /// already form a usable step.
    #[tracing::instrument(skip(stage, originals, config), fields(n = originals.len()))]
    pub fn mount(
        stage: &mut Stage,
        track: NodeId,
        originals: &[NodeId],
        config: CarouselConfig,
    ) -> KinemaResult<Self> {
        config.validate()?;
        let n = originals.len();
        let k = VISIBLE + 2;
        if n == 0 {
            return Err(KinemaError::validation("carousel needs at least one item"));
        }
        if n < k {
            return Err(KinemaError::validation(format!(
                "carousel needs at least {k} items for seamless wraparound, got {n}"
            )));
        }
        if !stage.contains(track) {
            return Err(KinemaError::stage("carousel track node does not exist"));
        }
        if let Some(&missing) = originals.iter().find(|&&id| !stage.contains(id)) {
            return Err(KinemaError::stage(format!(
                "carousel item node {missing:?} does not exist"
            )));
        }

        let mut items = Vec::with_capacity(n + 2 * k);
        for &src in &originals[n - k..] {
            items.push(stage.clone_node(src));
        }
        items.extend_from_slice(originals);
        for &src in &originals[..k] {
            items.push(stage.clone_node(src));
        }

        let mut carousel = Self {
            track,
            items,
            originals: n,
            clone_count: k,
            index: k,
            config,
            timeline: Timeline::new(),
            slide: None,
            animating: false,
            last_accept_at: None,
            resize_deadline: None,
        };
        carousel.go_to(stage, k as i64, GoMode::Immediate, 0.0)?;
        tracing::debug!(index = carousel.index, items = carousel.items.len(), "carousel mounted");
        Ok(carousel)
    }

    pub fn track(&self) -> NodeId {
        self.track
    }

    /// The extended sequence, clones included.
    pub fn items(&self) -> &[NodeId] {
        &self.items
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn clone_count(&self) -> usize {
        self.clone_count
    }

    /// Position of the leftmost visible slot within the original item list.
    pub fn logical_left(&self) -> usize {
        self.ring(self.index as i64 - self.clone_count as i64)
    }

    /// Pixel distance between adjacent slots: first item width + track gap.
    /// Recomputed from live metrics on every use, never cached.
    pub fn step(&self, stage: &Stage) -> KinemaResult<f64> {
        let width = stage.metrics(self.items[0]).width;
        let gap = stage.metrics(self.track).gap;
        let step = width + gap;
        if !step.is_finite() || step <= 0.0 {
            return Err(KinemaError::animation(format!(
                "degenerate carousel step {step} (item width {width}, gap {gap})"
            )));
        }
        Ok(step)
    }

    pub fn prev(&mut self, stage: &mut Stage, now: f64) -> KinemaResult<bool> {
        self.go_to(stage, self.index as i64 - 1, GoMode::Animated, now)
    }

    pub fn next(&mut self, stage: &mut Stage, now: f64) -> KinemaResult<bool> {
        self.go_to(stage, self.index as i64 + 1, GoMode::Animated, now)
    }

    /// Navigate to an extended index. Returns whether the call was accepted:
    /// animated navigation is ignored while a slide is in flight or within
    /// the click interval of the previous accepted call.
    pub fn go_to(
        &mut self,
        stage: &mut Stage,
        target: i64,
        mode: GoMode,
        now: f64,
    ) -> KinemaResult<bool> {
        match mode {
            GoMode::Immediate => {
                self.go_immediate(stage, target)?;
                Ok(true)
            }
            GoMode::Animated => self.go_animated(stage, target, now),
        }
    }

    fn go_immediate(&mut self, stage: &mut Stage, target: i64) -> KinemaResult<()> {
        if let Some(id) = self.slide.take() {
            self.timeline.kill(id);
        }
        self.animating = false;

        let step = self.step(stage)?;
        let index = self.checked_slot(self.wrap_once(target))?;
        self.index = index;
        self.timeline
            .set(stage, self.track, Channel::TranslateX, -step * index as f64);
        self.apply_opacity(stage, 0.0, true);
        Ok(())
    }

    fn go_animated(&mut self, stage: &mut Stage, target: i64, now: f64) -> KinemaResult<bool> {
        if self.animating {
            tracing::debug!(target, "navigation ignored: slide in flight");
            return Ok(false);
        }
        if let Some(last) = self.last_accept_at {
            if now - last < self.config.min_click_interval_ms {
                tracing::debug!(target, since_ms = now - last, "navigation ignored: debounce");
                return Ok(false);
            }
        }

        let step = self.step(stage)?;
        let n = self.originals as i64;
        let left = self.clone_count as i64;
        let right = left + n - 1;

        // Pre-jump: teleport a whole lap so the animated move stays short
        // instead of crossing the clone window.
        let (pre_index, target) = if target < left {
            (Some(self.index as i64 + n), target + n)
        } else if target > right {
            (Some(self.index as i64 - n), target - n)
        } else {
            (None, target)
        };
        let target = self.checked_slot(target)?;

        self.last_accept_at = Some(now);
        self.animating = true;
        if let Some(pre) = pre_index {
            let pre = self.checked_slot(pre)?;
            self.timeline
                .set(stage, self.track, Channel::TranslateX, -step * pre as f64);
            self.index = pre;
            tracing::debug!(index = pre, "pre-jump teleport");
        }

        let id = self.timeline.tween_to(
            stage,
            self.track,
            Channel::TranslateX,
            -step * target as f64,
            self.config.slide,
            now,
        );
        self.slide = Some(id);
        self.index = target;
        self.apply_opacity(stage, now, false);
        tracing::debug!(index = target, "slide started");
        Ok(true)
    }

    /// Teleport the index back into the steady range `[K, K+N-1]` by a whole
    /// lap, snapping the offset and opacities. No-op when already in range.
    pub fn normalize(&mut self, stage: &mut Stage) -> KinemaResult<()> {
        let n = self.originals;
        let k = self.clone_count;
        let wrapped = if self.index < k {
            Some(self.index + n)
        } else if self.index >= k + n {
            Some(self.index - n)
        } else {
            None
        };
        if let Some(index) = wrapped {
            let step = self.step(stage)?;
            self.index = index;
            self.timeline
                .set(stage, self.track, Channel::TranslateX, -step * index as f64);
            self.apply_opacity(stage, 0.0, true);
            tracing::debug!(index, "normalized into steady range");
        }
        Ok(())
    }

    /// Host resize notification. The actual re-snap happens inside `tick`
    /// once the debounce window has been quiet.
    pub fn resize(&mut self, now: f64) {
        self.resize_deadline = Some(now + self.config.resize_debounce_ms);
    }

    /// Advance animations to `now`, expire the resize debounce, and settle a
    /// completed slide onto the rounded pixel grid.
    pub fn tick(&mut self, stage: &mut Stage, now: f64) -> KinemaResult<()> {
        if self.resize_deadline.is_some_and(|deadline| now >= deadline) {
            self.resize_deadline = None;
            self.resnap(stage)?;
        }

        let done = self.timeline.advance(stage, now);
        if let Some(slide) = self.slide {
            if done.contains(&slide) {
                self.slide = None;
                self.animating = false;
                let step = self.step(stage)?;
                self.timeline.set(
                    stage,
                    self.track,
                    Channel::TranslateX,
                    -(step * self.index as f64).round(),
                );
                self.apply_opacity(stage, now, true);
                tracing::debug!(index = self.index, "slide settled");
            } else {
                self.apply_opacity(stage, now, false);
            }
        }
        Ok(())
    }

    /// Recompute the step from live metrics and re-seat the track without
    /// animation. A slide in flight is cancelled and lands on its target
    /// index directly.
    fn resnap(&mut self, stage: &mut Stage) -> KinemaResult<()> {
        let step = self.step(stage)?;
        if let Some(id) = self.slide.take() {
            self.timeline.kill(id);
        }
        self.animating = false;
        self.timeline
            .set(stage, self.track, Channel::TranslateX, -step * self.index as f64);
        self.apply_opacity(stage, 0.0, true);
        tracing::debug!(index = self.index, step, "track re-snapped after resize");
        Ok(())
    }

    /// Opacity ring around the leftmost visible slot: the visible pair at
    /// full strength, their outer neighbours dimmed, everything else faded.
    /// Clones inherit their source's logical position, so both copies of an
    /// item always agree.
    fn apply_opacity(&mut self, stage: &mut Stage, now: f64, immediate: bool) {
        let logical_left = self.logical_left();
        let centre_b = self.ring(logical_left as i64 + 1);
        let near_l = self.ring(logical_left as i64 - 1);
        let near_r = self.ring(logical_left as i64 + 2);

        for slot in 0..self.items.len() {
            let item = self.items[slot];
            let oi = self.ring(slot as i64 - self.clone_count as i64);
            let target = if oi == logical_left || oi == centre_b {
                OPACITY_FOCUS
            } else if oi == near_l || oi == near_r {
                OPACITY_NEAR
            } else {
                OPACITY_FAR
            };
            if immediate {
                self.timeline.set(stage, item, Channel::Opacity, target);
            } else {
                let already = match self.timeline.channel_target(item, Channel::Opacity) {
                    Some(active) => active == target,
                    None => stage.channel(item, Channel::Opacity) == target,
                };
                if !already {
                    self.timeline
                        .tween_to(stage, item, Channel::Opacity, target, self.config.opacity, now);
                }
            }
        }
    }

    /// Map any extended position onto the original list.
    fn ring(&self, extended: i64) -> usize {
        extended.rem_euclid(self.originals as i64) as usize
    }

    fn checked_slot(&self, extended: i64) -> KinemaResult<usize> {
        if (0..self.items.len() as i64).contains(&extended) {
            Ok(extended as usize)
        } else {
            Err(KinemaError::validation(format!(
                "navigation target {extended} outside the extended sequence (len {})",
                self.items.len()
            )))
        }
    }

    /// Single-lap wrap used before landing an immediate move.
    fn wrap_once(&self, target: i64) -> i64 {
        let n = self.originals as i64;
        let k = self.clone_count as i64;
        if target < k {
            target + n
        } else if target >= k + n {
            target - n
        } else {
            target
        }
    }
}
