//! Play-once entrance reveals. Targets start displaced and transparent the
//! moment they are mounted, then tween back to the rest pose, either on a
//! load delay or when their watch node scrolls into view. A trigger arms exactly
//! once; scrolling back and forth never replays it.

use crate::{
    error::{KinemaError, KinemaResult},
    stage::{Channel, NodeId, Stage},
    timeline::{Timeline, TweenSpec},
};

/// Displaced state a reveal starts from. `scale` engages both axes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RevealFrom {
    pub y: f64,
    pub opacity: f64,
    pub scale: Option<f64>,
}

impl Default for RevealFrom {
    fn default() -> Self {
        Self { y: 0.0, opacity: 0.0, scale: None }
    }
}

impl RevealFrom {
    /// Slide up while fading in.
    pub fn rise(y: f64) -> Self {
        Self { y, opacity: 0.0, scale: None }
    }

    /// Grow from nothing while fading in.
    pub fn pop() -> Self {
        Self { y: 0.0, opacity: 0.0, scale: Some(0.0) }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RevealTrigger {
    /// Play after a fixed delay from mount.
    OnLoad { delay_ms: f64 },
    /// Play when `watch`'s top crosses `viewport_fraction` of the viewport
    /// height above the fold.
    OnScroll { watch: NodeId, viewport_fraction: f64 },
}

/// One reveal group: targets sharing a from-state, a curve, and a trigger.
/// Targets start `stagger_ms` apart in declaration order.
#[derive(Clone, Debug)]
pub struct RevealGroupSpec {
    pub targets: Vec<NodeId>,
    pub from: RevealFrom,
    pub tween: TweenSpec,
    pub stagger_ms: f64,
    pub trigger: RevealTrigger,
}

#[derive(Debug)]
struct Group {
    spec: RevealGroupSpec,
    armed: bool,
}

#[derive(Debug, Default)]
pub struct RevealSet {
    groups: Vec<Group>,
    timeline: Timeline,
}

impl RevealSet {
    /// Seat every target in its from-state and arm the load-triggered groups.
    pub fn mount(stage: &mut Stage, specs: Vec<RevealGroupSpec>, now: f64) -> KinemaResult<Self> {
        for (i, spec) in specs.iter().enumerate() {
            if spec.targets.is_empty() {
                return Err(KinemaError::validation(format!(
                    "reveal group {i} has no targets"
                )));
            }
            if !spec.tween.duration_ms.is_finite() || spec.tween.duration_ms <= 0.0 {
                return Err(KinemaError::validation(format!(
                    "reveal group {i} duration must be finite and positive"
                )));
            }
            if !spec.stagger_ms.is_finite() || spec.stagger_ms < 0.0 {
                return Err(KinemaError::validation(format!(
                    "reveal group {i} stagger must be finite and non-negative"
                )));
            }
            if let Some(&missing) = spec.targets.iter().find(|&&id| !stage.contains(id)) {
                return Err(KinemaError::stage(format!(
                    "reveal group {i} target {missing:?} does not exist"
                )));
            }
            match spec.trigger {
                RevealTrigger::OnLoad { delay_ms } => {
                    if !delay_ms.is_finite() || delay_ms < 0.0 {
                        return Err(KinemaError::validation(format!(
                            "reveal group {i} delay must be finite and non-negative"
                        )));
                    }
                }
                RevealTrigger::OnScroll { watch, viewport_fraction } => {
                    if !stage.contains(watch) {
                        return Err(KinemaError::stage(format!(
                            "reveal group {i} watch node does not exist"
                        )));
                    }
                    if !viewport_fraction.is_finite() || viewport_fraction <= 0.0 {
                        return Err(KinemaError::validation(format!(
                            "reveal group {i} viewport fraction must be finite and positive"
                        )));
                    }
                }
            }
        }

        let mut set = Self {
            groups: specs.into_iter().map(|spec| Group { spec, armed: false }).collect(),
            timeline: Timeline::new(),
        };
        for group in &set.groups {
            for &target in &group.spec.targets {
                apply_from(stage, target, group.spec.from);
            }
        }
        for i in 0..set.groups.len() {
            if let RevealTrigger::OnLoad { delay_ms } = set.groups[i].spec.trigger {
                set.arm(stage, i, now + delay_ms);
            }
        }
        Ok(set)
    }

    /// Arm scroll-triggered groups whose watch node has entered the viewport
    /// band. `scroll_y`/`viewport_h` come from the host (or the scroller
    /// mid-glide).
    pub fn observe_scroll(&mut self, stage: &mut Stage, scroll_y: f64, viewport_h: f64, now: f64) {
        for i in 0..self.groups.len() {
            if self.groups[i].armed {
                continue;
            }
            let RevealTrigger::OnScroll { watch, viewport_fraction } = self.groups[i].spec.trigger
            else {
                continue;
            };
            let threshold = stage.metrics(watch).top - viewport_fraction * viewport_h;
            if scroll_y >= threshold {
                tracing::debug!(group = i, scroll_y, threshold, "scroll reveal armed");
                self.arm(stage, i, now);
            }
        }
    }

    pub fn tick(&mut self, stage: &mut Stage, now: f64) {
        self.timeline.advance(stage, now);
    }

    /// Groups still waiting on their trigger.
    pub fn pending(&self) -> usize {
        self.groups.iter().filter(|g| !g.armed).count()
    }

    fn arm(&mut self, stage: &mut Stage, group: usize, start: f64) {
        let g = &mut self.groups[group];
        g.armed = true;
        let spec = g.spec.clone();
        for (i, &target) in spec.targets.iter().enumerate() {
            let at = start + spec.stagger_ms * i as f64;
            self.timeline
                .tween_to(stage, target, Channel::Opacity, 1.0, spec.tween, at);
            if spec.from.y != 0.0 {
                self.timeline
                    .tween_to(stage, target, Channel::TranslateY, 0.0, spec.tween, at);
            }
            if spec.from.scale.is_some() {
                self.timeline
                    .tween_to(stage, target, Channel::ScaleX, 1.0, spec.tween, at);
                self.timeline
                    .tween_to(stage, target, Channel::ScaleY, 1.0, spec.tween, at);
            }
        }
    }
}

fn apply_from(stage: &mut Stage, target: NodeId, from: RevealFrom) {
    stage.set_channel(target, Channel::Opacity, from.opacity);
    if from.y != 0.0 {
        stage.set_channel(target, Channel::TranslateY, from.y);
    }
    if let Some(scale) = from.scale {
        stage.set_channel(target, Channel::ScaleX, scale);
        stage.set_channel(target, Channel::ScaleY, scale);
    }
}
