//! Pointer micro-interactions: a hover lift and a two-phase press pulse
//! (a quick strike away from rest, then a springy recover back). Events for
//! nodes that never registered are silently ignored.

use crate::{
    ease::Ease,
    error::{KinemaError, KinemaResult},
    stage::{Channel, NodeId, Stage},
    timeline::{TaskId, Timeline, TweenSpec},
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HoverSpec {
    /// Vertical offset while hovered; negative lifts the node.
    pub lift_y: f64,
    pub tween: TweenSpec,
}

impl Default for HoverSpec {
    fn default() -> Self {
        Self {
            lift_y: -5.0,
            tween: TweenSpec::new(300.0, Ease::OutCubic),
        }
    }
}

/// A press pulse: strike every listed channel to its value, then recover all
/// of them back to rest with an overshooting curve.
#[derive(Clone, Debug, PartialEq)]
pub struct PulseSpec {
    pub targets: Vec<(Channel, f64)>,
    pub strike: TweenSpec,
    pub recover: TweenSpec,
}

impl PulseSpec {
    /// Shove sideways while widening, the list-item acknowledgement.
    pub fn nudge() -> Self {
        Self {
            targets: vec![(Channel::TranslateX, 5.0), (Channel::ScaleX, 1.3)],
            strike: TweenSpec::new(200.0, Ease::OutCubic),
            recover: TweenSpec::new(500.0, Ease::out_back()),
        }
    }

    /// Inflate uniformly, the dot/button acknowledgement.
    pub fn pop() -> Self {
        Self {
            targets: vec![(Channel::ScaleX, 1.6), (Channel::ScaleY, 1.6)],
            strike: TweenSpec::new(150.0, Ease::OutCubic),
            recover: TweenSpec::new(400.0, Ease::out_back()),
        }
    }

    /// Stretch wide and slightly tall, the bar acknowledgement.
    pub fn stretch() -> Self {
        Self {
            targets: vec![(Channel::ScaleX, 1.6), (Channel::ScaleY, 1.2)],
            strike: TweenSpec::new(150.0, Ease::OutCubic),
            recover: TweenSpec::new(500.0, Ease::out_back()),
        }
    }

    fn validate(&self) -> KinemaResult<()> {
        if self.targets.is_empty() {
            return Err(KinemaError::validation("pulse has no target channels"));
        }
        for (name, spec) in [("strike", self.strike), ("recover", self.recover)] {
            if !spec.duration_ms.is_finite() || spec.duration_ms <= 0.0 {
                return Err(KinemaError::validation(format!(
                    "pulse {name} duration must be finite and positive"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Strike,
    Recover,
}

#[derive(Debug)]
struct PulseEntry {
    node: NodeId,
    spec: PulseSpec,
    phase: Option<Phase>,
    in_flight: Vec<TaskId>,
}

/// Hover and press registrations over one shared timeline.
#[derive(Debug, Default)]
pub struct InteractionLayer {
    timeline: Timeline,
    hovers: Vec<(NodeId, HoverSpec)>,
    pulses: Vec<PulseEntry>,
}

impl InteractionLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_hover(
        &mut self,
        stage: &Stage,
        node: NodeId,
        spec: HoverSpec,
    ) -> KinemaResult<()> {
        if !stage.contains(node) {
            return Err(KinemaError::stage("hover target does not exist"));
        }
        if self.hovers.iter().any(|(id, _)| *id == node) {
            return Err(KinemaError::validation(format!(
                "hover already registered for {:?}",
                stage.label(node)
            )));
        }
        self.hovers.push((node, spec));
        Ok(())
    }

    pub fn register_press(
        &mut self,
        stage: &Stage,
        node: NodeId,
        spec: PulseSpec,
    ) -> KinemaResult<()> {
        if !stage.contains(node) {
            return Err(KinemaError::stage("press target does not exist"));
        }
        spec.validate()?;
        if self.pulses.iter().any(|p| p.node == node) {
            return Err(KinemaError::validation(format!(
                "press already registered for {:?}",
                stage.label(node)
            )));
        }
        self.pulses.push(PulseEntry {
            node,
            spec,
            phase: None,
            in_flight: Vec::new(),
        });
        Ok(())
    }

    pub fn pointer_enter(&mut self, stage: &mut Stage, node: NodeId, now: f64) {
        if let Some((_, spec)) = self.hovers.iter().find(|(id, _)| *id == node).copied() {
            self.timeline
                .tween_to(stage, node, Channel::TranslateY, spec.lift_y, spec.tween, now);
        }
    }

    pub fn pointer_leave(&mut self, stage: &mut Stage, node: NodeId, now: f64) {
        if let Some((_, spec)) = self.hovers.iter().find(|(id, _)| *id == node).copied() {
            self.timeline
                .tween_to(stage, node, Channel::TranslateY, 0.0, spec.tween, now);
        }
    }

    /// Start (or restart) the node's pulse at the strike phase. Channel
    /// takeover silences whatever the previous pulse still had running.
    pub fn press(&mut self, stage: &mut Stage, node: NodeId, now: f64) {
        let Some(entry) = self.pulses.iter_mut().find(|p| p.node == node) else {
            return;
        };
        entry.phase = Some(Phase::Strike);
        entry.in_flight.clear();
        for &(channel, value) in &entry.spec.targets {
            let id = self
                .timeline
                .tween_to(stage, node, channel, value, entry.spec.strike, now);
            entry.in_flight.push(id);
        }
        tracing::trace!(node = ?stage.label(node), "pulse strike");
    }

    /// Drive animations; strikes that finished flip into their recover phase.
    pub fn tick(&mut self, stage: &mut Stage, now: f64) {
        let done = self.timeline.advance(stage, now);
        if done.is_empty() {
            return;
        }
        for i in 0..self.pulses.len() {
            let entry = &mut self.pulses[i];
            if entry.phase.is_none() {
                continue;
            }
            entry.in_flight.retain(|id| !done.contains(id));
            if !entry.in_flight.is_empty() {
                continue;
            }
            match entry.phase {
                Some(Phase::Strike) => {
                    entry.phase = Some(Phase::Recover);
                    let node = entry.node;
                    let spec = entry.spec.clone();
                    let ids: Vec<TaskId> = spec
                        .targets
                        .iter()
                        .map(|&(channel, _)| {
                            self.timeline.tween_to(
                                stage,
                                node,
                                channel,
                                channel.rest(),
                                spec.recover,
                                now,
                            )
                        })
                        .collect();
                    self.pulses[i].in_flight = ids;
                }
                Some(Phase::Recover) => {
                    self.pulses[i].phase = None;
                }
                None => {}
            }
        }
    }

    /// Nodes currently mid-pulse.
    pub fn active_pulses(&self) -> usize {
        self.pulses.iter().filter(|p| p.phase.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> (Stage, InteractionLayer, NodeId) {
        let mut stage = Stage::new();
        let node = stage.insert("card");
        let layer = InteractionLayer::new();
        (stage, layer, node)
    }

    #[test]
    fn hover_lifts_and_settles_back() {
        let (mut stage, mut layer, node) = rig();
        layer.register_hover(&stage, node, HoverSpec::default()).unwrap();

        layer.pointer_enter(&mut stage, node, 0.0);
        layer.tick(&mut stage, 300.0);
        assert_eq!(stage.channel(node, Channel::TranslateY), -5.0);

        layer.pointer_leave(&mut stage, node, 300.0);
        layer.tick(&mut stage, 600.0);
        assert_eq!(stage.channel(node, Channel::TranslateY), 0.0);
    }

    #[test]
    fn press_strikes_then_recovers_to_rest() {
        let (mut stage, mut layer, node) = rig();
        layer.register_press(&stage, node, PulseSpec::pop()).unwrap();

        layer.press(&mut stage, node, 0.0);
        assert_eq!(layer.active_pulses(), 1);

        layer.tick(&mut stage, 150.0);
        assert_eq!(stage.channel(node, Channel::ScaleX), 1.6);
        assert_eq!(stage.channel(node, Channel::ScaleY), 1.6);

        // Recover runs 400 ms from the strike's completion.
        layer.tick(&mut stage, 350.0);
        assert_ne!(stage.channel(node, Channel::ScaleX), 1.6);
        layer.tick(&mut stage, 550.0);
        assert_eq!(stage.channel(node, Channel::ScaleX), 1.0);
        assert_eq!(stage.channel(node, Channel::ScaleY), 1.0);
        assert_eq!(layer.active_pulses(), 0);
    }

    #[test]
    fn nudge_moves_sideways_and_widens() {
        let (mut stage, mut layer, node) = rig();
        layer.register_press(&stage, node, PulseSpec::nudge()).unwrap();
        layer.press(&mut stage, node, 0.0);
        layer.tick(&mut stage, 200.0);
        assert_eq!(stage.channel(node, Channel::TranslateX), 5.0);
        assert_eq!(stage.channel(node, Channel::ScaleX), 1.3);
        layer.tick(&mut stage, 700.0);
        assert_eq!(stage.channel(node, Channel::TranslateX), 0.0);
        assert_eq!(stage.channel(node, Channel::ScaleX), 1.0);
    }

    #[test]
    fn re_press_restarts_the_strike() {
        let (mut stage, mut layer, node) = rig();
        layer.register_press(&stage, node, PulseSpec::pop()).unwrap();

        layer.press(&mut stage, node, 0.0);
        layer.tick(&mut stage, 100.0);
        let mid = stage.channel(node, Channel::ScaleX);
        assert!(mid > 1.0 && mid < 1.6);

        layer.press(&mut stage, node, 100.0);
        layer.tick(&mut stage, 250.0);
        assert_eq!(stage.channel(node, Channel::ScaleX), 1.6);

        layer.tick(&mut stage, 650.0);
        assert_eq!(stage.channel(node, Channel::ScaleX), 1.0);
        assert_eq!(layer.active_pulses(), 0);
    }

    #[test]
    fn events_for_unregistered_nodes_are_ignored() {
        let (mut stage, mut layer, node) = rig();
        layer.pointer_enter(&mut stage, node, 0.0);
        layer.press(&mut stage, node, 0.0);
        layer.tick(&mut stage, 1000.0);
        assert_eq!(stage.channel(node, Channel::TranslateY), 0.0);
        assert_eq!(stage.channel(node, Channel::ScaleX), 1.0);
        assert_eq!(layer.active_pulses(), 0);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let (stage, mut layer, node) = rig();
        layer.register_hover(&stage, node, HoverSpec::default()).unwrap();
        let err = layer
            .register_hover(&stage, node, HoverSpec::default())
            .unwrap_err();
        assert!(matches!(err, KinemaError::Validation(_)));
    }
}
