use crate::{
    ease::Ease,
    stage::{Channel, NodeId, Stage},
    tween::Tween,
};

/// Handle to a scheduled tween task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

/// Duration + curve pair; every animated controller setting is one of these.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TweenSpec {
    pub duration_ms: f64,
    pub ease: Ease,
}

impl TweenSpec {
    pub fn new(duration_ms: f64, ease: Ease) -> Self {
        Self { duration_ms, ease }
    }
}

#[derive(Clone, Copy, Debug)]
struct Task {
    id: TaskId,
    node: NodeId,
    channel: Channel,
    tween: Tween,
}

/// Scheduler of cancellable tween tasks over stage channels.
///
/// Invariants:
/// - at most one task per (node, channel); scheduling onto an occupied
///   channel kills the incumbent (it never completes),
/// - `advance` applies values in task start order and reports each
///   completion exactly once,
/// - killed tasks are silent: no value write, no completion,
/// - time never moves backwards (a stale `now` clamps to the newest seen).
#[derive(Debug, Default)]
pub struct Timeline {
    tasks: Vec<Task>,
    next_id: u64,
    now: f64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest timestamp this timeline has seen.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn is_active(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    pub fn active_len(&self) -> usize {
        self.tasks.len()
    }

    /// Target of the task currently driving a channel, if any.
    pub fn channel_target(&self, node: NodeId, channel: Channel) -> Option<f64> {
        self.tasks
            .iter()
            .find(|t| t.node == node && t.channel == channel)
            .map(|t| t.tween.to())
    }

    /// Instant write: kills whatever was animating the channel, then sets
    /// the value directly on the stage.
    pub fn set(&mut self, stage: &mut Stage, node: NodeId, channel: Channel, value: f64) {
        self.kill_channel(node, channel);
        stage.set_channel(node, channel, value);
    }

    /// Animate the channel from its current stage value to `to`, replacing
    /// any task already driving it. Starts no earlier than the newest
    /// timestamp the timeline has seen.
    pub fn tween_to(
        &mut self,
        stage: &Stage,
        node: NodeId,
        channel: Channel,
        to: f64,
        spec: TweenSpec,
        now: f64,
    ) -> TaskId {
        self.kill_channel(node, channel);
        let start = now.max(self.now);
        let from = stage.channel(node, channel);
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            node,
            channel,
            tween: Tween::new(from, to, start, spec.duration_ms, spec.ease),
        });
        id
    }

    /// Cancel a task. Its channel keeps the last value already applied.
    pub fn kill(&mut self, id: TaskId) {
        self.tasks.retain(|t| t.id != id);
    }

    pub fn kill_channel(&mut self, node: NodeId, channel: Channel) {
        self.tasks
            .retain(|t| !(t.node == node && t.channel == channel));
    }

    /// Drive every task to `now`, writing eased values to the stage in task
    /// start order. Returns the tasks that reached their target, in the same
    /// order; each id is reported exactly once, ever.
    pub fn advance(&mut self, stage: &mut Stage, now: f64) -> Vec<TaskId> {
        let now = now.max(self.now);
        self.now = now;

        let mut done = Vec::new();
        for task in &self.tasks {
            stage.set_channel(task.node, task.channel, task.tween.value_at(now));
            if task.tween.is_finished_at(now) {
                done.push(task.id);
            }
        }
        self.tasks.retain(|t| !t.tween.is_finished_at(now));
        done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> (Stage, Timeline, NodeId) {
        let mut stage = Stage::new();
        let node = stage.insert("n");
        (stage, Timeline::new(), node)
    }

    #[test]
    fn advance_applies_and_completes_exactly_once() {
        let (mut stage, mut tl, node) = rig();
        let id = tl.tween_to(
            &stage,
            node,
            Channel::Opacity,
            0.0,
            TweenSpec::new(100.0, Ease::Linear),
            0.0,
        );

        assert!(tl.advance(&mut stage, 50.0).is_empty());
        assert_eq!(stage.channel(node, Channel::Opacity), 0.5);

        assert_eq!(tl.advance(&mut stage, 100.0), vec![id]);
        assert_eq!(stage.channel(node, Channel::Opacity), 0.0);

        // Never reported again, and the task is gone.
        assert!(tl.advance(&mut stage, 200.0).is_empty());
        assert!(!tl.is_active(id));
    }

    #[test]
    fn channel_takeover_kills_the_incumbent() {
        let (mut stage, mut tl, node) = rig();
        let first = tl.tween_to(
            &stage,
            node,
            Channel::TranslateX,
            100.0,
            TweenSpec::new(100.0, Ease::Linear),
            0.0,
        );
        tl.advance(&mut stage, 50.0);

        let second = tl.tween_to(
            &stage,
            node,
            Channel::TranslateX,
            0.0,
            TweenSpec::new(100.0, Ease::Linear),
            50.0,
        );
        assert!(!tl.is_active(first));

        // The replacement resumes from the value the first task reached.
        let done = tl.advance(&mut stage, 150.0);
        assert_eq!(done, vec![second]);
        assert_eq!(stage.channel(node, Channel::TranslateX), 0.0);
    }

    #[test]
    fn set_is_instant_and_silences_the_channel() {
        let (mut stage, mut tl, node) = rig();
        let id = tl.tween_to(
            &stage,
            node,
            Channel::Opacity,
            0.0,
            TweenSpec::new(500.0, Ease::Linear),
            0.0,
        );
        tl.set(&mut stage, node, Channel::Opacity, 0.15);
        assert!(!tl.is_active(id));
        assert_eq!(stage.channel(node, Channel::Opacity), 0.15);
        assert!(tl.advance(&mut stage, 1000.0).is_empty());
        assert_eq!(stage.channel(node, Channel::Opacity), 0.15);
    }

    #[test]
    fn killed_tasks_never_complete() {
        let (mut stage, mut tl, node) = rig();
        let id = tl.tween_to(
            &stage,
            node,
            Channel::ScaleX,
            2.0,
            TweenSpec::new(100.0, Ease::Linear),
            0.0,
        );
        tl.advance(&mut stage, 30.0);
        tl.kill(id);
        assert!(tl.advance(&mut stage, 500.0).is_empty());
        // Value stays where the kill left it.
        assert!((stage.channel(node, Channel::ScaleX) - 1.3).abs() < 1e-9);
    }

    #[test]
    fn completions_report_in_start_order() {
        let (mut stage, mut tl, node) = rig();
        let slow = tl.tween_to(
            &stage,
            node,
            Channel::TranslateX,
            10.0,
            TweenSpec::new(100.0, Ease::Linear),
            0.0,
        );
        let fast = tl.tween_to(
            &stage,
            node,
            Channel::TranslateY,
            10.0,
            TweenSpec::new(10.0, Ease::Linear),
            0.0,
        );
        // Both are finished by t=100; order follows start order, not
        // finish time.
        assert_eq!(tl.advance(&mut stage, 100.0), vec![slow, fast]);
    }

    #[test]
    fn time_never_rewinds() {
        let (mut stage, mut tl, node) = rig();
        tl.tween_to(
            &stage,
            node,
            Channel::Opacity,
            0.0,
            TweenSpec::new(100.0, Ease::Linear),
            0.0,
        );
        tl.advance(&mut stage, 80.0);
        let v = stage.channel(node, Channel::Opacity);
        tl.advance(&mut stage, 10.0);
        assert_eq!(stage.channel(node, Channel::Opacity), v);
        assert_eq!(tl.now(), 80.0);
    }

    #[test]
    fn zero_duration_completes_on_first_advance() {
        let (mut stage, mut tl, node) = rig();
        let id = tl.tween_to(
            &stage,
            node,
            Channel::Opacity,
            0.4,
            TweenSpec::new(0.0, Ease::Linear),
            25.0,
        );
        assert_eq!(tl.advance(&mut stage, 25.0), vec![id]);
        assert_eq!(stage.channel(node, Channel::Opacity), 0.4);
    }
}
